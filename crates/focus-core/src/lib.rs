pub mod config;
pub mod dispatcher;
pub mod extractor;
pub mod host;
pub mod pipeline;
pub mod recorder;

pub use dispatcher::{BrowserPort, DispatchState, DispatchTimings, Dispatcher, Notice, TabId, Warning};
pub use pipeline::{AnalysisOutcome, FocusService};
pub use recorder::Recorder;
