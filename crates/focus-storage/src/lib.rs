pub mod db;
pub mod migrations;
pub mod models;

pub use db::Database;
pub use models::{
    AiConfig, AiProvider, AnalyzedPageRecord, NavigationEvent, NavigationRecord,
    RelevanceVerdict, Settings, RELEVANCE_THRESHOLD,
};
