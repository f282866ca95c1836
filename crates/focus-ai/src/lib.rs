pub mod ai_provider;
pub mod page;
pub mod providers;
pub mod relevance;

pub use ai_provider::{create_provider, AiProviderTrait};
pub use page::{truncate_chars, PageContent, MAIN_CONTENT_CAP};
pub use relevance::{ClassifierError, RelevanceClassifier, PROMPT_EXCERPT_CAP};
