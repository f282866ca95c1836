//! Native-messaging host entry point, launched by the browser

use anyhow::Result;
use focus_ai::RelevanceClassifier;
use focus_core::host::{Host, NativeMessagingPort};
use focus_core::{Dispatcher, FocusService, Recorder};
use std::sync::Arc;

use super::helpers::open_database;

/// Serve the extension over stdin/stdout until it disconnects
///
/// # Errors
///
/// Returns an error if the database cannot be opened or writing to the browser fails
pub async fn host_command() -> Result<()> {
    let db = Arc::new(open_database()?);

    let ai = db.get_ai_config()?;
    let classifier = RelevanceClassifier::from_config(&ai);
    match classifier.model_name() {
        Some(model) => log::info!("Relevance analysis via {} ({model})", ai.provider),
        None => log::warn!("No usable AI backend, every page will be allowed"),
    }

    let (port, outbound) = NativeMessagingPort::channel();
    let service = Arc::new(FocusService::new(
        classifier,
        Recorder::new(db),
        Dispatcher::new(Arc::new(port.clone())),
    ));

    Host::new(service, port)
        .run(tokio::io::stdin(), tokio::io::stdout(), outbound)
        .await
}
