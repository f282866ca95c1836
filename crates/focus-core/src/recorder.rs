use anyhow::Result;
use focus_storage::{AnalyzedPageRecord, Database, NavigationEvent, RelevanceVerdict};
use std::sync::Arc;

/// Write side of the navigation log and the analysis store
#[derive(Clone)]
pub struct Recorder {
    database: Arc<Database>,
}

impl Recorder {
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    #[must_use]
    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    /// Log a completed navigation; sub-frame navigations are ignored
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub fn record_navigation(&self, event: &NavigationEvent) -> Result<Option<i64>> {
        if !event.is_main_frame() {
            log::trace!("Ignoring sub-frame navigation in tab {}", event.tab_id);
            return Ok(None);
        }
        let id = self.database.insert_navigation(event)?;
        log::debug!("Recorded navigation #{id} in tab {}: {}", event.tab_id, event.url);
        Ok(Some(id))
    }

    /// Store the verdict for a URL, replacing any earlier one
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails
    pub fn record_analysis(&self, url: &str, verdict: &RelevanceVerdict) -> Result<()> {
        let record = AnalyzedPageRecord::new(url.to_string(), verdict.clone());
        self.database.upsert_analysis(&record)?;
        log::debug!(
            "Recorded analysis of {url}: score {:.2}, relevant {}",
            verdict.relevance_score(),
            record.is_relevant()
        );
        Ok(())
    }
}
