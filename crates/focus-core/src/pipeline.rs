use anyhow::Result;
use focus_ai::{PageContent, RelevanceClassifier};
use focus_storage::{NavigationEvent, RelevanceVerdict};

use crate::dispatcher::{DispatchState, Dispatcher, TabId};
use crate::recorder::Recorder;

/// Result of handling one content-analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// No study topic is set, nothing was analysed
    Skipped,
    /// Recording or notifying failed; the error notice was shown
    Failed,
    Resolved(DispatchState),
}

/// Page-load pipeline: classify, record, dispatch
pub struct FocusService {
    classifier: RelevanceClassifier,
    recorder: Recorder,
    dispatcher: Dispatcher,
}

impl FocusService {
    #[must_use]
    pub fn new(classifier: RelevanceClassifier, recorder: Recorder, dispatcher: Dispatcher) -> Self {
        Self {
            classifier,
            recorder,
            dispatcher,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Handle a completed navigation
    ///
    /// A main-frame navigation updates the tab's known URL, which also
    /// cancels a closure still pending for a different URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the navigation cannot be recorded
    pub fn on_navigation(&self, event: &NavigationEvent) -> Result<Option<i64>> {
        if event.is_main_frame() {
            self.dispatcher.track_navigation(event.tab_id, &event.url);
        }
        self.recorder.record_navigation(event)
    }

    /// Note that `tab_id` now shows `url`
    ///
    /// Content for a page proves the tab is there, even before its navigation
    /// event arrives. Call this in message order, before spawning the
    /// analysis of that page.
    pub fn on_page_shown(&self, tab_id: TabId, url: &str) {
        self.dispatcher.track_navigation(tab_id, url);
    }

    /// Handle a tab that went away
    pub fn on_tab_removed(&self, tab_id: TabId) -> bool {
        self.dispatcher.track_removal(tab_id)
    }

    /// Run the full analysis cycle for a page shown in `tab_id`
    ///
    /// The study topic saved in settings takes precedence over the one the
    /// page carries; the page's own topic is used only when none is saved.
    pub async fn on_content_analysis(&self, tab_id: TabId, page: &PageContent) -> AnalysisOutcome {
        let page = self.with_stored_topic(page);
        if page.study_topic().is_empty() {
            log::debug!("No study topic set, skipping analysis of {}", page.url());
            return AnalysisOutcome::Skipped;
        }

        self.dispatcher.begin(tab_id).await;

        match self.classify_and_dispatch(tab_id, &page).await {
            Ok(state) => AnalysisOutcome::Resolved(state),
            Err(e) => {
                log::error!("Error in content analysis of {}: {e:#}", page.url());
                self.dispatcher.report_error(tab_id).await;
                AnalysisOutcome::Failed
            }
        }
    }

    fn with_stored_topic(&self, page: &PageContent) -> PageContent {
        match self.recorder.database().get_settings() {
            Ok(settings) => match settings.active_topic() {
                Some(topic) => page.clone().with_study_topic(topic),
                None => page.clone(),
            },
            Err(e) => {
                log::warn!("Could not read the saved study topic, using the page's: {e:#}");
                page.clone()
            }
        }
    }

    async fn classify_and_dispatch(&self, tab_id: TabId, page: &PageContent) -> Result<DispatchState> {
        let verdict = self.analyze(page).await?;
        self.dispatcher.resolve(tab_id, page.url(), &verdict).await
    }

    /// Classify and record a page without touching any tab
    ///
    /// # Errors
    ///
    /// Returns an error if the verdict cannot be recorded
    pub async fn analyze(&self, page: &PageContent) -> Result<RelevanceVerdict> {
        let verdict = self.classifier.classify(page).await;
        self.recorder.record_analysis(page.url(), &verdict)?;
        Ok(verdict)
    }
}
