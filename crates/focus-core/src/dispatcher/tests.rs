use super::*;
use anyhow::anyhow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PortCall {
    Notice(TabId, Notice),
    Warning(TabId, Warning),
    Close(TabId),
}

/// Port double that records every call
#[derive(Default)]
pub(crate) struct RecordingPort {
    calls: Mutex<Vec<PortCall>>,
    fail_close: bool,
    fail_warning: bool,
}

impl RecordingPort {
    pub(crate) fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_warning() -> Self {
        Self {
            fail_warning: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<PortCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn closed_tabs(&self) -> Vec<TabId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PortCall::Close(tab) => Some(tab),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn warnings(&self) -> Vec<Warning> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PortCall::Warning(_, warning) => Some(warning),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn notice_messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PortCall::Notice(_, notice) => Some(notice.message),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl BrowserPort for RecordingPort {
    async fn show_notice(&self, tab_id: TabId, notice: Notice) -> Result<()> {
        self.calls.lock().unwrap().push(PortCall::Notice(tab_id, notice));
        Ok(())
    }

    async fn show_warning(&self, tab_id: TabId, warning: Warning) -> Result<()> {
        if self.fail_warning {
            return Err(anyhow!("content script not reachable"));
        }
        self.calls.lock().unwrap().push(PortCall::Warning(tab_id, warning));
        Ok(())
    }

    async fn close_tab(&self, tab_id: TabId) -> Result<()> {
        self.calls.lock().unwrap().push(PortCall::Close(tab_id));
        if self.fail_close {
            return Err(anyhow!("No tab with id: {tab_id}"));
        }
        Ok(())
    }
}

fn off_topic() -> RelevanceVerdict {
    RelevanceVerdict::from_score(
        0.2,
        "Pasta recipes".to_string(),
        "Cooking is unrelated to organic chemistry".to_string(),
    )
}

fn on_topic() -> RelevanceVerdict {
    RelevanceVerdict::from_score(0.8, "Alkenes".to_string(), "Core material".to_string())
}

fn dispatcher(port: &Arc<RecordingPort>) -> Dispatcher {
    Dispatcher::new(port.clone())
}

// ============================================================================
// Notices
// ============================================================================

#[tokio::test]
async fn test_begin_shows_analyzing_notice() {
    let port = Arc::new(RecordingPort::default());
    let state = dispatcher(&port).begin(4).await;

    assert_eq!(state, DispatchState::Pending);
    assert_eq!(
        port.calls(),
        vec![PortCall::Notice(
            4,
            Notice {
                message: ANALYZING_MESSAGE.to_string(),
                duration_ms: 3000,
            }
        )]
    );
}

#[tokio::test]
async fn test_relevant_verdict_is_allowed() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);

    let state = dispatcher.resolve(4, "https://chem.example", &on_topic()).await.unwrap();

    assert_eq!(state, DispatchState::Allowed);
    assert_eq!(port.notice_messages(), vec![RELEVANT_MESSAGE.to_string()]);
    assert!(port.warnings().is_empty());
    assert!(!dispatcher.has_pending_closure(4));
}

#[tokio::test]
async fn test_fail_open_verdict_shows_no_warning() {
    let port = Arc::new(RecordingPort::default());
    let state = dispatcher(&port)
        .resolve(4, "https://down.example", &RelevanceVerdict::fail_open())
        .await
        .unwrap();

    assert_eq!(state, DispatchState::Allowed);
    assert!(port.warnings().is_empty());
}

#[tokio::test]
async fn test_report_error_notice() {
    let port = Arc::new(RecordingPort::default());
    dispatcher(&port).report_error(9).await;
    assert_eq!(port.notice_messages(), vec![ERROR_MESSAGE.to_string()]);
}

// ============================================================================
// Warning and closure
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_off_topic_warns_then_closes_after_delay() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);

    let state = dispatcher.resolve(7, "https://food.example", &off_topic()).await.unwrap();
    assert_eq!(state, DispatchState::WarnedAndClosing);

    let warnings = port.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].reason, "Cooking is unrelated to organic chemistry");
    assert_eq!(warnings[0].summary, "Pasta recipes");
    assert_eq!(warnings[0].duration_ms, 5000);
    assert!(warnings[0].message.contains("Closing tab in 5 seconds"));

    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert!(port.closed_tabs().is_empty());
    assert!(dispatcher.has_pending_closure(7));

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(port.closed_tabs(), vec![7]);
    assert!(!dispatcher.has_pending_closure(7));
}

#[tokio::test(start_paused = true)]
async fn test_close_failure_is_swallowed() {
    let port = Arc::new(RecordingPort::failing_close());
    let dispatcher = dispatcher(&port);

    dispatcher.resolve(7, "https://food.example", &off_topic()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(port.closed_tabs(), vec![7]);
    assert!(!dispatcher.has_pending_closure(7));
}

#[tokio::test(start_paused = true)]
async fn test_warning_delivery_failure_schedules_nothing() {
    let port = Arc::new(RecordingPort::failing_warning());
    let dispatcher = dispatcher(&port);

    assert!(dispatcher.resolve(7, "https://food.example", &off_topic()).await.is_err());
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert!(port.closed_tabs().is_empty());
    assert!(!dispatcher.has_pending_closure(7));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_closure_prevents_close() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);

    dispatcher.resolve(7, "https://food.example", &off_topic()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(dispatcher.cancel_closure(7));
    assert!(!dispatcher.cancel_closure(7));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(port.closed_tabs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_navigation_elsewhere_cancels_but_same_url_does_not() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);

    dispatcher.resolve(7, "https://food.example", &off_topic()).await.unwrap();

    assert!(!dispatcher.track_navigation(7, "https://food.example"));
    assert!(dispatcher.has_pending_closure(7));

    assert!(dispatcher.track_navigation(7, "https://chem.example"));
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(port.closed_tabs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reschedule_replaces_previous_closure() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);

    dispatcher.resolve(7, "https://a.example", &off_topic()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    dispatcher.resolve(7, "https://b.example", &off_topic()).await.unwrap();

    // The first timer would have fired at 5s
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(port.closed_tabs().is_empty());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(port.closed_tabs(), vec![7]);
}

#[tokio::test(start_paused = true)]
async fn test_closures_are_independent_per_tab() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);

    dispatcher.resolve(1, "https://a.example", &off_topic()).await.unwrap();
    dispatcher.resolve(2, "https://b.example", &off_topic()).await.unwrap();
    assert!(dispatcher.cancel_closure(1));

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(port.closed_tabs(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_removal_cancels_and_is_final() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);

    dispatcher.resolve(7, "https://food.example", &off_topic()).await.unwrap();
    assert!(dispatcher.track_removal(7));
    assert!(!dispatcher.track_removal(7));

    // Late events for a removed tab do not revive it
    dispatcher.track_navigation(7, "https://food.example");
    assert!(!dispatcher.is_showing(7, "https://food.example"));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(port.closed_tabs().is_empty());
}

// ============================================================================
// Stale verdicts
// ============================================================================

#[test]
fn test_unknown_tab_is_assumed_to_show_the_page() {
    let port = Arc::new(RecordingPort::default());
    assert!(dispatcher(&port).is_showing(3, "https://anything.example"));
}

#[tokio::test(start_paused = true)]
async fn test_verdict_for_page_left_behind_is_superseded() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);
    dispatcher.track_navigation(7, "https://chem.example");

    let state = dispatcher.resolve(7, "https://food.example", &off_topic()).await.unwrap();

    assert_eq!(state, DispatchState::Superseded);
    assert!(port.calls().is_empty());
    assert!(!dispatcher.has_pending_closure(7));
}

#[tokio::test(start_paused = true)]
async fn test_verdict_for_removed_tab_is_superseded() {
    let port = Arc::new(RecordingPort::default());
    let dispatcher = dispatcher(&port);
    dispatcher.track_removal(7);

    let state = dispatcher.resolve(7, "https://food.example", &off_topic()).await.unwrap();
    assert_eq!(state, DispatchState::Superseded);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(port.calls().is_empty());
}

#[test]
fn test_default_timings() {
    let timings = DispatchTimings::default();
    assert_eq!(timings.close_delay, Duration::from_secs(5));
    assert_eq!(timings.analyzing_notice, Duration::from_secs(3));
    assert_eq!(timings.relevant_notice, Duration::from_secs(2));
}
