//! Decision dispatch: acting on a relevance verdict for one tab.
//!
//! The dispatcher tracks the main-frame URL of every tab it hears about.
//! Closures of off-topic tabs are scheduled tasks tracked per tab, and a tab
//! that is closed or navigates elsewhere, whether during classification or
//! before the delay expires, is left alone.

use anyhow::Result;
use async_trait::async_trait;
use focus_storage::RelevanceVerdict;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

pub type TabId = i64;

pub const ANALYZING_MESSAGE: &str = "Analyzing page content...";
pub const RELEVANT_MESSAGE: &str = "Page is relevant to your studies!";
pub const ERROR_MESSAGE: &str = "Error analyzing page content";

/// Transient, auto-dismissing notice shown in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub duration_ms: u64,
}

/// Full-page warning shown before an off-topic tab is closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    pub reason: String,
    pub summary: String,
    pub duration_ms: u64,
}

/// Browser-side effects the dispatcher relies on
#[async_trait]
pub trait BrowserPort: Send + Sync {
    async fn show_notice(&self, tab_id: TabId, notice: Notice) -> Result<()>;

    async fn show_warning(&self, tab_id: TabId, warning: Warning) -> Result<()>;

    async fn close_tab(&self, tab_id: TabId) -> Result<()>;
}

/// State of one page-load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Verdict not yet known
    Pending,
    /// Page may stay open
    Allowed,
    /// Warning shown, closure scheduled
    WarnedAndClosing,
    /// Tab was removed or left the page before the verdict could be acted on
    Superseded,
}

/// Notice durations and the closure delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTimings {
    pub analyzing_notice: Duration,
    pub relevant_notice: Duration,
    pub error_notice: Duration,
    pub close_delay: Duration,
}

impl Default for DispatchTimings {
    fn default() -> Self {
        Self {
            analyzing_notice: Duration::from_millis(3000),
            relevant_notice: Duration::from_millis(2000),
            error_notice: Duration::from_millis(3000),
            close_delay: Duration::from_millis(5000),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

struct PendingClosure {
    url: String,
    generation: u64,
    handle: JoinHandle<()>,
}

enum TabLocation {
    At(String),
    Removed,
}

/// Last known location and pending closure of every tab
#[derive(Default)]
struct TabTable {
    locations: HashMap<TabId, TabLocation>,
    closures: HashMap<TabId, PendingClosure>,
}

impl TabTable {
    /// A tab never reported is assumed to still show `url`
    fn shows(&self, tab_id: TabId, url: &str) -> bool {
        match self.locations.get(&tab_id) {
            None => true,
            Some(TabLocation::At(current)) => current == url,
            Some(TabLocation::Removed) => false,
        }
    }

    fn cancel(&mut self, tab_id: TabId) -> Option<String> {
        let pending = self.closures.remove(&tab_id)?;
        pending.handle.abort();
        Some(pending.url)
    }
}

type SharedTabs = Arc<Mutex<TabTable>>;

fn lock(tabs: &SharedTabs) -> MutexGuard<'_, TabTable> {
    tabs.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Dispatcher {
    port: Arc<dyn BrowserPort>,
    timings: DispatchTimings,
    tabs: SharedTabs,
    next_generation: AtomicU64,
}

impl Dispatcher {
    #[must_use]
    pub fn new(port: Arc<dyn BrowserPort>) -> Self {
        Self::with_timings(port, DispatchTimings::default())
    }

    #[must_use]
    pub fn with_timings(port: Arc<dyn BrowserPort>, timings: DispatchTimings) -> Self {
        Self {
            port,
            timings,
            tabs: Arc::new(Mutex::new(TabTable::default())),
            next_generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn timings(&self) -> DispatchTimings {
        self.timings
    }

    /// Enter the pending state, surfacing the "analyzing" notice
    pub async fn begin(&self, tab_id: TabId) -> DispatchState {
        let notice = Notice {
            message: ANALYZING_MESSAGE.to_string(),
            duration_ms: millis(self.timings.analyzing_notice),
        };
        if let Err(e) = self.port.show_notice(tab_id, notice).await {
            log::debug!("Could not show analyzing notice in tab {tab_id}: {e:#}");
        }
        DispatchState::Pending
    }

    /// Act on a verdict for the page at `url` in `tab_id`
    ///
    /// A verdict for a page the tab no longer shows, or for a removed tab, is
    /// dropped as [`DispatchState::Superseded`].
    ///
    /// # Errors
    ///
    /// Returns an error if the notice or warning cannot be delivered. No
    /// closure is scheduled in that case.
    pub async fn resolve(
        &self,
        tab_id: TabId,
        url: &str,
        verdict: &RelevanceVerdict,
    ) -> Result<DispatchState> {
        if !self.is_showing(tab_id, url) {
            log::info!("Tab {tab_id} has moved on from {url}, dropping its verdict");
            return Ok(DispatchState::Superseded);
        }

        if verdict.is_relevant() {
            let notice = Notice {
                message: RELEVANT_MESSAGE.to_string(),
                duration_ms: millis(self.timings.relevant_notice),
            };
            self.port.show_notice(tab_id, notice).await?;
            return Ok(DispatchState::Allowed);
        }

        let delay_secs = self.timings.close_delay.as_secs();
        let warning = Warning {
            message: format!(
                "This page appears to be irrelevant.\nReason: {}\nClosing tab in {delay_secs} seconds...",
                verdict.explanation()
            ),
            reason: verdict.explanation().to_string(),
            summary: verdict.summary().to_string(),
            duration_ms: millis(self.timings.close_delay),
        };
        self.port.show_warning(tab_id, warning).await?;

        if !self.schedule_closure(tab_id, url) {
            log::info!("Tab {tab_id} moved on from {url} during the warning, not closing");
            return Ok(DispatchState::Superseded);
        }

        log::info!(
            "Tab {tab_id} judged off-topic ({:.2}), closing in {delay_secs}s: {url}",
            verdict.relevance_score()
        );
        Ok(DispatchState::WarnedAndClosing)
    }

    /// Surface the generic analysis-failure notice
    pub async fn report_error(&self, tab_id: TabId) {
        let notice = Notice {
            message: ERROR_MESSAGE.to_string(),
            duration_ms: millis(self.timings.error_notice),
        };
        if let Err(e) = self.port.show_notice(tab_id, notice).await {
            log::debug!("Could not show error notice in tab {tab_id}: {e:#}");
        }
    }

    /// Returns `false` without scheduling when the tab no longer shows `url`
    fn schedule_closure(&self, tab_id: TabId, url: &str) -> bool {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let port = self.port.clone();
        let tabs = self.tabs.clone();
        let delay = self.timings.close_delay;
        let judged_url = url.to_string();

        // Held until the entry is in place so the timer task cannot run ahead of it
        let mut table = lock(&self.tabs);
        if !table.shows(tab_id, url) {
            return false;
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let still_current = {
                let mut table = lock(&tabs);
                let ours = table
                    .closures
                    .get(&tab_id)
                    .is_some_and(|pending| pending.generation == generation);
                if ours {
                    table.closures.remove(&tab_id);
                }
                ours && table.shows(tab_id, &judged_url)
            };
            if !still_current {
                return;
            }

            match port.close_tab(tab_id).await {
                Ok(()) => log::info!("Closed off-topic tab {tab_id}"),
                Err(e) => log::warn!("Failed to close tab {tab_id}: {e:#}"),
            }
        });

        let previous = table.closures.insert(
            tab_id,
            PendingClosure {
                url: url.to_string(),
                generation,
                handle,
            },
        );
        if let Some(previous) = previous {
            previous.handle.abort();
            log::debug!("Replaced pending closure of tab {tab_id}");
        }
        true
    }

    /// Record the main-frame URL a tab now shows
    ///
    /// Cancels a closure pending for a different URL and returns whether it
    /// did. Removed tabs stay removed.
    pub fn track_navigation(&self, tab_id: TabId, url: &str) -> bool {
        let mut table = lock(&self.tabs);
        if matches!(table.locations.get(&tab_id), Some(TabLocation::Removed)) {
            return false;
        }
        table
            .locations
            .insert(tab_id, TabLocation::At(url.to_string()));

        let moved_on = table
            .closures
            .get(&tab_id)
            .is_some_and(|pending| pending.url != url);
        if !moved_on {
            return false;
        }
        if let Some(previous) = table.cancel(tab_id) {
            log::info!("Tab {tab_id} left {previous} for {url}, closure cancelled");
        }
        true
    }

    /// Forget a tab that was closed, cancelling its pending closure
    pub fn track_removal(&self, tab_id: TabId) -> bool {
        let mut table = lock(&self.tabs);
        table.locations.insert(tab_id, TabLocation::Removed);
        let cancelled = table.cancel(tab_id);
        if let Some(url) = &cancelled {
            log::info!("Tab {tab_id} removed, closure of {url} cancelled");
        }
        cancelled.is_some()
    }

    /// Cancel the pending closure of a tab, if any
    pub fn cancel_closure(&self, tab_id: TabId) -> bool {
        let Some(url) = lock(&self.tabs).cancel(tab_id) else {
            return false;
        };
        log::info!("Cancelled closure of tab {tab_id} ({url})");
        true
    }

    /// Whether `tab_id` still shows `url`, as far as the dispatcher knows
    #[must_use]
    pub fn is_showing(&self, tab_id: TabId, url: &str) -> bool {
        lock(&self.tabs).shows(tab_id, url)
    }

    #[must_use]
    pub fn has_pending_closure(&self, tab_id: TabId) -> bool {
        lock(&self.tabs).closures.contains_key(&tab_id)
    }
}

#[cfg(test)]
pub(crate) mod tests;
