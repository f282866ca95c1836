//! Messages exchanged with the browser extension.

use chrono::{DateTime, Utc};
use focus_ai::PageContent;
use focus_storage::NavigationEvent;
use serde::{Deserialize, Serialize};

use crate::dispatcher::{Notice, TabId, Warning};

/// Message sent by the extension to the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    /// A navigation finished loading in some frame of a tab
    NavigationCompleted {
        url: String,
        tab_id: TabId,
        frame_id: i64,
        /// Milliseconds since the Unix epoch, as reported by the browser
        #[serde(default)]
        timestamp: Option<f64>,
    },
    /// Content script extracted a page and asks for a verdict
    ContentAnalysis { tab_id: TabId, content: PageContent },
    TabRemoved { tab_id: TabId },
    TabCloseFailed { tab_id: TabId, error: String },
    Ping,
}

impl InboundMessage {
    /// Convert a navigation message into an event, stamping it now if the
    /// browser gave no usable time
    #[must_use]
    pub fn navigation_event(&self) -> Option<NavigationEvent> {
        let Self::NavigationCompleted {
            url,
            tab_id,
            frame_id,
            timestamp,
        } = self
        else {
            return None;
        };

        #[allow(clippy::cast_possible_truncation)]
        let timestamp = (*timestamp)
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
            .unwrap_or_else(Utc::now);

        Some(NavigationEvent {
            url: url.clone(),
            tab_id: *tab_id,
            frame_id: *frame_id,
            timestamp,
        })
    }
}

/// Message sent by the host to the extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    ShowPopup {
        tab_id: TabId,
        message: String,
        duration: u64,
    },
    ShowWarning {
        tab_id: TabId,
        message: String,
        reason: String,
        summary: String,
        duration: u64,
    },
    CloseTab {
        tab_id: TabId,
    },
    Pong {
        status: String,
    },
}

impl OutboundMessage {
    #[must_use]
    pub fn popup(tab_id: TabId, notice: Notice) -> Self {
        Self::ShowPopup {
            tab_id,
            message: notice.message,
            duration: notice.duration_ms,
        }
    }

    #[must_use]
    pub fn warning(tab_id: TabId, warning: Warning) -> Self {
        Self::ShowWarning {
            tab_id,
            message: warning.message,
            reason: warning.reason,
            summary: warning.summary,
            duration: warning.duration_ms,
        }
    }

    #[must_use]
    pub fn pong() -> Self {
        Self::Pong {
            status: "ready".to_string(),
        }
    }
}
