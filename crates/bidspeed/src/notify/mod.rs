//! Notification sinks.
//!
//! The controller reports every outcome here. Sinks are observational only:
//! they cannot fail and cannot influence control flow.

pub mod broadcast;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Phase, Stage};

pub use broadcast::{BroadcastSink, StageEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Human-readable message about a stage outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub level: NotificationLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        session_id: &str,
        stage: Option<Stage>,
        level: NotificationLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            stage,
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Phase change of a session, emitted after the state was updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChange {
    pub session_id: String,
    pub from: Phase,
    pub to: Phase,
    pub timestamp: DateTime<Utc>,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);

    fn phase_changed(&self, _change: PhaseChange) {}
}

/// Discards everything.
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _notification: Notification) {}
}

/// Writes notifications to the tracing subscriber.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, n: Notification) {
        let stage = n.stage.map(|s| s.to_string()).unwrap_or_default();
        match n.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(session = %n.session_id, stage = %stage, "{}", n.message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(session = %n.session_id, stage = %stage, "{}", n.message)
            }
            NotificationLevel::Error => {
                tracing::error!(session = %n.session_id, stage = %stage, "{}", n.message)
            }
        }
    }

    fn phase_changed(&self, change: PhaseChange) {
        tracing::debug!(
            session = %change.session_id,
            from = %change.from,
            to = %change.to,
            "Phase changed"
        );
    }
}
