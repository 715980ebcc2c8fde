//! Stage event broadcaster for real-time status streaming.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::{Notification, NotificationSink, PhaseChange};

/// Event fanned out to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StageEvent {
    Notification(Notification),
    PhaseChanged(PhaseChange),
}

/// Broadcasts stage events to any number of subscribers.
#[derive(Clone)]
pub struct BroadcastSink {
    sender: Arc<broadcast::Sender<StageEvent>>,
}

impl BroadcastSink {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: StageEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for stage events.
    pub fn subscribe(&self) -> broadcast::Receiver<StageEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(100)
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: Notification) {
        self.send(StageEvent::Notification(notification));
    }

    fn phase_changed(&self, change: PhaseChange) {
        self.send(StageEvent::PhaseChanged(change));
    }
}
