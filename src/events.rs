//! Transition event stream consumed by the badge-evaluation collaborator.
//!
//! Delivery is broadcast and lossy under lag: badge evaluation is a
//! downstream consumer, not a ledger. The mastery record itself is the
//! durable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

use crate::models::MasteryStatus;

const CHANNEL_CAPACITY: usize = 1024;

/// Emitted once per applied mastery transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub learner_id: String,
    pub item_id: String,
    pub was_correct: bool,
    pub new_status: MasteryStatus,
    pub at: DateTime<Utc>,
}

/// Broadcast channel for transition events. Cloning shares the underlying
/// channel; receivers created before a publish see it, late subscribers do
/// not.
#[derive(Debug, Clone)]
pub struct TransitionEvents {
    sender: broadcast::Sender<TransitionEvent>,
}

impl TransitionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: TransitionEvent) {
        if let Err(err) = self.sender.send(event) {
            debug!(item_id = %err.0.item_id, "transition event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.sender.subscribe()
    }

    /// `Stream` view for collaborators that consume with `StreamExt`.
    pub fn stream(&self) -> BroadcastStream<TransitionEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TransitionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(item_id: &str, new_status: MasteryStatus) -> TransitionEvent {
        TransitionEvent {
            learner_id: "s1".to_string(),
            item_id: item_id.to_string(),
            was_correct: true,
            new_status,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let events = TransitionEvents::new();
        let mut receiver = events.subscribe();

        events.publish(event("i1", MasteryStatus::Learning));
        events.publish(event("i2", MasteryStatus::Mastered));

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.item_id, "i1");
        assert_eq!(first.new_status, MasteryStatus::Learning);

        let second = receiver.recv().await.unwrap();
        assert_eq!(second.item_id, "i2");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let events = TransitionEvents::new();
        assert_eq!(events.subscriber_count(), 0);
        events.publish(event("i1", MasteryStatus::New));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let events = TransitionEvents::new();
        events.publish(event("early", MasteryStatus::Learning));

        let mut receiver = events.subscribe();
        events.publish(event("late", MasteryStatus::Learning));

        let seen = receiver.recv().await.unwrap();
        assert_eq!(seen.item_id, "late");
    }
}
