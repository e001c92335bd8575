use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use super::OrderUpdateBroadcast;

/// Fan-out publisher for the customer-filterable broadcast channel.
///
/// Fire-and-forget: a subscriber with no live receiver at publish time gets
/// nothing, and publishing with zero subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<BroadcastEnvelope>,
}

/// An event as it travels on the broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEnvelope {
    pub event: OrderUpdateBroadcast,
    pub published_at: DateTime<Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a broadcast-scoped order update.
    pub fn publish(&self, event: OrderUpdateBroadcast) -> Result<(), PublishError> {
        let envelope = BroadcastEnvelope {
            event,
            published_at: Utc::now(),
        };

        // send() errors only when there are no subscribers, which is
        // acceptable here.
        match self.sender.send(envelope) {
            Ok(_) | Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Subscribe to broadcast events.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEnvelope> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

/// Error types for event publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::OrderState;
    use uuid::Uuid;

    fn sample_event() -> OrderUpdateBroadcast {
        OrderUpdateBroadcast {
            customer_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            status: OrderState::Accepted,
            restaurant_name: Some("Test Kitchen".to_string()),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let publisher = EventPublisher::new(16);
        assert!(publisher.publish(sample_event()).is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let publisher = EventPublisher::new(16);
        let mut rx = publisher.subscribe();

        let event = sample_event();
        publisher.publish(event.clone()).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, event);
    }

    #[tokio::test]
    async fn test_subscriber_count() {
        let publisher = EventPublisher::new(16);
        assert_eq!(publisher.subscriber_count(), 0);
        let _rx = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 1);
    }
}
