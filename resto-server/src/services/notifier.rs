//! Notification bus
//!
//! In-process publish/subscribe for order totals, order status, low stock
//! and resource-change signals. Delivery is best-effort: publishing never
//! fails a request, and slow subscribers drop the oldest messages.

use shared::message::{Notification, NotificationLevel};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast channel wrapper shared through [`crate::core::ServerState`]
#[derive(Clone, Debug)]
pub struct NotificationBus {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to every current subscriber
    ///
    /// Returns the number of subscribers that received it (0 when nobody listens).
    pub fn publish(&self, notification: Notification) -> usize {
        match self.tx.send(notification) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(dropped)) => {
                tracing::trace!(kind = dropped.kind(), "No notification subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Spawn a subscriber that writes every notification to the log
    pub fn spawn_log_subscriber(&self) -> tokio::task::JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notification) => log_notification(&notification),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Notification log subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

fn log_notification(notification: &Notification) {
    let payload = serde_json::to_string(notification).unwrap_or_default();
    match notification.level() {
        NotificationLevel::Critical => {
            tracing::error!(target: "notifications", kind = notification.kind(), %payload)
        }
        NotificationLevel::Warning => {
            tracing::warn!(target: "notifications", kind = notification.kind(), %payload)
        }
        NotificationLevel::Info => {
            tracing::debug!(target: "notifications", kind = notification.kind(), %payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = NotificationBus::new();
        let delivered = bus.publish(Notification::OrderStatusChanged {
            order_id: 1,
            from: OrderStatus::Pending,
            to: OrderStatus::Preparing,
        });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = NotificationBus::new();
        let mut rx = bus.subscribe();

        bus.publish(Notification::OrderStatusChanged {
            order_id: 1,
            from: OrderStatus::Pending,
            to: OrderStatus::Preparing,
        });
        bus.publish(Notification::OrderStatusChanged {
            order_id: 1,
            from: OrderStatus::Preparing,
            to: OrderStatus::Ready,
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(matches!(first, Notification::OrderStatusChanged { to: OrderStatus::Preparing, .. }));
        assert!(matches!(second, Notification::OrderStatusChanged { to: OrderStatus::Ready, .. }));
    }
}
