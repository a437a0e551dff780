// Simulated delivery and read receipts.
//
// Each tracked message gets two fire-once timers, both measured from the moment it
// was tracked. The resulting status updates arrive on a channel that the UI loop
// drains; they are never cancelled and never fail.

use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Duration, Instant};

use crate::models::{DeliveryStatus, MessageId};

/// Offset from send time at which a message counts as delivered.
pub const DELIVERED_AFTER: Duration = Duration::from_millis(1000);
/// Offset from send time at which a message counts as read.
pub const READ_AFTER: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub id: MessageId,
    pub status: DeliveryStatus,
}

/// Something that advances the status of outgoing messages after they are sent.
///
/// The simulated implementation uses fixed timers; a transport-backed one would
/// emit the same updates when acknowledgments arrive.
pub trait DeliveryTracker {
    fn track(&self, id: &MessageId);
}

/// Status a message should have `elapsed` after it was sent.
pub fn status_at(elapsed: Duration) -> DeliveryStatus {
    if elapsed >= READ_AFTER {
        DeliveryStatus::Read
    } else if elapsed >= DELIVERED_AFTER {
        DeliveryStatus::Delivered
    } else {
        DeliveryStatus::Sending
    }
}

/// Timer-driven receipts. Requires a running tokio runtime.
#[derive(Clone)]
pub struct SimulatedReceipts {
    tx: UnboundedSender<StatusUpdate>,
}

impl SimulatedReceipts {
    pub fn new() -> (Self, UnboundedReceiver<StatusUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SimulatedReceipts { tx }, rx)
    }

    fn schedule(&self, id: MessageId, status: DeliveryStatus, deadline: Instant) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Err(e) = tx.send(StatusUpdate { id, status }) {
                debug!("Dropping status update, receiver gone: {:?}", e.0);
            }
        });
    }
}

impl DeliveryTracker for SimulatedReceipts {
    fn track(&self, id: &MessageId) {
        let sent_at = Instant::now();
        debug!("Scheduling receipts for message {}", id);
        self.schedule(id.clone(), DeliveryStatus::Delivered, sent_at + DELIVERED_AFTER);
        self.schedule(id.clone(), DeliveryStatus::Read, sent_at + READ_AFTER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_at_boundaries() {
        assert_eq!(status_at(Duration::ZERO), DeliveryStatus::Sending);
        assert_eq!(status_at(Duration::from_millis(999)), DeliveryStatus::Sending);
        assert_eq!(status_at(Duration::from_millis(1000)), DeliveryStatus::Delivered);
        assert_eq!(status_at(Duration::from_millis(2999)), DeliveryStatus::Delivered);
        assert_eq!(status_at(Duration::from_millis(3000)), DeliveryStatus::Read);
        assert_eq!(status_at(Duration::from_secs(3600)), DeliveryStatus::Read);
    }

    #[tokio::test(start_paused = true)]
    async fn test_receiver_dropped_is_harmless() {
        let (receipts, rx) = SimulatedReceipts::new();
        drop(rx);

        receipts.track(&MessageId("42".to_string()));
        tokio::time::advance(READ_AFTER).await;
        tokio::task::yield_now().await;
    }
}
