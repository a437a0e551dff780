// Shared helpers for the integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Once;

use log::LevelFilter;
use tokio::sync::mpsc::UnboundedReceiver;

use whispr::{DeliveryTracker, MessageId, StatusUpdate};

static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// Tracker that only remembers which ids it was handed.
#[derive(Default)]
pub struct RecordingTracker {
    pub tracked: RefCell<Vec<MessageId>>,
}

impl DeliveryTracker for RecordingTracker {
    fn track(&self, id: &MessageId) {
        self.tracked.borrow_mut().push(id.clone());
    }
}

/// Let spawned timer tasks run, then collect whatever they have sent.
pub async fn drain_updates(rx: &mut UnboundedReceiver<StatusUpdate>) -> Vec<StatusUpdate> {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}
