//! Broadcast hub: process-wide fan-out of mutation events.
//!
//! Explicitly constructed at startup and handed to the feed service and the
//! subscribe handler; there is no global channel and no reachable
//! publish-before-init state. Delivery is best-effort: subscribers connected
//! at publish time receive the event, nobody else ever does. No buffering
//! beyond channel capacity, no replay.

use tokio::sync::broadcast;
use tracing::debug;

use crate::models::FeedEvent;

pub struct FeedHub {
    tx: broadcast::Sender<FeedEvent>,
}

impl FeedHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Deliver `event` to every currently connected subscriber. Zero
    /// subscribers is the normal idle case, not an error.
    pub fn publish(&self, event: FeedEvent) {
        match self.tx.send(event) {
            Ok(n) => debug!("feed event delivered to {} subscribers", n),
            Err(_) => debug!("feed event dropped, no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
