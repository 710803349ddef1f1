//! Store change notifications.
//!
//! The persistent stores push change notifications instead of being polled.
//! Store adapters publish into a `ChangeFeed`; the engine subscribes and
//! refreshes its snapshot on every `Schedule` change. Dropping the receiver
//! unsubscribes.

use tokio::sync::broadcast;

/// Which store collection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Schedule,
    Sessions,
}

#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<StoreChange>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        ChangeFeed { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.tx.subscribe()
    }

    /// Publish a change. Nobody listening is fine.
    pub fn publish(&self, change: StoreChange) {
        let _ = self.tx.send(change);
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        ChangeFeed::new()
    }
}
