//! Host Integration Channel
//!
//! Fire-and-forget reporting of completions and clue submissions to the
//! embedding platform. A report never fails from the engine's side.

use tokio::sync::broadcast;
use tracing::debug;

use crate::game::events::HostEvent;

/// Receiver of outward engine events.
pub trait HostChannel: Send + Sync {
    /// Report an event. Must not block gameplay.
    fn report(&self, event: HostEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl HostChannel for NullHost {
    fn report(&self, _event: HostEvent) {}
}

/// Fans events out to any number of async subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastHost {
    tx: broadcast::Sender<HostEvent>,
}

impl BroadcastHost {
    /// Create a channel buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events reported after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastHost {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HostChannel for BroadcastHost {
    fn report(&self, event: HostEvent) {
        // No subscribers is not an error.
        if self.tx.send(event).is_err() {
            debug!("Host event dropped: no subscribers");
        }
    }
}
