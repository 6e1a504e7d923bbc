//! # Broadcast channel for gate events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so the gate can hand every
//! lifecycle [`Event`] to any number of independent listeners.
//!
//! - **Broadcast semantics**: every active receiver sees a clone of each event.
//! - **Non-persistent**: events published with no receivers are dropped; the
//!   gate runs fine unobserved.
//! - **Bounded**: when a receiver lags past the channel capacity it loses the
//!   oldest events, never blocks the publisher.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for gate events.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding up to `capacity` undelivered events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers (non-blocking).
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that will see all events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
