//! # Event subscriber trait.
//!
//! [`Subscribe`] plugs custom event handling (logging, metrics export,
//! alerting) into a gate. Each subscriber runs in isolation:
//!
//! - a **dedicated worker task** consumes its queue sequentially (FIFO);
//! - the queue is **bounded** ([`Subscribe::queue_capacity`]); when it is
//!   full, new events are dropped for this subscriber only;
//! - **panics are caught** inside the worker and do not reach the gate or
//!   other subscribers.
//!
//! ## Example
//! ```no_run
//! use async_trait::async_trait;
//! use qosgate::{Event, EventKind, Subscribe};
//!
//! struct RejectCounter;
//!
//! #[async_trait]
//! impl Subscribe for RejectCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::Rejected {
//!             // bump a counter, emit a metric, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "reject-counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event sink for gate observability.
///
/// Implementations should use async I/O and handle their own errors; slow
/// processing only backs up this subscriber's queue, and a panic is caught
/// and reported without affecting the gate.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's worker task, never from the admission
    /// path itself.
    async fn on_event(&self, event: &Event);

    /// Short name used when reporting drops and panics for this subscriber.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's event queue.
    ///
    /// When the queue is full the newest event is dropped for this subscriber
    /// only. Defaults to 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
