//! # Gate events and their metadata.
//!
//! [`EventKind`] classifies the admission lifecycle; [`Event`] carries the
//! optional metadata each kind needs (request id, priority, queue depth,
//! wait/service durations, gauge readings at completion).
//!
//! ## Ordering
//! Each event gets a globally unique, monotonically increasing sequence
//! number (`seq`), so listeners can order events even when they arrive
//! through buffered channels. The wall-clock stamp `at` is for display only.
//!
//! ## Example
//! ```
//! use qosgate::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::Rejected)
//!     .with_request(7)
//!     .with_reason("queue_full");
//!
//! assert_eq!(ev.kind, EventKind::Rejected);
//! assert_eq!(ev.request, Some(7));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::priority::Priority;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of gate events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Request carried the bypass priority and skipped admission control.
    Bypassed,
    /// Fast path: empty wait lanes and a free slot, dispatched immediately.
    Admitted,
    /// Request parked in a wait lane at its current priority.
    Enqueued,
    /// Waiting request aged one step toward max urgency.
    Promoted,
    /// Parked request was granted a slot by the drain loop.
    Resumed,
    /// Request refused: queue full, expired, or gate closed.
    Rejected,
    /// Admitted request finished; telemetry recorded.
    Completed,
    /// Gate shut down.
    Closed,
}

/// Gate event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may step with NTP; for display only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Request correlation id, if applicable.
    pub request: Option<u64>,
    /// Priority level the request holds after the transition.
    pub priority: Option<u8>,
    /// Total waiting requests after the transition.
    pub depth: Option<usize>,
    /// Rejection reason label.
    pub reason: Option<&'static str>,
    /// Arrival-to-dispatch (or arrival-to-rejection) duration.
    pub wait: Option<Duration>,
    /// Dispatch-to-completion duration.
    pub service: Option<Duration>,
    /// Requests-per-second gauge at completion time.
    pub rate: Option<f64>,
    /// Mean response-time gauge in milliseconds at completion time.
    pub avg_response_ms: Option<f64>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and the
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            request: None,
            priority: None,
            depth: None,
            reason: None,
            wait: None,
            service: None,
            rate: None,
            avg_response_ms: None,
        }
    }

    /// Attaches a request correlation id.
    pub fn with_request(mut self, id: u64) -> Self {
        self.request = Some(id);
        self
    }

    /// Attaches the request's priority level.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority.level());
        self
    }

    /// Attaches the total queue depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Attaches a rejection reason label.
    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Attaches the time spent waiting for dispatch.
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Attaches the service duration.
    pub fn with_service(mut self, service: Duration) -> Self {
        self.service = Some(service);
        self
    }

    /// Attaches the requests-per-second gauge reading.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Attaches the mean response-time gauge reading.
    pub fn with_avg_response_ms(mut self, avg: f64) -> Self {
        self.avg_response_ms = Some(avg);
        self
    }
}
