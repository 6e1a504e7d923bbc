//! # Rolling telemetry counters.
//!
//! Two fixed-window counters sit on the completion path of the gate:
//!
//! - [`RollingRate`] — completed requests per second over the last N events;
//! - [`RollingAverage`] — mean service time over the last N samples.
//!
//! Both are ring buffers guarded by their own mutex, sized once at
//! construction (an empty window is a [`ConfigError`](crate::ConfigError)).
//! [`Telemetry`] bundles their readings together with the gate's queue and
//! slot gauges for a point-in-time snapshot.

mod average;
mod rate;

pub use average::RollingAverage;
pub use rate::RollingRate;

/// Point-in-time gauge readings of a gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Telemetry {
    /// Completed (non-rejected) requests per second over the telemetry window.
    pub requests_per_sec: f64,
    /// Mean service time in milliseconds over the telemetry window.
    pub avg_response_ms: f64,
    /// Requests currently parked across all priority lanes.
    pub queued: usize,
    /// Service slots currently free.
    pub available_slots: usize,
}
