//! # Error types used by the admission gate.
//!
//! Two error enums cover the two failure surfaces:
//!
//! - [`ConfigError`] — construction-time failures (bad parameters, unusable
//!   limits). Raised by [`Config::from_params`](crate::Config::from_params)
//!   and [`Gate::new`](crate::Gate::new).
//! - [`Rejected`] — a request that admission control refused. Every variant
//!   maps to HTTP 503 Service Unavailable on the wire; [`Rejected::status`]
//!   documents that contract.
//!
//! Both types provide `as_label` helpers producing short stable snake_case
//! labels for logs and metrics.

use thiserror::Error;

/// Errors raised while building a gate or parsing its configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A recognized parameter carried a malformed integer.
    #[error("invalid integer for '{key}': '{value}'")]
    InvalidValue {
        /// The offending parameter key.
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// `min_priority` sits below the most urgent queueable level (1).
    #[error("min priority {level} is below the most urgent level 1")]
    MinPriorityOutOfRange {
        /// The rejected level.
        level: u8,
    },

    /// The gate needs at least one concurrent service slot.
    #[error("at least one concurrent service slot is required")]
    NoSlots,

    /// A telemetry counter was asked to roll over an empty window.
    #[error("sample window must hold at least one sample")]
    EmptyWindow,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "config_invalid_value",
            ConfigError::MinPriorityOutOfRange { .. } => "config_min_priority",
            ConfigError::NoSlots => "config_no_slots",
            ConfigError::EmptyWindow => "config_empty_window",
        }
    }
}

/// Why admission control refused a request.
///
/// A rejected request never held a service slot and its downstream handler is
/// never invoked. Hosts answer any of these with HTTP 503; a failure to write
/// that response is the host's to swallow, the rejection stands either way.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// The wait lanes were already holding `max_queue_depth` requests.
    #[error("wait queue full ({depth} of {max})")]
    QueueFull {
        /// Depth observed at rejection time.
        depth: usize,
        /// The configured bound.
        max: usize,
    },

    /// Aged to max urgency and ran out of deadline without securing a slot.
    #[error("expired before a service slot became available")]
    Expired,

    /// The gate was shut down while the request was waiting (or on entry).
    #[error("gate closed")]
    Closed,
}

impl Rejected {
    /// HTTP status a host should answer with: 503 Service Unavailable.
    pub const fn status(&self) -> u16 {
        503
    }

    /// Returns a short stable label.
    pub const fn as_label(&self) -> &'static str {
        match self {
            Rejected::QueueFull { .. } => "queue_full",
            Rejected::Expired => "expired",
            Rejected::Closed => "closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rejection_maps_to_503() {
        for rejected in [
            Rejected::QueueFull { depth: 3, max: 3 },
            Rejected::Expired,
            Rejected::Closed,
        ] {
            assert_eq!(rejected.status(), 503);
        }
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(Rejected::Expired.as_label(), "expired");
        assert_eq!(ConfigError::NoSlots.as_label(), "config_no_slots");
    }
}
