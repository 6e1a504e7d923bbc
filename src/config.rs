//! # Gate configuration.
//!
//! [`Config`] defines the admission gate's behavior: the accepted priority
//! range, the number of concurrent service slots, the shared wait-queue bound,
//! and the three timing knobs of the promotion ladder.
//!
//! A config can be built directly (all fields are public, `Default` gives the
//! stock values) or parsed from a name→value parameter map the way a host
//! server hands filter init-params around, via [`Config::from_params`].
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use qosgate::Config;
//!
//! let mut cfg = Config::default();
//! cfg.max_concurrent = 4;
//! cfg.promotion_interval = Duration::from_millis(250);
//! assert!(cfg.validate().is_ok());
//!
//! let parsed = Config::from_params([("maxreq", "4"), ("ignored", "x")]).unwrap();
//! assert_eq!(parsed.max_concurrent, 4);
//! ```

use std::str::FromStr;
use std::time::Duration;

use crate::{error::ConfigError, priority::Priority};

/// Admission gate configuration. Immutable once a gate is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Numerically largest (least urgent) priority level accepted.
    pub min_priority: Priority,
    /// Concurrent service slots.
    pub max_concurrent: usize,
    /// Total waiting requests allowed across all priority lanes.
    pub max_queue_depth: usize,
    /// How long the fast path waits for a slot permit.
    pub slot_acquire_timeout: Duration,
    /// Maximum total time from arrival to service start.
    pub request_deadline: Duration,
    /// Time a waiting request spends at each priority level before promotion.
    pub promotion_interval: Duration,
    /// Capacity of the event broadcast channel.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides the stock configuration:
    /// - `min_priority = 5`
    /// - `max_concurrent = 1`
    /// - `max_queue_depth = 100`
    /// - `slot_acquire_timeout = 50ms`
    /// - `request_deadline = 2000ms`
    /// - `promotion_interval = 500ms`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            min_priority: Priority::new(5),
            max_concurrent: 1,
            max_queue_depth: 100,
            slot_acquire_timeout: Duration::from_millis(50),
            request_deadline: Duration::from_millis(2000),
            promotion_interval: Duration::from_millis(500),
            bus_capacity: 1024,
        }
    }
}

impl Config {
    const KEY_MIN_PRIORITY: &'static str = "minpriority";
    const KEY_MAX_REQUESTS: &'static str = "maxreq";
    const KEY_MAX_QUEUE: &'static str = "maxqueue";
    const KEY_LOCK_TIMEOUT: &'static str = "locktimeout";
    const KEY_REQUEST_TIMEOUT: &'static str = "requesttimeout";
    const KEY_PRIORITY_TIMEOUT: &'static str = "prioritytimeout";

    /// Builds a config from a name→value parameter map.
    ///
    /// Recognized keys: `minpriority`, `maxreq`, `maxqueue`, `locktimeout`,
    /// `requesttimeout`, `prioritytimeout` (timeouts in milliseconds).
    /// Unrecognized keys are ignored; malformed integers fail with
    /// [`ConfigError::InvalidValue`]. The result is validated.
    pub fn from_params<'a, I>(params: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut cfg = Config::default();
        for (key, value) in params {
            match key {
                Self::KEY_MIN_PRIORITY => cfg.min_priority = Priority::new(parse(key, value)?),
                Self::KEY_MAX_REQUESTS => cfg.max_concurrent = parse(key, value)?,
                Self::KEY_MAX_QUEUE => cfg.max_queue_depth = parse(key, value)?,
                Self::KEY_LOCK_TIMEOUT => {
                    cfg.slot_acquire_timeout = Duration::from_millis(parse(key, value)?)
                }
                Self::KEY_REQUEST_TIMEOUT => {
                    cfg.request_deadline = Duration::from_millis(parse(key, value)?)
                }
                Self::KEY_PRIORITY_TIMEOUT => {
                    cfg.promotion_interval = Duration::from_millis(parse(key, value)?)
                }
                _ => {}
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks the configuration for values the gate cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_priority < Priority::MAX_URGENCY {
            return Err(ConfigError::MinPriorityOutOfRange {
                level: self.min_priority.level(),
            });
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::NoSlots);
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_values() {
        let cfg = Config::default();
        assert_eq!(cfg.min_priority, Priority::new(5));
        assert_eq!(cfg.max_concurrent, 1);
        assert_eq!(cfg.max_queue_depth, 100);
        assert_eq!(cfg.slot_acquire_timeout, Duration::from_millis(50));
        assert_eq!(cfg.request_deadline, Duration::from_millis(2000));
        assert_eq!(cfg.promotion_interval, Duration::from_millis(500));
    }

    #[test]
    fn from_params_overrides_known_keys() {
        let cfg = Config::from_params([
            ("minpriority", "3"),
            ("maxreq", "8"),
            ("maxqueue", "20"),
            ("locktimeout", "10"),
            ("requesttimeout", "1500"),
            ("prioritytimeout", "100"),
        ])
        .unwrap();
        assert_eq!(cfg.min_priority, Priority::new(3));
        assert_eq!(cfg.max_concurrent, 8);
        assert_eq!(cfg.max_queue_depth, 20);
        assert_eq!(cfg.slot_acquire_timeout, Duration::from_millis(10));
        assert_eq!(cfg.request_deadline, Duration::from_millis(1500));
        assert_eq!(cfg.promotion_interval, Duration::from_millis(100));
    }

    #[test]
    fn from_params_ignores_unknown_keys() {
        let cfg = Config::from_params([("somebodyelse", "true")]).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn from_params_rejects_malformed_integers() {
        let err = Config::from_params([("maxreq", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "maxreq"));
    }

    #[test]
    fn validate_rejects_priority_below_max_urgency() {
        let err = Config::from_params([("minpriority", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::MinPriorityOutOfRange { level: 0 }));
    }

    #[test]
    fn validate_rejects_zero_slots() {
        let err = Config::from_params([("maxreq", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::NoSlots));
    }
}
