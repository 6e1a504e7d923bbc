//! # Priority levels and request classification.
//!
//! [`Priority`] is the urgency class of a request: smaller numbers are more
//! urgent. Two levels are special:
//!
//! - [`Priority::MAX_URGENCY`] (1) — the most urgent level a waiting request
//!   can hold;
//! - [`Priority::BYPASS`] (0) — skips queueing and slot accounting entirely.
//!
//! Queueable priorities lie in `[MAX_URGENCY, min_priority]` inclusive, where
//! `min_priority` comes from [`Config`](crate::Config).
//!
//! [`Priority::from_query`] maps an incoming request to its initial priority
//! by inspecting the raw query string for a `priority` parameter. BYPASS is
//! recognized before range validation; every other unusable value (absent,
//! unparseable, out of range) falls back to `min_priority`.

use std::fmt;

/// Urgency class of a request. Lower levels are more urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    /// Special level that bypasses both queueing and slot accounting.
    pub const BYPASS: Priority = Priority(0);

    /// Most urgent level a waiting request can hold.
    pub const MAX_URGENCY: Priority = Priority(1);

    /// Wraps a raw level. Levels are not range-checked here; the gate clamps
    /// to its configured `min_priority` on admission.
    pub const fn new(level: u8) -> Self {
        Priority(level)
    }

    /// Raw numeric level.
    pub const fn level(self) -> u8 {
        self.0
    }

    /// True for the [`BYPASS`](Self::BYPASS) level.
    pub fn is_bypass(self) -> bool {
        self == Self::BYPASS
    }

    /// True once the level has aged to [`MAX_URGENCY`](Self::MAX_URGENCY).
    pub fn is_max_urgency(self) -> bool {
        self <= Self::MAX_URGENCY
    }

    /// One aging step toward [`MAX_URGENCY`](Self::MAX_URGENCY). Saturates at
    /// the top.
    pub fn promoted(self) -> Priority {
        if self.is_max_urgency() {
            self
        } else {
            Priority(self.0 - 1)
        }
    }

    /// Zero-based wait-lane index, with the MAX_URGENCY end at index 0.
    pub(crate) fn lane(self) -> usize {
        (self.0 - Self::MAX_URGENCY.0) as usize
    }

    /// Extracts the initial priority from a raw request query string.
    ///
    /// The first `priority` parameter wins (percent-decoding applied). Its
    /// integer value is honored when it equals 0 (BYPASS) or lies within
    /// `[MAX_URGENCY, min]`; unparseable, out-of-range, or absent values all
    /// yield `min`.
    pub fn from_query(query: Option<&str>, min: Priority) -> Priority {
        let Some(query) = query else { return min };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key != "priority" {
                continue;
            }
            let Ok(level) = value.parse::<i64>() else {
                return min;
            };
            // BYPASS sits outside the queueable range but is honored first.
            if level == i64::from(Self::BYPASS.0) {
                return Self::BYPASS;
            }
            if level < i64::from(Self::MAX_URGENCY.0) || level > i64::from(min.0) {
                return min;
            }
            return Priority(level as u8);
        }
        min
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Priority = Priority::new(5);

    #[test]
    fn absent_query_defaults_to_min() {
        assert_eq!(Priority::from_query(None, MIN), MIN);
        assert_eq!(Priority::from_query(Some(""), MIN), MIN);
        assert_eq!(Priority::from_query(Some("foo=bar"), MIN), MIN);
    }

    #[test]
    fn in_range_value_is_honored() {
        assert_eq!(Priority::from_query(Some("priority=3"), MIN), Priority::new(3));
        assert_eq!(Priority::from_query(Some("a=b&priority=1"), MIN), Priority::MAX_URGENCY);
        assert_eq!(Priority::from_query(Some("priority=5"), MIN), MIN);
    }

    #[test]
    fn bypass_recognized_before_range_check() {
        assert!(Priority::from_query(Some("priority=0"), MIN).is_bypass());
    }

    #[test]
    fn out_of_range_clamps_to_min() {
        assert_eq!(Priority::from_query(Some("priority=9"), MIN), MIN);
        assert_eq!(Priority::from_query(Some("priority=-2"), MIN), MIN);
    }

    #[test]
    fn unparseable_clamps_to_min() {
        assert_eq!(Priority::from_query(Some("priority=urgent"), MIN), MIN);
        assert_eq!(Priority::from_query(Some("priority="), MIN), MIN);
    }

    #[test]
    fn first_priority_param_wins() {
        assert_eq!(
            Priority::from_query(Some("priority=2&priority=4"), MIN),
            Priority::new(2)
        );
    }

    #[test]
    fn promotion_steps_toward_max_urgency_and_saturates() {
        let mut p = Priority::new(3);
        p = p.promoted();
        assert_eq!(p, Priority::new(2));
        p = p.promoted();
        assert_eq!(p, Priority::MAX_URGENCY);
        assert_eq!(p.promoted(), Priority::MAX_URGENCY);
    }

    #[test]
    fn lane_indexing_is_zero_based_at_max_urgency() {
        assert_eq!(Priority::MAX_URGENCY.lane(), 0);
        assert_eq!(Priority::new(5).lane(), 4);
    }
}
