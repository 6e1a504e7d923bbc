//! # Events per second over the last N event timestamps.

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::ConfigError;

/// Fixed-window event rate.
///
/// A ring buffer of the monotonic timestamps of the most recent `window`
/// events. The reported rate is `count / (newest − oldest)` in events per
/// second, and zero while the window spans no time (fewer than two distinct
/// instants). Timestamps are monotonic so the rate never goes negative when
/// the wall clock steps.
pub struct RollingRate {
    inner: Mutex<Ring>,
}

struct Ring {
    window: usize,
    stamps: Vec<Instant>,
    /// Oldest slot once the ring is full; next write position either way.
    write: usize,
}

impl RollingRate {
    /// Creates a counter over the last `window` events.
    ///
    /// Fails with [`ConfigError::EmptyWindow`] when `window` is zero.
    pub fn new(window: usize) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(Self {
            inner: Mutex::new(Ring {
                window,
                stamps: Vec::with_capacity(window),
                write: 0,
            }),
        })
    }

    /// Records one event at the current instant, evicting the oldest stamp
    /// once the window is full.
    pub fn record(&self) {
        let now = Instant::now();
        let mut ring = self.inner.lock();
        if ring.stamps.len() < ring.window {
            ring.stamps.push(now);
            ring.write = ring.stamps.len() % ring.window;
        } else {
            let write = ring.write;
            ring.stamps[write] = now;
            ring.write = (write + 1) % ring.window;
        }
    }

    /// Current rate in events per second; zero when the recorded window spans
    /// no time.
    pub fn value(&self) -> f64 {
        let ring = self.inner.lock();
        let count = ring.stamps.len();
        if count == 0 {
            return 0.0;
        }
        let (oldest, newest) = if count < ring.window {
            (ring.stamps[0], ring.stamps[count - 1])
        } else {
            let newest = (ring.write + ring.window - 1) % ring.window;
            (ring.stamps[ring.write], ring.stamps[newest])
        };
        let span = newest.saturating_duration_since(oldest);
        if span.is_zero() {
            return 0.0;
        }
        count as f64 / span.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time;

    use super::*;

    #[test]
    fn empty_window_is_rejected() {
        assert!(matches!(RollingRate::new(0), Err(ConfigError::EmptyWindow)));
    }

    #[tokio::test(start_paused = true)]
    async fn coincident_timestamps_read_zero() {
        let rate = RollingRate::new(8).unwrap();
        // Recorded with the clock paused, so every stamp is identical.
        for _ in 0..5 {
            rate.record();
        }
        assert_eq!(rate.value(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_is_count_over_span() {
        let rate = RollingRate::new(8).unwrap();
        rate.record();
        time::advance(Duration::from_millis(100)).await;
        rate.record();
        // Two events 100ms apart.
        assert_eq!(rate.value(), 20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn overflow_evicts_the_oldest_stamp() {
        let rate = RollingRate::new(3).unwrap();
        for _ in 0..4 {
            rate.record();
            time::advance(Duration::from_secs(1)).await;
        }
        // Three surviving stamps span two seconds.
        assert_eq!(rate.value(), 1.5);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_counter_reads_zero() {
        let rate = RollingRate::new(3).unwrap();
        assert_eq!(rate.value(), 0.0);
    }
}
