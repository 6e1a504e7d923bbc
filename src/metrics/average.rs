//! # Rolling mean over the last N integer samples.

use parking_lot::Mutex;

use crate::error::ConfigError;

/// Fixed-window mean of integer samples.
///
/// A ring buffer of the most recent `window` samples plus a running sum; the
/// reported mean is `sum / count`, where `count` caps at the window size.
/// All mutation is serialized under a single mutex; reads take the same lock.
pub struct RollingAverage {
    inner: Mutex<Ring>,
}

struct Ring {
    samples: Vec<u64>,
    /// Next slot to write; once the ring is full this is also the oldest sample.
    write: usize,
    /// Valid samples recorded so far, capped at the window size.
    len: usize,
    sum: u128,
}

impl RollingAverage {
    /// Creates a counter over the last `window` samples.
    ///
    /// Fails with [`ConfigError::EmptyWindow`] when `window` is zero.
    pub fn new(window: usize) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(Self {
            inner: Mutex::new(Ring {
                samples: vec![0; window],
                write: 0,
                len: 0,
                sum: 0,
            }),
        })
    }

    /// Records a sample, evicting the oldest once the window is full.
    pub fn record(&self, value: u64) {
        let mut ring = self.inner.lock();
        let cap = ring.samples.len();
        if ring.len == cap {
            let evicted = ring.samples[ring.write];
            ring.sum -= u128::from(evicted);
        } else {
            ring.len += 1;
        }
        let write = ring.write;
        ring.samples[write] = value;
        ring.write = (write + 1) % cap;
        ring.sum += u128::from(value);
    }

    /// Current mean; zero while no samples have been recorded.
    pub fn value(&self) -> f64 {
        let ring = self.inner.lock();
        if ring.len == 0 {
            return 0.0;
        }
        ring.sum as f64 / ring.len as f64
    }
}
