//! # SlotPool: bounded pool of concurrent service permits.
//!
//! A fair counting semaphore over the configured number of service slots.
//! Acquisition is bounded by the configured timeout; an elapsed timeout and a
//! closed pool both mean "did not get the permit", never an error — the
//! caller decides whether to queue or reject.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time;

/// Bounded pool of service permits.
pub(crate) struct SlotPool {
    slots: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl SlotPool {
    pub fn new(max_concurrent: usize, acquire_timeout: Duration) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(max_concurrent)),
            acquire_timeout,
        }
    }

    /// Waits up to the acquire timeout for one permit.
    ///
    /// Returns `None` on timeout and on a closed pool; both count as
    /// acquisition failure.
    pub async fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        let acquire = Arc::clone(&self.slots).acquire_owned();
        match time::timeout(self.acquire_timeout, acquire).await {
            Ok(Ok(permit)) => Some(permit),
            Ok(Err(_)) | Err(_) => None,
        }
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Closes the pool; pending and future acquires fail.
    pub fn close(&self) {
        self.slots.close();
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn acquire_succeeds_while_permits_remain() {
        let pool = SlotPool::new(2, Duration::from_millis(50));
        let a = pool.try_acquire().await;
        let b = pool.try_acquire().await;
        assert!(a.is_some() && b.is_some());
        assert_eq!(pool.available(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_gives_up_after_the_timeout() {
        let pool = SlotPool::new(1, Duration::from_millis(50));
        let held = pool.try_acquire().await.unwrap();

        let start = Instant::now();
        assert!(pool.try_acquire().await.is_none());
        assert_eq!(start.elapsed(), Duration::from_millis(50));
        drop(held);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_permit_frees_the_slot() {
        let pool = SlotPool::new(1, Duration::from_millis(50));
        let held = pool.try_acquire().await.unwrap();
        drop(held);
        assert!(pool.try_acquire().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_pool_reads_as_acquire_failure() {
        let pool = SlotPool::new(1, Duration::from_millis(50));
        pool.close();
        assert!(pool.try_acquire().await.is_none());
    }
}
