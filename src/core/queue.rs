//! # Per-priority wait lanes.
//!
//! One FIFO lane per queueable priority level, most urgent first, plus the
//! shared depth bound. The admission check and the depth increment happen
//! under a single lock so the bound can never be overshot; an atomic mirror
//! of the depth serves lock-free reads on the fast path.
//!
//! ## Rules
//! - A waiter sits in at most one lane at a time.
//! - Within a lane, order is strict FIFO.
//! - Across lanes, [`PriorityQueues::poll_highest`] always empties the most
//!   urgent non-empty lane first.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::{oneshot, OwnedSemaphorePermit};

use crate::priority::Priority;

/// A parked request: its identity, the lane it currently sits in, and the
/// channel a drainer uses to hand it a slot permit.
#[derive(Debug)]
pub(crate) struct Waiter {
    pub id: u64,
    pub priority: Priority,
    resume_tx: oneshot::Sender<OwnedSemaphorePermit>,
}

impl Waiter {
    /// Creates a waiter and the receiving half of its resume channel.
    pub fn channel(
        id: u64,
        priority: Priority,
    ) -> (Self, oneshot::Receiver<OwnedSemaphorePermit>) {
        let (resume_tx, resume_rx) = oneshot::channel();
        (
            Self {
                id,
                priority,
                resume_tx,
            },
            resume_rx,
        )
    }

    /// Hands the permit to the parked request.
    ///
    /// Fails when the request stopped waiting; the permit comes back in the
    /// error so the caller can drop (release) it.
    pub fn resume(self, permit: OwnedSemaphorePermit) -> Result<(), OwnedSemaphorePermit> {
        self.resume_tx.send(permit)
    }
}

/// FIFO wait lanes indexed by urgency, with a shared depth bound.
pub(crate) struct PriorityQueues {
    lanes: Mutex<Vec<VecDeque<Waiter>>>,
    depth: AtomicUsize,
    max_depth: usize,
}

impl PriorityQueues {
    /// Builds `min_priority` lanes, one per level in `[MAX_URGENCY, min]`.
    pub fn new(min_priority: Priority, max_depth: usize) -> Self {
        let lane_count = min_priority.lane() + 1;
        Self {
            lanes: Mutex::new((0..lane_count).map(|_| VecDeque::new()).collect()),
            depth: AtomicUsize::new(0),
            max_depth,
        }
    }

    /// Appends the waiter to the lane for its current priority.
    ///
    /// Returns the depth after the append, or the waiter back when the shared
    /// bound is already met.
    pub fn enqueue(&self, waiter: Waiter) -> Result<usize, Waiter> {
        let mut lanes = self.lanes.lock();
        let depth = self.depth.load(Ordering::Relaxed);
        if depth >= self.max_depth {
            return Err(waiter);
        }
        let lane = waiter.priority.lane();
        lanes[lane].push_back(waiter);
        self.depth.store(depth + 1, Ordering::Relaxed);
        Ok(depth + 1)
    }

    /// Removes a specific waiter from the lane it was parked in.
    ///
    /// `None` means a drainer already popped it.
    pub fn remove(&self, id: u64, priority: Priority) -> Option<Waiter> {
        let mut lanes = self.lanes.lock();
        let lane = &mut lanes[priority.lane()];
        let pos = lane.iter().position(|w| w.id == id)?;
        let waiter = lane.remove(pos)?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        Some(waiter)
    }

    /// Pops the most urgent waiter, scanning lanes from urgency 1 upward.
    pub fn poll_highest(&self) -> Option<Waiter> {
        let mut lanes = self.lanes.lock();
        for lane in lanes.iter_mut() {
            if let Some(waiter) = lane.pop_front() {
                self.depth.fetch_sub(1, Ordering::Relaxed);
                return Some(waiter);
            }
        }
        None
    }

    /// Total parked waiters across all lanes.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// True when every lane is empty.
    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Priority = Priority::new(5);

    fn waiter(id: u64, level: u8) -> Waiter {
        Waiter::channel(id, Priority::new(level)).0
    }

    #[test]
    fn enqueue_tracks_the_shared_depth() {
        let queues = PriorityQueues::new(MIN, 10);
        assert!(queues.is_empty());
        assert_eq!(queues.enqueue(waiter(0, 5)).unwrap(), 1);
        assert_eq!(queues.enqueue(waiter(1, 2)).unwrap(), 2);
        assert_eq!(queues.depth(), 2);
    }

    #[test]
    fn enqueue_refuses_past_the_bound() {
        let queues = PriorityQueues::new(MIN, 2);
        queues.enqueue(waiter(0, 5)).unwrap();
        queues.enqueue(waiter(1, 5)).unwrap();
        let bounced = queues.enqueue(waiter(2, 5));
        assert!(bounced.is_err());
        assert_eq!(queues.depth(), 2);
    }

    #[test]
    fn poll_prefers_the_most_urgent_lane() {
        let queues = PriorityQueues::new(MIN, 10);
        queues.enqueue(waiter(0, 5)).unwrap();
        queues.enqueue(waiter(1, 5)).unwrap();
        queues.enqueue(waiter(2, 1)).unwrap();

        assert_eq!(queues.poll_highest().unwrap().id, 2);
        // Remaining same-priority waiters drain FIFO.
        assert_eq!(queues.poll_highest().unwrap().id, 0);
        assert_eq!(queues.poll_highest().unwrap().id, 1);
        assert!(queues.poll_highest().is_none());
        assert!(queues.is_empty());
    }

    #[test]
    fn remove_pulls_a_specific_waiter() {
        let queues = PriorityQueues::new(MIN, 10);
        queues.enqueue(waiter(0, 3)).unwrap();
        queues.enqueue(waiter(1, 3)).unwrap();

        let removed = queues.remove(0, Priority::new(3)).unwrap();
        assert_eq!(removed.id, 0);
        assert_eq!(queues.depth(), 1);
        // Already gone.
        assert!(queues.remove(0, Priority::new(3)).is_none());
        assert_eq!(queues.poll_highest().unwrap().id, 1);
    }
}
