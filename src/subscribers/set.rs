//! # Non-blocking fan-out over the registered subscribers.
//!
//! [`SubscriberSet`] hands each [`Event`] to every subscriber **without
//! awaiting** any of them: `emit` pushes an `Arc`-clone of the event into each
//! subscriber's bounded queue and returns. One worker task per subscriber
//! drains its queue in FIFO order with panic isolation.
//!
//! Guarantees: `emit` never blocks, per-subscriber FIFO, panic isolation.
//! Non-guarantees: no ordering across subscribers, no retry when a queue
//! overflows (the event is dropped for that subscriber and a warning is
//! printed).

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;

use super::Subscribe;

struct Channel {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out set with one bounded queue and worker task per subscriber.
pub struct SubscriberSet {
    channels: Vec<Channel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called inside a Tokio runtime when `subscribers` is non-empty.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subscribers.len());
        let mut workers = Vec::with_capacity(subscribers.len());

        for subscriber in subscribers {
            let (tx, rx) = mpsc::channel(subscriber.queue_capacity().max(1));
            channels.push(Channel {
                name: subscriber.name(),
                tx,
            });
            workers.push(Self::spawn_worker(subscriber, rx));
        }

        Self { channels, workers }
    }

    fn spawn_worker(
        subscriber: Arc<dyn Subscribe>,
        mut rx: mpsc::Receiver<Arc<Event>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let handled = std::panic::AssertUnwindSafe(subscriber.on_event(ev.as_ref()))
                    .catch_unwind()
                    .await;
                if let Err(panic) = handled {
                    eprintln!(
                        "[qosgate] subscriber '{}' panicked: {:?}",
                        subscriber.name(),
                        panic
                    );
                }
            }
        })
    }

    /// Fans one event out to every subscriber (non-blocking).
    ///
    /// A full or closed queue drops the event for that subscriber only.
    pub fn emit(&self, event: &Event) {
        if self.channels.is_empty() {
            return;
        }
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            if let Err(e) = channel.tx.try_send(Arc::clone(&ev)) {
                let reason = match e {
                    mpsc::error::TrySendError::Full(_) => "queue full",
                    mpsc::error::TrySendError::Closed(_) => "worker closed",
                };
                eprintln!(
                    "[qosgate] subscriber '{}' dropped event: {reason}",
                    channel.name
                );
            }
        }
    }

    /// Closes all queues and waits for the workers to finish their backlogs.
    pub async fn shutdown(self) {
        drop(self.channels);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True when no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::events::EventKind;

    use super::*;

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl Subscribe for Counting {
        async fn on_event(&self, _event: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct Panicking;

    #[async_trait]
    impl Subscribe for Panicking {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn events_reach_every_subscriber() {
        let seen = Arc::new(AtomicUsize::new(0));
        let set = SubscriberSet::new(vec![Arc::new(Counting(Arc::clone(&seen))) as _]);

        for _ in 0..3 {
            set.emit(&Event::now(EventKind::Admitted));
        }
        set.shutdown().await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn a_panicking_subscriber_does_not_poison_the_set() {
        let seen = Arc::new(AtomicUsize::new(0));
        let set = SubscriberSet::new(vec![
            Arc::new(Panicking) as _,
            Arc::new(Counting(Arc::clone(&seen))) as _,
        ]);

        set.emit(&Event::now(EventKind::Rejected));
        set.emit(&Event::now(EventKind::Completed));
        set.shutdown().await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
