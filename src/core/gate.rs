//! # Gate: the admission scheduler.
//!
//! [`Gate`] decides, for every incoming request, whether it is serviced now,
//! parked in a priority lane, or refused. One request traverses one of these
//! paths:
//!
//! ```text
//! admit(p)
//!  ├─ p == BYPASS ───────────────────────────► Ticket (no slot, no queue)
//!  ├─ lanes empty + slot within timeout ─────► Ticket (fast path)
//!  └─ park in lane p
//!       ├─ drained into a free slot ─────────► Ticket
//!       ├─ round timer, p > MAX_URGENCY ─────► promote to p−1, park again
//!       ├─ round timer, p == MAX_URGENCY ────► Err(Expired)
//!       ├─ lane bound hit on (re)enqueue ────► Err(QueueFull)
//!       └─ gate closed ──────────────────────► Err(Closed)
//!
//! complete(ticket)
//!  └─ record telemetry, release the slot, drain the lanes
//! ```
//!
//! ## Rules
//! - At most `max_concurrent` scheduled tickets exist at any moment; BYPASS
//!   tickets are invisible to the slot pool.
//! - The first suspension round always lasts `promotion_interval`; the round
//!   armed when a waiter reaches MAX_URGENCY is whatever remains of
//!   `request_deadline`, so an exhausted deadline fires immediately.
//! - A freed slot always goes to the most urgent parked waiter; within a
//!   lane, strict FIFO.
//! - The round timer and a concurrent slot grant are reconciled through lane
//!   membership: whoever removes the waiter from its lane owns its fate, so
//!   no permit is leaked and nothing is dispatched twice.
//! - Every pass that touches the wait lanes ends by running the drain loop,
//!   so freed capacity is always offered to the most urgent waiter.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, OwnedSemaphorePermit};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::{ConfigError, Rejected},
    events::{Bus, Event, EventKind},
    metrics::{RollingAverage, RollingRate, Telemetry},
    priority::Priority,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    queue::{PriorityQueues, Waiter},
    slot::SlotPool,
};

/// Completed (non-rejected) requests covered by each telemetry gauge.
const TELEMETRY_WINDOW: usize = 100;

/// Proof of admission, held while the downstream handler runs.
///
/// Scheduled tickets own one slot permit. Dropping a ticket releases the slot
/// either way, but only [`Gate::complete`] records telemetry and drains the
/// wait lanes — prefer completing over dropping.
#[derive(Debug)]
pub struct Ticket {
    request: u64,
    arrival: Instant,
    serviced_at: Instant,
    permit: Option<OwnedSemaphorePermit>,
    bypass: bool,
}

impl Ticket {
    fn bypass(request: u64) -> Self {
        let now = Instant::now();
        Self {
            request,
            arrival: now,
            serviced_at: now,
            permit: None,
            bypass: true,
        }
    }

    fn scheduled(request: u64, arrival: Instant, permit: OwnedSemaphorePermit) -> Self {
        Self {
            request,
            arrival,
            serviced_at: Instant::now(),
            permit: Some(permit),
            bypass: false,
        }
    }

    /// Request correlation id, matching the gate's event stream.
    pub fn request(&self) -> u64 {
        self.request
    }

    /// True when the request carried the bypass priority.
    pub fn is_bypass(&self) -> bool {
        self.bypass
    }
}

/// Priority-aware admission gate.
///
/// A bounded pool of service slots shared across priority classes. When the
/// pool is saturated, requests wait in per-priority FIFO lanes and age toward
/// max urgency until they secure a slot or expire. See the module docs for
/// the full state machine.
///
/// The gate is `Send + Sync`; hosts share one instance (typically in an
/// `Arc`) across their worker tasks.
pub struct Gate {
    cfg: Config,
    slots: SlotPool,
    lanes: PriorityQueues,
    rate: RollingRate,
    response_time: RollingAverage,
    bus: Bus,
    subs: SubscriberSet,
    closing: CancellationToken,
    next_request: AtomicU64,
}

impl Gate {
    /// Builds a gate from a validated configuration.
    ///
    /// Must be called inside a Tokio runtime when `subscribers` is non-empty
    /// (each subscriber gets a worker task).
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            slots: SlotPool::new(cfg.max_concurrent, cfg.slot_acquire_timeout),
            lanes: PriorityQueues::new(cfg.min_priority, cfg.max_queue_depth),
            rate: RollingRate::new(TELEMETRY_WINDOW)?,
            response_time: RollingAverage::new(TELEMETRY_WINDOW)?,
            bus: Bus::new(cfg.bus_capacity),
            subs: SubscriberSet::new(subscribers),
            closing: CancellationToken::new(),
            next_request: AtomicU64::new(0),
            cfg,
        })
    }

    /// Admits by query-string priority, runs the handler, completes.
    ///
    /// The downstream handler is invoked exactly once, and only for admitted
    /// requests; a rejected request returns the [`Rejected`] reason the host
    /// should answer with 503.
    pub async fn serve<F, Fut, T>(&self, query: Option<&str>, handler: F) -> Result<T, Rejected>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let priority = Priority::from_query(query, self.cfg.min_priority);
        let ticket = self.admit(priority).await?;
        let output = handler().await;
        self.complete(ticket).await;
        Ok(output)
    }

    /// Runs the admission decision for a request at the given priority.
    ///
    /// Levels beyond the configured `min_priority` clamp to `min_priority`.
    /// The returned [`Ticket`] must be handed back via [`Gate::complete`]
    /// when the downstream work finishes.
    pub async fn admit(&self, priority: Priority) -> Result<Ticket, Rejected> {
        let request = self.next_request.fetch_add(1, Ordering::Relaxed);

        if priority.is_bypass() {
            self.publish(Event::now(EventKind::Bypassed).with_request(request));
            return Ok(Ticket::bypass(request));
        }

        let priority = priority.min(self.cfg.min_priority);
        let arrival = Instant::now();
        if self.closing.is_cancelled() {
            return self.reject(request, arrival, Rejected::Closed).await;
        }

        // Fast path: nothing is waiting and a slot frees up in time.
        if self.lanes.is_empty() {
            if let Some(permit) = self.slots.try_acquire().await {
                self.publish(
                    Event::now(EventKind::Admitted)
                        .with_request(request)
                        .with_priority(priority),
                );
                return Ok(Ticket::scheduled(request, arrival, permit));
            }
        }

        self.park(request, arrival, priority).await
    }

    /// Finishes an admitted request.
    ///
    /// Scheduled tickets record the service time into the rolling gauges,
    /// release their slot, and drain the wait lanes. BYPASS tickets held no
    /// slot and touch no counters; they only drain.
    pub async fn complete(&self, ticket: Ticket) {
        if ticket.bypass {
            self.drain().await;
            return;
        }

        let service = ticket.serviced_at.elapsed();
        let wait = ticket.serviced_at - ticket.arrival;
        self.rate.record();
        self.response_time.record(service.as_millis() as u64);
        self.publish(
            Event::now(EventKind::Completed)
                .with_request(ticket.request)
                .with_wait(wait)
                .with_service(service)
                .with_rate(self.rate.value())
                .with_avg_response_ms(self.response_time.value()),
        );

        drop(ticket); // releases the slot permit
        self.drain().await;
    }

    /// Shuts the gate down.
    ///
    /// New admissions and parked waiters reject with [`Rejected::Closed`],
    /// and the slot pool stops handing out permits. Requests already being
    /// serviced finish normally.
    pub fn close(&self) {
        if self.closing.is_cancelled() {
            return;
        }
        self.closing.cancel();
        self.slots.close();
        self.publish(Event::now(EventKind::Closed));
    }

    /// Closes the gate and waits for the subscriber workers to flush.
    pub async fn shutdown(self) {
        self.close();
        self.subs.shutdown().await;
    }

    /// Point-in-time gauge readings.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            requests_per_sec: self.rate.value(),
            avg_response_ms: self.response_time.value(),
            queued: self.lanes.depth(),
            available_slots: self.slots.available(),
        }
    }

    /// Subscribes to the gate's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Parks the request in the wait lanes and walks the promotion ladder
    /// until it is granted a slot or rejected.
    async fn park(
        &self,
        request: u64,
        arrival: Instant,
        original: Priority,
    ) -> Result<Ticket, Rejected> {
        let mut current = original;
        let (mut waiter, mut resume_rx) = Waiter::channel(request, current);
        // The first suspension round always runs a full promotion interval,
        // even for an arrival already at max urgency.
        let mut round = self.cfg.promotion_interval;
        let mut first_pass = true;

        loop {
            match self.lanes.enqueue(waiter) {
                Ok(depth) => {
                    if first_pass {
                        first_pass = false;
                        self.publish(
                            Event::now(EventKind::Enqueued)
                                .with_request(request)
                                .with_priority(current)
                                .with_depth(depth),
                        );
                    }
                }
                Err(_bounced) => {
                    let reason = Rejected::QueueFull {
                        depth: self.lanes.depth(),
                        max: self.cfg.max_queue_depth,
                    };
                    return self.reject(request, arrival, reason).await;
                }
            }

            // The round timer is armed at suspension time, before the drain
            // pass, so queue maintenance does not stretch the ladder.
            let sleep = time::sleep(round);
            tokio::pin!(sleep);
            self.drain().await;

            tokio::select! {
                biased;

                resumed = &mut resume_rx => match resumed {
                    Ok(permit) => return Ok(self.dispatch(request, arrival, current, permit)),
                    // Lane dropped the sender without a permit: shutdown.
                    Err(_) => return self.reject(request, arrival, Rejected::Closed).await,
                },

                _ = &mut sleep => {
                    match self.lanes.remove(request, current) {
                        Some(w) => waiter = w,
                        None => {
                            // A drainer popped this waiter between the timer
                            // firing and the removal; the permit is in flight.
                            match resume_rx.await {
                                Ok(permit) => {
                                    return Ok(self.dispatch(request, arrival, current, permit))
                                }
                                Err(_) => {
                                    return self.reject(request, arrival, Rejected::Closed).await
                                }
                            }
                        }
                    }

                    if current.is_max_urgency() {
                        // Aged to the top without a slot: out of road.
                        return self.reject(request, arrival, Rejected::Expired).await;
                    }
                    current = current.promoted();
                    waiter.priority = current;
                    round = if current.is_max_urgency() {
                        self.cfg.request_deadline.saturating_sub(arrival.elapsed())
                    } else {
                        self.cfg.promotion_interval
                    };
                    self.publish(
                        Event::now(EventKind::Promoted)
                            .with_request(request)
                            .with_priority(current),
                    );
                }

                _ = self.closing.cancelled() => {
                    self.lanes.remove(request, current);
                    // A permit may already be in flight; give it back.
                    if let Ok(permit) = resume_rx.try_recv() {
                        drop(permit);
                    }
                    return self.reject(request, arrival, Rejected::Closed).await;
                }
            }
        }
    }

    /// Stamps the service start and reports the dispatch of a drained waiter.
    fn dispatch(
        &self,
        request: u64,
        arrival: Instant,
        priority: Priority,
        permit: OwnedSemaphorePermit,
    ) -> Ticket {
        let ticket = Ticket::scheduled(request, arrival, permit);
        self.publish(
            Event::now(EventKind::Resumed)
                .with_request(request)
                .with_priority(priority)
                .with_wait(ticket.serviced_at - ticket.arrival),
        );
        ticket
    }

    /// Refuses a request: publishes the rejection and drains the lanes.
    ///
    /// A rejected request never held a slot, so nothing is released here.
    async fn reject(
        &self,
        request: u64,
        arrival: Instant,
        reason: Rejected,
    ) -> Result<Ticket, Rejected> {
        self.publish(
            Event::now(EventKind::Rejected)
                .with_request(request)
                .with_reason(reason.as_label())
                .with_wait(arrival.elapsed()),
        );
        self.drain().await;
        Err(reason)
    }

    /// Grants freed slots to the most urgent parked waiters.
    ///
    /// Holds at most one freshly acquired permit at a time. When the poll
    /// comes up empty, or the popped waiter is no longer listening, the
    /// permit is dropped (released) and the loop stops; the next completion
    /// or promotion pass picks up from there.
    async fn drain(&self) {
        while self.lanes.depth() > 0 {
            let Some(permit) = self.slots.try_acquire().await else {
                return;
            };
            match self.lanes.poll_highest() {
                Some(waiter) => {
                    if waiter.resume(permit).is_err() {
                        // Popped a request that stopped waiting; the permit
                        // drops back into the pool.
                        return;
                    }
                }
                None => return,
            }
        }
    }

    fn publish(&self, event: Event) {
        self.subs.emit(&event);
        self.bus.publish(event);
    }
}
