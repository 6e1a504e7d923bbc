//! # Admission core: scheduling and capacity.
//!
//! The only public API re-exported from here is [`Gate`] (and its [`Ticket`]).
//! Everything else is an internal building block the gate wires together.
//!
//! ## Files & responsibilities
//! - **gate.rs**: the admission scheduler; owns the slot pool, the wait
//!   lanes, the rolling gauges, and the event bus; walks each request through
//!   admit → (park/promote)* → dispatch/reject → complete.
//! - **queue.rs**: per-priority FIFO wait lanes with a shared depth bound;
//!   one critical section covers the admission check and the depth update.
//! - **slot.rs**: fair counting semaphore of service permits with a bounded,
//!   failure-is-not-an-error acquire.
//!
//! ## Who hands whom the capacity
//! ```text
//! complete() ── drop permit ──► SlotPool ◄── try_acquire ── drain()
//!                                                 │ (permit)
//!                                                 ▼
//!                               Waiter.resume(permit) ──► parked admit()
//!                                                 │
//!                                                 ▼
//!                                         Ticket (serviced)
//! ```
//! Ownership of a permit moves queue-ward through the waiter's oneshot and
//! host-ward inside the ticket; it is never duplicated, so the slot bound
//! holds under any interleaving.

mod gate;
mod queue;
mod slot;

pub use gate::{Gate, Ticket};
