//! # Event subscribers.
//!
//! The extension point for observing a gate: implement [`Subscribe`] and hand
//! it to [`Gate::new`](crate::Gate::new). Each subscriber gets a bounded
//! queue and a dedicated worker task, so a slow or panicking subscriber never
//! stalls admission control or its peers.
//!
//! ```text
//! Gate ── emit(&Event) ──► [queue S1] ─► worker S1 ─► on_event()
//!                    └────► [queue S2] ─► worker S2 ─► on_event()
//! ```
//!
//! The crate ships one reference implementation, [`LogWriter`] (feature
//! `logging`), which prints events to stdout.

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
