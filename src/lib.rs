//! # qosgate
//!
//! **qosgate** is a priority-aware admission gate for async request
//! processing: a bounded pool of concurrent service slots shared across
//! priority classes, per-priority wait lanes with aging promotion, and
//! deadline-based expiry. Overload never hangs a client — a request is either
//! serviced or answered with a uniform "service unavailable" rejection within
//! its deadline.
//!
//! ## Features
//!
//! | Area            | Description                                                        | Key types / traits            |
//! |-----------------|--------------------------------------------------------------------|-------------------------------|
//! | **Admission**   | Slot pool, priority lanes, aging promotion, expiry, bypass.        | [`Gate`], [`Ticket`]          |
//! | **Priorities**  | Urgency classes and query-string extraction.                       | [`Priority`]                  |
//! | **Telemetry**   | Rolling request rate and mean service time over the last 100 done. | [`Telemetry`], [`RollingRate`], [`RollingAverage`] |
//! | **Events**      | Lifecycle events for every admission transition.                   | [`Event`], [`EventKind`]      |
//! | **Subscribers** | Isolated, non-blocking event sinks (logging, metrics, custom).     | [`Subscribe`], [`SubscriberSet`] |
//! | **Errors**      | Typed configuration and rejection errors.                          | [`ConfigError`], [`Rejected`] |
//!
//! ## Optional features
//! - `logging`: exports the built-in stdout [`LogWriter`] _(demo/reference only)_.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use qosgate::{Config, Gate};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.max_concurrent = 2;
//!
//!     let gate = Arc::new(Gate::new(cfg, Vec::new())?);
//!
//!     // Per request, in the host server's handler:
//!     match gate
//!         .serve(Some("priority=2"), || async {
//!             // downstream handler chain
//!             tokio::time::sleep(Duration::from_millis(25)).await;
//!             "hello"
//!         })
//!         .await
//!     {
//!         Ok(body) => println!("200 {body}"),
//!         Err(rejected) => println!("{} {rejected}", rejected.status()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ---

mod config;
mod core;
mod error;
mod events;
mod metrics;
mod priority;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Gate, Ticket};
pub use config::Config;
pub use error::{ConfigError, Rejected};
pub use events::{Event, EventKind};
pub use metrics::{RollingAverage, RollingRate, Telemetry};
pub use priority::Priority;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: the built-in stdout writer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
