//! # Stdout event writer for debugging and demos.
//!
//! [`LogWriter`] prints each gate event on one line. Completion lines carry
//! the wait time, the service time, and the two rolling gauges.
//!
//! ```text
//! [admitted] request=0 priority=3
//! [enqueued] request=1 priority=5 depth=1
//! [promoted] request=1 priority=4
//! [resumed] request=1 priority=4 wait=840ms
//! [completed] request=1 wait=840ms response=120ms rate=3.1r/s avg=97.5ms
//! [rejected] request=2 reason=queue_full wait=50ms
//! ```
//!
//! Enabled via the `logging` feature; meant for development. Production
//! observability should implement [`Subscribe`] against a real sink.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::Bypassed => {
                println!("[bypass] request={:?}", e.request);
            }
            EventKind::Admitted => {
                println!("[admitted] request={:?} priority={:?}", e.request, e.priority);
            }
            EventKind::Enqueued => {
                println!(
                    "[enqueued] request={:?} priority={:?} depth={:?}",
                    e.request, e.priority, e.depth
                );
            }
            EventKind::Promoted => {
                println!("[promoted] request={:?} priority={:?}", e.request, e.priority);
            }
            EventKind::Resumed => {
                println!(
                    "[resumed] request={:?} priority={:?} wait={:?}",
                    e.request, e.priority, e.wait
                );
            }
            EventKind::Rejected => {
                println!(
                    "[rejected] request={:?} reason={:?} wait={:?}",
                    e.request, e.reason, e.wait
                );
            }
            EventKind::Completed => {
                println!(
                    "[completed] request={:?} wait={:?} response={:?} rate={:.1}r/s avg={:.1}ms",
                    e.request,
                    e.wait,
                    e.service,
                    e.rate.unwrap_or(0.0),
                    e.avg_response_ms.unwrap_or(0.0)
                );
            }
            EventKind::Closed => {
                println!("[closed]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
