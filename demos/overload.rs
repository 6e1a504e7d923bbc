//! Overload behavior: a tiny queue in front of one slow slot, plus a bypass
//! request cutting through while everything else waits or bounces.
//!
//! Run with: `cargo run --example overload --features logging`

use std::sync::Arc;
use std::time::Duration;

use qosgate::{Config, Gate, LogWriter, Subscribe};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_params([
        ("maxreq", "1"),
        ("maxqueue", "3"),
        ("prioritytimeout", "150"),
        ("requesttimeout", "900"),
    ])?;

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let gate = Arc::new(Gate::new(cfg, subscribers)?);

    // One slow request holds the slot for the whole run.
    let slow = {
        let gate = Arc::clone(&gate);
        tokio::spawn(async move {
            gate.serve(Some("priority=2"), || async {
                tokio::time::sleep(Duration::from_millis(1200)).await;
            })
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // A wave of normal traffic: three fit in the queue, the rest bounce.
    let wave: Vec<_> = (0..6u32)
        .map(|i| {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                let outcome = gate.serve(Some("priority=5"), || async {}).await;
                (i, outcome)
            })
        })
        .collect();

    // The magic priority is not subject to any of it.
    gate.serve(Some("priority=0"), || async {
        println!(">>> bypass request serviced while the gate is saturated");
    })
    .await
    .expect("bypass is never rejected");

    for handle in wave {
        let (i, outcome) = handle.await?;
        match outcome {
            Ok(()) => println!("wave {i}: served"),
            Err(rejected) => println!("wave {i}: 503 ({})", rejected.as_label()),
        }
    }
    slow.await??;
    Ok(())
}
