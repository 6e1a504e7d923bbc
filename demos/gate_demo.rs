//! Mixed-priority burst against a two-slot gate, with the stdout writer
//! showing every admission transition.
//!
//! Run with: `cargo run --example gate_demo --features logging`

use std::sync::Arc;
use std::time::Duration;

use qosgate::{Config, Gate, LogWriter, Subscribe};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let mut cfg = Config::default();
    cfg.max_concurrent = 2;
    cfg.promotion_interval = Duration::from_millis(200);
    cfg.request_deadline = Duration::from_millis(1500);

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let gate = Arc::new(Gate::new(cfg, subscribers)?);

    let mut handles = Vec::new();
    for i in 0..12u32 {
        let gate = Arc::clone(&gate);
        let query = format!("priority={}", 1 + i % 5);
        handles.push(tokio::spawn(async move {
            let outcome = gate
                .serve(Some(query.as_str()), || async {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                })
                .await;
            (i, outcome)
        }));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    for handle in handles {
        let (i, outcome) = handle.await?;
        match outcome {
            Ok(()) => println!("request {i}: served"),
            Err(rejected) => println!("request {i}: {} ({rejected})", rejected.status()),
        }
    }

    let telemetry = gate.telemetry();
    println!(
        "gauges: rate={:.1}r/s avg={:.1}ms",
        telemetry.requests_per_sec, telemetry.avg_response_ms
    );

    Arc::try_unwrap(gate).ok().expect("all handles joined").shutdown().await;
    Ok(())
}
