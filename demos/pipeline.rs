//! # Example: Pipeline
//!
//! Wires the stream stages together:
//!
//! ```text
//! repeat_with(counter) ──► take(10) ──► drain ──► tee ──┬──► fast consumer
//!                                                       └──► slow consumer (3x slower)
//! ```
//!
//! `tee` keeps the branches in lockstep, so the fast consumer never gets more
//! than one element ahead of the slow one. A merged token built with `or`
//! stops everything either on a deadline or on an explicit cancel.

use std::time::Duration;

use tokio::time::Instant;

use steward::{
    cancel::or,
    streams::{drain, repeat_with, take, tee},
    CancellationToken,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let user = CancellationToken::new();
    let deadline = CancellationToken::new();
    let merged = or([user.clone(), deadline.clone()])?;
    let done = merged.token().clone();

    tokio::spawn({
        let deadline = deadline.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            deadline.cancel();
        }
    });

    let mut n = 0u32;
    let numbers = repeat_with(done.clone(), move || {
        n += 1;
        n
    });
    let (fast, slow) = tee(done.clone(), drain(done.clone(), take(done.clone(), numbers, 10)));
    let start = Instant::now();

    let consume = |name: &'static str, pace: Duration, mut rx: tokio::sync::mpsc::Receiver<u32>| async move {
        while let Some(v) = rx.recv().await {
            println!("{:>5}ms {name:<4} got {v}", start.elapsed().as_millis());
            tokio::time::sleep(pace).await;
        }
    };

    tokio::join!(
        consume("fast", Duration::from_millis(10), fast),
        consume("slow", Duration::from_millis(30), slow),
    );

    user.cancel();
    drop(merged);
    println!("Done.");
    Ok(())
}
