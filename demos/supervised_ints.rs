//! # Example: Supervised Ints
//!
//! A ward emits a fixed list of integers and gives up on the first negative
//! one. The steward notices the silence and starts a fresh generation, so the
//! consumer keeps receiving `1, 2, 1, 2, ...` on one uninterrupted stream.
//!
//! A second steward supervises an "irresponsible" ward that never pulses at
//! all and gets replaced every timeout until the whole thing is halted.
//!
//! Run with `RUST_LOG=debug cargo run --example supervised_ints`.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use steward::{
    heartbeat::{Launch, Ward, WardFn},
    streams::take,
    CancellationToken, LogWriter, Steward, StewardConfig, Subscribe, WardError,
};

const VALUES: [i64; 6] = [1, 2, -1, 3, 4, 5];

async fn do_work(mut ward: Ward<i64>) -> Result<(), WardError> {
    loop {
        for v in VALUES {
            if v < 0 {
                tracing::info!(value = v, "negative value");
                return Err(WardError::fail(format!("negative value: {v}")));
            }
            ward.send(v).await?;
        }
    }
}

async fn irresponsible(ward: Ward<()>) -> Result<(), WardError> {
    tracing::info!("ward: Hello, I'm irresponsible!");
    ward.token().cancelled().await;
    Ok(())
}

fn subscribers() -> Vec<Arc<dyn Subscribe>> {
    vec![Arc::new(LogWriter::new())]
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let done = CancellationToken::new();

    let ints = Steward::builder(StewardConfig {
        timeout: Duration::from_millis(10),
        ..StewardConfig::default()
    })
    .with_subscribers(subscribers())
    .build(WardFn::new("ints", do_work))?;

    let (_pulses, results) = ints.launch(done.clone(), Duration::from_secs(3600));
    let mut first = take(done.clone(), results, 6);
    while let Some(v) = first.recv().await {
        println!("Received: {v}");
    }

    let halt = CancellationToken::new();
    let lazy = Steward::builder(StewardConfig {
        timeout: Duration::from_secs(1),
        ..StewardConfig::default()
    })
    .with_subscribers(subscribers())
    .build(WardFn::new("irresponsible", irresponsible))?;

    let (mut pulses, _results) = lazy.launch(halt.clone(), Duration::from_secs(1));
    tokio::spawn({
        let halt = halt.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            tracing::info!("main: halting steward and ward.");
            halt.cancel();
        }
    });
    while pulses.recv().await.is_some() {}

    done.cancel();
    println!("Done");
    Ok(())
}
