//! # Example: API Connection
//!
//! Twenty concurrent callers share one API connection guarded by three
//! multi-tier limiters:
//!
//! - network: 2 per second *and* 10 per minute
//! - disk:    1 per second
//! - api:     3 per second
//!
//! `read_file` waits on api + disk, `resolve_address` on api + network. The
//! output timestamps show the strictest tier winning for each call.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use steward::{Context, LimitError, MultiLimiter, Rate, RateLimiter, TokenBucket};

fn bucket(rate: Rate, burst: u32) -> Arc<dyn RateLimiter> {
    Arc::new(TokenBucket::new(rate, burst))
}

struct ApiConnection {
    network: Arc<dyn RateLimiter>,
    disk: Arc<dyn RateLimiter>,
    api: Arc<dyn RateLimiter>,
}

impl ApiConnection {
    fn open() -> Self {
        Self {
            network: Arc::new(MultiLimiter::new(vec![
                bucket(Rate::per(2, Duration::from_secs(1)), 2),
                bucket(Rate::per(10, Duration::from_secs(60)), 10),
            ])),
            disk: Arc::new(MultiLimiter::new(vec![bucket(Rate::new(1.0), 1)])),
            api: Arc::new(MultiLimiter::new(vec![bucket(
                Rate::per(3, Duration::from_secs(1)),
                3,
            )])),
        }
    }

    async fn read_file(&self, ctx: &Context) -> Result<(), LimitError> {
        MultiLimiter::new(vec![self.api.clone(), self.disk.clone()])
            .wait(ctx)
            .await
    }

    async fn resolve_address(&self, ctx: &Context) -> Result<(), LimitError> {
        MultiLimiter::new(vec![self.api.clone(), self.network.clone()])
            .wait(ctx)
            .await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let conn = Arc::new(ApiConnection::open());
    let start = Instant::now();
    let mut calls = tokio::task::JoinSet::new();

    for i in 0..10 {
        let reader = Arc::clone(&conn);
        calls.spawn(async move {
            let res = reader.read_file(&Context::background()).await;
            (i, "ReadFile", res)
        });
        let resolver = Arc::clone(&conn);
        calls.spawn(async move {
            let res = resolver.resolve_address(&Context::background()).await;
            (i, "ResolveAddress", res)
        });
    }

    while let Some(joined) = calls.join_next().await {
        let (i, op, res) = joined?;
        let at = start.elapsed().as_secs_f64();
        match res {
            Ok(()) => println!("{at:6.2}s {op} #{i}"),
            Err(e) => println!("{at:6.2}s cannot {op} #{i}: {}", e.as_message()),
        }
    }

    // A caller with a tight deadline is refused instead of waiting.
    let hurried = Context::background().with_timeout(Duration::from_millis(100));
    if let Err(e) = conn.resolve_address(&hurried).await {
        println!("hurried caller: {} ({})", e, e.as_label());
    }
    println!("Done.");
    Ok(())
}
