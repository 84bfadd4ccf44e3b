//! # steward
//!
//! **Steward** is a small set of composable concurrency primitives for building
//! cancellable, self-healing worker pipelines on tokio.
//!
//! It provides cancellation fan-in, cancellation-aware stream stages, a
//! heartbeat protocol, a supervisor that restarts silent workers, and a
//! multi-tier rate limiter.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   parent token ───────────────────────────────────────────────┐
//!        │                                                      │
//!        ▼                                                      ▼
//! ┌──────────────────────────────────────────┐        ┌───────────────────┐
//! │  Steward (heartbeat supervisor)          │        │  streams          │
//! │  - Bus (broadcast events)                │        │  drain / bridge   │
//! │  - SubscriberSet (fans out to subs)      │        │  tee / take / ..  │
//! │  - per-launch control loop               │        └─────────┬─────────┘
//! └──────┬──────────────────────────▲────────┘                  │
//!        │ launch(or(parent, done)) │ pulses                    │
//!        ▼                          │                           │
//! ┌──────────────────────────────────────────┐   results        │
//! │  Ward (generation N)                     │ ───► bridge ─────┘
//! │  - Ward::send / guard / sleep pulse      │
//! └──────────────────────────────────────────┘
//!
//!  MultiLimiter [ 10/min ] ─► [ 2/s ] ─► ...   consulted before rate-limited work
//! ```
//!
//! ### Lifecycle
//! ```text
//! Steward::launch(parent, interval)
//!
//! loop {
//!   ├─► generation += 1
//!   ├─► publish WardStarting{ generation }
//!   ├─► ward.launch(or(parent, done), ward_interval) ─► results into bridge
//!   ├─► monitor:
//!   │     ├─ ward pulse      ─► reset timeout window, pulse own heartbeat
//!   │     ├─ own tick        ─► pulse own heartbeat
//!   │     ├─ timeout         ─► publish WardUnhealthy, done.cancel()
//!   │     │                     wait heartbeat close (≤ stop_grace, else WardLingering)
//!   │     │                     backoff (BackoffScheduled), continue
//!   │     └─ parent canceled ─► exit
//!   └─ on exit: publish StewardStopped, close heartbeat and results
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / functions                          |
//! |-------------------|--------------------------------------------------------------|------------------------------------------------|
//! | **Cancellation**  | Merge many stop signals into one.                            | [`CancellationToken`], [`cancel::or`]          |
//! | **Streams**       | Stages that never outlive their token.                       | [`streams::drain`], [`streams::bridge`], [`streams::tee`] |
//! | **Heartbeat**     | Liveness independent from results.                           | [`heartbeat::launch`], [`heartbeat::Ward`]     |
//! | **Supervision**   | Restart a ward whose heartbeat goes silent.                  | [`Steward`], [`supervise`]                     |
//! | **Rate limiting** | Token buckets combined strictest first.                      | [`MultiLimiter`], [`TokenBucket`]              |
//! | **Subscriber API**| Hook into steward lifecycle events.                          | [`Subscribe`], [`Event`]                       |
//! | **Errors**        | Typed errors for construction, wards and limiters.           | [`RuntimeError`], [`WardError`], [`LimitError`] |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], which renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use steward::{
//!     heartbeat::{Launch, Ward, WardFn},
//!     streams::take,
//!     supervise, CancellationToken, WardError,
//! };
//!
//! // Emits the list, and gives up on the first negative value.
//! async fn ints(mut ward: Ward<i32>) -> Result<(), WardError> {
//!     for v in [1, 2, -1, 3] {
//!         if v < 0 {
//!             return Err(WardError::fail(format!("negative value: {v}")));
//!         }
//!         ward.send(v).await?;
//!     }
//!     Ok(())
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let steward = supervise(Duration::from_millis(10), WardFn::new("ints", ints))?;
//!
//!     let done = CancellationToken::new();
//!     let (_pulses, results) = steward.launch(done.clone(), Duration::from_secs(3600));
//!
//!     let mut first = take(done.clone(), results, 6);
//!     let mut seen = Vec::new();
//!     while let Some(v) = first.recv().await {
//!         seen.push(v);
//!     }
//!     assert_eq!(seen, vec![1, 2, 1, 2, 1, 2]);
//!     done.cancel();
//!     Ok(())
//! }
//! ```

pub mod cancel;
mod core;
mod error;
pub mod events;
pub mod heartbeat;
pub mod limit;
mod policies;
pub mod streams;
pub mod subscribers;

// ---- Public re-exports ----

pub use cancel::CancellationToken;
pub use crate::core::{supervise, Steward, StewardBuilder, StewardConfig};
pub use error::{LimitError, RuntimeError, WardError};
pub use events::{Bus, Event, EventKind};
pub use limit::{Context, MultiLimiter, Rate, RateLimiter, TokenBucket};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in `tracing` subscriber.
// Enabled by default; opt out with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
