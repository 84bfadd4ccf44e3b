//! # Composable rate limiting.
//!
//! A [`RateLimiter`] hands out permits at a [`Rate`], waiting as needed under a
//! caller-supplied [`Context`] (cancellation token plus optional deadline).
//!
//! - [`TokenBucket`] is the leaf limiter: tokens refill at `rate` up to `burst`.
//! - [`MultiLimiter`] combines limiters of different granularity (per second,
//!   per minute, ...) so a caller waits for all of them, strictest first.
//!
//! ```text
//!  wait(ctx) ──► MultiLimiter ──► [ 10/min ]──►[ 2/s ]──►[ MultiLimiter[..] ] ──► Ok
//!                   sorted by limit(), first error aborts the chain
//! ```
//!
//! `MultiLimiter` is itself a `RateLimiter`, so limiters nest freely; a nested
//! `MultiLimiter` is flattened into its parent.

mod bucket;
mod context;
mod multi;
mod rate;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LimitError;

pub use bucket::TokenBucket;
pub use context::Context;
pub use multi::MultiLimiter;
pub use rate::Rate;

/// Anything that can make a caller wait for a permit.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Waits until one permit is available.
    ///
    /// Returns early with [`LimitError::Canceled`] when the context token fires,
    /// and never sleeps past the context deadline: a wait that would end after
    /// it fails immediately with [`LimitError::DeadlineExceeded`].
    async fn wait(&self, ctx: &Context) -> Result<(), LimitError>;

    /// Steady-state rate of this limiter.
    fn limit(&self) -> Rate;

    /// Maximum number of permits that can be taken at once.
    fn burst(&self) -> u32;

    /// Members of a composite limiter, or `None` for a leaf.
    ///
    /// [`MultiLimiter::new`] splices these in place of the composite.
    fn members(&self) -> Option<&[Arc<dyn RateLimiter>]> {
        None
    }
}
