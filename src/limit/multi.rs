//! # Multi-tier limiter.
//!
//! Combines limiters of different granularity so that a caller must satisfy
//! all of them, e.g. "2 per second *and* 10 per minute".
//!
//! ## Rules
//! - Nested composites are flattened, then members are sorted ascending by
//!   [`RateLimiter::limit`] at construction.
//! - [`wait`](RateLimiter::wait) consults members in that order and stops at the
//!   first error. Permits already taken from earlier members are not returned.
//! - [`limit`](RateLimiter::limit) and [`burst`](RateLimiter::burst) report the
//!   strictest (first) member.
//! - A `MultiLimiter` is a `RateLimiter`, and `[a, [b, c]]` is built as
//!   `[a, b, c]`, so both consult members in the same order.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::Context;
use super::rate::Rate;
use super::RateLimiter;
use crate::error::LimitError;

/// Ordered set of limiters consulted strictest first.
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use steward::{MultiLimiter, Rate, RateLimiter, TokenBucket};
///
/// let network = MultiLimiter::new(vec![
///     Arc::new(TokenBucket::new(Rate::per(2, Duration::from_secs(1)), 2)) as Arc<dyn RateLimiter>,
///     Arc::new(TokenBucket::new(Rate::per(10, Duration::from_secs(60)), 10)) as Arc<dyn RateLimiter>,
/// ]);
/// assert_eq!(network.limit(), Rate::per(10, Duration::from_secs(60)));
/// assert_eq!(network.burst(), 10);
/// ```
#[derive(Clone)]
pub struct MultiLimiter {
    limiters: Vec<Arc<dyn RateLimiter>>,
}

impl MultiLimiter {
    /// Builds a limiter from `limiters`, sorted ascending by rate.
    ///
    /// Members that are themselves composites contribute their leaves.
    /// An empty set never waits and reports [`Rate::INF`].
    pub fn new<I>(limiters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn RateLimiter>>,
    {
        let mut flat = Vec::new();
        for limiter in limiters {
            flatten(limiter, &mut flat);
        }
        flat.sort_by_key(|l| l.limit());
        Self { limiters: flat }
    }

    /// Number of leaf members.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// True if there are no members.
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

fn flatten(limiter: Arc<dyn RateLimiter>, out: &mut Vec<Arc<dyn RateLimiter>>) {
    if let Some(members) = limiter.members() {
        for member in members {
            flatten(Arc::clone(member), out);
        }
        return;
    }
    out.push(limiter);
}

impl std::fmt::Debug for MultiLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rates: Vec<Rate> = self.limiters.iter().map(|l| l.limit()).collect();
        f.debug_struct("MultiLimiter").field("limits", &rates).finish()
    }
}

#[async_trait]
impl RateLimiter for MultiLimiter {
    async fn wait(&self, ctx: &Context) -> Result<(), LimitError> {
        for limiter in &self.limiters {
            limiter.wait(ctx).await?;
        }
        Ok(())
    }

    fn limit(&self) -> Rate {
        self.limiters.first().map_or(Rate::INF, |l| l.limit())
    }

    fn burst(&self) -> u32 {
        self.limiters.first().map_or(u32::MAX, |l| l.burst())
    }

    fn members(&self) -> Option<&[Arc<dyn RateLimiter>]> {
        Some(self.limiters.as_slice())
    }
}
