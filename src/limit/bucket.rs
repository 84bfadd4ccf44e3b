//! # Token bucket limiter.
//!
//! ```text
//!            refill: rate tokens/s
//!                  │
//!            ┌─────▼─────┐
//!            │  tokens   │ ≤ burst
//!            └─────┬─────┘
//! wait(ctx) ───────┴──► take 1 ──► tokens < 0 ? sleep(deficit / rate) : go
//! ```
//!
//! ## Rules
//! - A wait reserves its token up front; the sleep only pays off the deficit.
//! - A reservation that would end after the context deadline is refused
//!   immediately and nothing is consumed.
//! - A canceled sleep hands its token back.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::context::Context;
use super::rate::Rate;
use super::RateLimiter;
use crate::error::LimitError;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

/// A classic token bucket.
///
/// ```
/// use std::time::Duration;
/// use steward::{Context, Rate, RateLimiter, TokenBucket};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let disk = TokenBucket::new(Rate::per(3, Duration::from_secs(1)), 3);
/// disk.wait(&Context::background()).await.unwrap();
/// assert_eq!(disk.burst(), 3);
/// # }
/// ```
#[derive(Debug)]
pub struct TokenBucket {
    rate: Rate,
    burst: u32,
    state: Mutex<Bucket>,
}

impl TokenBucket {
    /// Creates a full bucket.
    pub fn new(rate: Rate, burst: u32) -> Self {
        Self {
            rate,
            burst,
            state: Mutex::new(Bucket {
                tokens: f64::from(burst),
                last: Instant::now(),
            }),
        }
    }

    /// Takes a token if one is available right now.
    pub fn allow(&self) -> bool {
        self.reserve(Instant::now(), Some(Duration::ZERO)).is_ok()
    }

    /// Tokens currently in the bucket (negative while waiters are queued).
    pub fn tokens(&self) -> f64 {
        let now = Instant::now();
        let mut bucket = self.lock();
        self.advance(&mut bucket, now);
        bucket.tokens
    }

    /// Takes one token and returns how long the caller must wait for it.
    fn reserve(&self, now: Instant, max_wait: Option<Duration>) -> Result<Duration, LimitError> {
        if self.rate.is_inf() {
            return Ok(Duration::ZERO);
        }
        if self.burst == 0 {
            return Err(LimitError::BurstExceeded { burst: self.burst });
        }

        let mut bucket = self.lock();
        self.advance(&mut bucket, now);

        let tokens = bucket.tokens - 1.0;
        let wait = self.rate.duration_for(-tokens);
        if let Some(max) = max_wait {
            if wait > max {
                return Err(LimitError::DeadlineExceeded { wait });
            }
        }
        bucket.tokens = tokens;
        Ok(wait)
    }

    fn refund(&self) {
        let mut bucket = self.lock();
        bucket.tokens = (bucket.tokens + 1.0).min(f64::from(self.burst));
    }

    fn advance(&self, bucket: &mut Bucket, now: Instant) {
        if now <= bucket.last {
            return;
        }
        let gained = self.rate.tokens_for(now - bucket.last);
        bucket.tokens = (bucket.tokens + gained).min(f64::from(self.burst));
        bucket.last = now;
    }

    fn lock(&self) -> MutexGuard<'_, Bucket> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn wait(&self, ctx: &Context) -> Result<(), LimitError> {
        if ctx.token().is_cancelled() {
            return Err(LimitError::Canceled);
        }
        let now = Instant::now();
        if ctx.is_expired(now) {
            return Err(LimitError::DeadlineExceeded {
                wait: Duration::ZERO,
            });
        }

        let wait = self.reserve(now, ctx.remaining(now))?;
        if wait.is_zero() {
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = ctx.token().cancelled() => {
                self.refund();
                Err(LimitError::Canceled)
            }
            _ = tokio::time::sleep(wait) => Ok(()),
        }
    }

    fn limit(&self) -> Rate {
        self.rate
    }

    fn burst(&self) -> u32 {
        self.burst
    }
}
