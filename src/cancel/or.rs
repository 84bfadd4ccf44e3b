//! # Or-combinator over cancellation tokens.
//!
//! ```text
//! inputs:  t0 ──┐
//!          t1 ──┼──► monitor (select_all) ──► merged.cancel()
//!          tN ──┘         ▲
//!                         ├── merged.cancelled() ends the monitor early
//!                         └── last Merged handle dropped ends it too
//! ```
//!
//! A [`Merged`] handle owns the monitor. Plain [`CancellationToken`] clones
//! taken from it with [`Merged::token`] observe the merged signal only while
//! some `Merged` handle is alive.
//!
//! ## Example
//! ```rust
//! use steward::cancel::{or, CancellationToken};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let a = CancellationToken::new();
//! let b = CancellationToken::new();
//! let any = or([a.clone(), b.clone()]).unwrap();
//!
//! b.cancel();
//! any.cancelled().await;
//! assert!(!a.is_cancelled());
//! # }
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use futures::future::select_all;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::RuntimeError;

/// A token produced by [`or`], keeping its monitor task alive.
///
/// Derefs to [`CancellationToken`]. When the last clone of a `Merged` is
/// dropped the monitor stops, whether or not any input fired.
#[derive(Clone)]
pub struct Merged {
    token: CancellationToken,
    monitor: Option<Arc<DropGuard>>,
}

impl Merged {
    fn plain(token: CancellationToken) -> Self {
        Self {
            token,
            monitor: None,
        }
    }

    /// The merged token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Deref for Merged {
    type Target = CancellationToken;

    fn deref(&self) -> &CancellationToken {
        &self.token
    }
}

impl fmt::Debug for Merged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merged")
            .field("cancelled", &self.token.is_cancelled())
            .field("monitored", &self.monitor.is_some())
            .finish()
    }
}

/// Merges `tokens` into one token that is cancelled as soon as any input is.
///
/// - one input: returned as is (same underlying token);
/// - two or more: a new token driven by a single monitor task;
/// - none: [`RuntimeError::NoSignals`].
///
/// Cancelling the merged token does **not** cancel any input.
///
/// Must be called from within a tokio runtime when more than one live token is given.
pub fn or<I>(tokens: I) -> Result<Merged, RuntimeError>
where
    I: IntoIterator<Item = CancellationToken>,
{
    let mut tokens: Vec<CancellationToken> = tokens.into_iter().collect();
    if tokens.len() > 1 {
        return Ok(merge(tokens));
    }
    tokens.pop().map(Merged::plain).ok_or(RuntimeError::NoSignals)
}

/// Two-input form of [`or`]; cannot fail.
pub fn or2(a: &CancellationToken, b: &CancellationToken) -> Merged {
    merge(vec![a.clone(), b.clone()])
}

/// Returns a token nobody else holds, so it is never cancelled unless the caller does it.
///
/// Use it where a scope is required but the caller has nothing to cancel with,
/// instead of relying on a value that happens to block forever.
pub fn never() -> CancellationToken {
    CancellationToken::new()
}

fn merge(tokens: Vec<CancellationToken>) -> Merged {
    let merged = CancellationToken::new();
    if tokens.iter().any(CancellationToken::is_cancelled) {
        merged.cancel();
        return Merged::plain(merged);
    }

    let watched: Vec<_> = tokens
        .into_iter()
        .map(|t| Box::pin(t.cancelled_owned()))
        .collect();

    let released = CancellationToken::new();
    let out = merged.clone();
    let stop = released.clone();
    tokio::spawn(async move {
        // Inputs first: a handle dropped right after an input fired must not
        // swallow the cancellation.
        tokio::select! {
            biased;
            _ = select_all(watched) => out.cancel(),
            _ = out.cancelled() => {}
            _ = stop.cancelled() => {}
        }
    });
    Merged {
        token: merged,
        monitor: Some(Arc::new(released.drop_guard())),
    }
}
