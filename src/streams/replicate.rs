//! # Replicated requests.
//!
//! Runs the same work on several replicas and keeps whichever answers first.
//!
//! ```text
//!          ┌─► replica 0 ──┐
//! token ─► ├─► replica 1 ──┼──► first answer wins ──► scope.cancel() ──► wait for losers
//!          └─► replica N ──┘
//! ```
//!
//! Every replica runs under one child token of the caller's token. Losers are
//! canceled through it and awaited before [`replicate`] returns, so no replica
//! outlives the call.

use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Starts `n` replicas of `f` and returns the first answer with its replica index.
///
/// `f` is called once per replica with the replica index and the shared scope
/// token. Returns `None` when `n` is zero, when `token` fires before any
/// replica answers, or when every replica panics.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use steward::{streams::replicate, CancellationToken};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let token = CancellationToken::new();
/// let answer = replicate(&token, 3, |id, _scope| async move {
///     tokio::time::sleep(Duration::from_millis(10 * (3 - id as u64))).await;
///     id * 100
/// })
/// .await;
/// assert_eq!(answer, Some((2, 200)));
/// # }
/// ```
pub async fn replicate<T, F, Fut>(token: &CancellationToken, n: usize, f: F) -> Option<(usize, T)>
where
    T: Send + 'static,
    F: Fn(usize, CancellationToken) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let scope = token.child_token();
    let mut set = JoinSet::new();
    for id in 0..n {
        let work = f(id, scope.clone());
        let scope = scope.clone();
        set.spawn(async move {
            tokio::select! {
                biased;
                _ = scope.cancelled() => None,
                v = work => Some((id, v)),
            }
        });
    }

    let mut winner = None;
    while let Some(joined) = set.join_next().await {
        if let Ok(Some(answer)) = joined {
            winner = Some(answer);
            break;
        }
    }

    scope.cancel();
    while set.join_next().await.is_some() {}
    winner
}
