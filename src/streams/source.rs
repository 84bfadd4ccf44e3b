//! # Sources and a limiting stage.
//!
//! Small building blocks for assembling pipelines whose every send observes
//! cancellation:
//!
//! - [`generate`] emits the items of an iterator, then closes;
//! - [`repeat`] cycles through a list of values forever;
//! - [`repeat_with`] emits whatever a closure returns, forever;
//! - [`take`] forwards the first `n` items of a stream, then closes.
//!
//! ## Example
//! ```rust
//! use steward::{streams::{repeat, take}, CancellationToken};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let token = CancellationToken::new();
//! let mut words = take(token.clone(), repeat(token.clone(), vec!["I", "am."]), 5);
//!
//! let mut message = String::new();
//! while let Some(w) = words.recv().await {
//!     message.push_str(w);
//! }
//! assert_eq!(message, "Iam.Iam.I");
//! token.cancel();
//! # }
//! ```

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::STAGE_CAPACITY;

/// Emits every item of `items`, then closes the stream.
pub fn generate<I>(token: CancellationToken, items: I) -> mpsc::Receiver<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    let items = items.into_iter();
    let (tx, rx) = mpsc::channel(STAGE_CAPACITY);
    tokio::spawn(async move {
        for item in items {
            if !emit(&token, &tx, item).await {
                return;
            }
        }
    });
    rx
}

/// Cycles through `values` until `token` fires or the consumer goes away.
///
/// An empty `values` yields a stream that closes immediately.
pub fn repeat<T>(token: CancellationToken, values: Vec<T>) -> mpsc::Receiver<T>
where
    T: Clone + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STAGE_CAPACITY);
    tokio::spawn(async move {
        if values.is_empty() {
            return;
        }
        let mut i = 0;
        loop {
            let v = values[i].clone();
            i = (i + 1) % values.len();
            if !emit(&token, &tx, v).await {
                return;
            }
        }
    });
    rx
}

/// Emits `f()` over and over until `token` fires or the consumer goes away.
pub fn repeat_with<T, F>(token: CancellationToken, mut f: F) -> mpsc::Receiver<T>
where
    T: Send + 'static,
    F: FnMut() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STAGE_CAPACITY);
    tokio::spawn(async move {
        loop {
            if !emit(&token, &tx, f()).await {
                return;
            }
        }
    });
    rx
}

/// Forwards at most `n` items of `source`, then closes the stream.
///
/// Closing early drops `source`, which lets upstream stages notice that nobody listens.
pub fn take<T>(token: CancellationToken, mut source: mpsc::Receiver<T>, n: usize) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(STAGE_CAPACITY);
    tokio::spawn(async move {
        for _ in 0..n {
            let item = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                v = source.recv() => match v {
                    Some(v) => v,
                    None => return,
                },
            };
            if !emit(&token, &tx, item).await {
                return;
            }
        }
    });
    rx
}

/// Sends `value` unless `token` fires first. Returns `false` when the stage must stop.
async fn emit<T>(token: &CancellationToken, tx: &mpsc::Sender<T>, value: T) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        res = tx.send(value) => res.is_ok(),
    }
}
