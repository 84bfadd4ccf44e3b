//! # GuardedDrain (`orDone`)
//!
//! Reading a plain stream blocks until the producer sends or closes. [`drain`]
//! wraps the read so it also observes a token:
//!
//! ```text
//! loop {
//!   select { token fired → stop | source item → v | source closed → stop }
//!   select { token fired → stop | out.send(v) → continue }
//! }
//! ```
//!
//! Both selects are `biased` toward the token, so once cancellation is observed
//! no further element is handed downstream. An element handed over *before*
//! the token fired sits in the output buffer (at most [`STAGE_CAPACITY`]) and
//! counts as delivered: the consumer can still read it, then sees the end.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::STAGE_CAPACITY;

/// How a [`forward`] loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Drained {
    /// The source closed; the caller may go on with other work.
    SourceClosed,
    /// The token fired or the consumer went away; the caller must stop.
    Halted,
}

/// Returns a stream yielding every element of `source` until `token` fires.
///
/// The output ends immediately on cancellation, without waiting for `source`
/// to produce or close.
///
/// ## Example
/// ```rust
/// use steward::{streams::drain, CancellationToken};
/// use tokio::sync::mpsc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let token = CancellationToken::new();
/// let (tx, rx) = mpsc::channel(4);
/// let mut out = drain(token.clone(), rx);
///
/// tx.send(1).await.unwrap();
/// assert_eq!(out.recv().await, Some(1));
///
/// token.cancel();
/// assert_eq!(out.recv().await, None); // `tx` is still open
/// # }
/// ```
pub fn drain<T>(token: CancellationToken, source: mpsc::Receiver<T>) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(STAGE_CAPACITY);
    tokio::spawn(async move {
        forward(&token, source, &tx).await;
    });
    rx
}

/// Moves elements from `source` to `out` until one side ends or `token` fires.
pub(crate) async fn forward<T>(
    token: &CancellationToken,
    mut source: mpsc::Receiver<T>,
    out: &mpsc::Sender<T>,
) -> Drained {
    loop {
        let value = tokio::select! {
            biased;
            _ = token.cancelled() => return Drained::Halted,
            _ = out.closed() => return Drained::Halted,
            v = source.recv() => match v {
                Some(v) => v,
                None => return Drained::SourceClosed,
            },
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => return Drained::Halted,
            res = out.send(value) => {
                if res.is_err() {
                    return Drained::Halted;
                }
            }
        }
    }
}
