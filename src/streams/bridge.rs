//! # Bridge: one logical stream assembled from successive streams.
//!
//! ```text
//! streams: ──[s0]────────[s1]──────[s2]──► (closed)
//!             │           │         │
//! output:     s0₀ s0₁ s0₂ s1₀ s1₁   s2₀ ──► (closed)
//! ```
//!
//! The steward uses this to splice every ward generation's results into the
//! single stream its caller is reading.

use futures::stream::{poll_fn, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{forward, Drained, STAGE_CAPACITY};

/// Flattens a stream of streams into a single stream.
///
/// Inner streams are read one after another, each to completion, through the
/// same guarded forwarding as [`drain`](super::drain). Cancelling `token` stops
/// both the outer read and the inner stream currently being drained. When the
/// outer stream closes, the output closes after the last inner stream ends.
pub fn bridge<T>(
    token: CancellationToken,
    mut streams: mpsc::Receiver<mpsc::Receiver<T>>,
) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    splice(token, poll_fn(move |cx| streams.poll_recv(cx)))
}

/// [`bridge`] over an unbounded outer stream, so pushing a stream never waits
/// for the consumer.
pub(crate) fn bridge_unbounded<T>(
    token: CancellationToken,
    mut streams: mpsc::UnboundedReceiver<mpsc::Receiver<T>>,
) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    splice(token, poll_fn(move |cx| streams.poll_recv(cx)))
}

fn splice<T, S>(token: CancellationToken, mut streams: S) -> mpsc::Receiver<T>
where
    T: Send + 'static,
    S: Stream<Item = mpsc::Receiver<T>> + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STAGE_CAPACITY);
    tokio::spawn(async move {
        loop {
            let stream = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tx.closed() => return,
                s = streams.next() => match s {
                    Some(s) => s,
                    None => return,
                },
            };

            if forward(&token, stream, &tx).await == Drained::Halted {
                return;
            }
        }
    });
    rx
}
