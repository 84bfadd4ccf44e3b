//! # Tee: one stream in, two lockstep streams out.
//!
//! For every element the tee first waits until **both** branches have taken the
//! previous element out of their channel, then pulls the next element from the
//! source and hands a copy to each branch:
//!
//! ```text
//! loop {
//!   ├─► reserve(A) + reserve(B)   (both previous elements consumed)
//!   ├─► v = source.recv()
//!   └─► A ← v.clone(), B ← v
//! }
//! ```
//!
//! A fast reader therefore runs at most one element ahead of a slow one.
//! A branch whose receiver is dropped is detached; the other keeps going.

use futures::future::join;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::STAGE_CAPACITY;

/// Splits `source` into two streams that each see every element, in order.
///
/// Stops when `token` fires, when `source` closes, or when both outputs are dropped.
pub fn tee<T>(
    token: CancellationToken,
    mut source: mpsc::Receiver<T>,
) -> (mpsc::Receiver<T>, mpsc::Receiver<T>)
where
    T: Clone + Send + 'static,
{
    let (tx_a, rx_a) = mpsc::channel(STAGE_CAPACITY);
    let (tx_b, rx_b) = mpsc::channel(STAGE_CAPACITY);

    tokio::spawn(async move {
        let mut branch_a = Some(tx_a);
        let mut branch_b = Some(tx_b);

        loop {
            let (slot_a, slot_b) = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                slots = join(reserve(&branch_a), reserve(&branch_b)) => slots,
            };
            let gone_a = slot_a.is_none();
            let gone_b = slot_b.is_none();
            if gone_a && gone_b {
                return;
            }

            let value = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                v = source.recv() => match v {
                    Some(v) => v,
                    None => return,
                },
            };

            match (slot_a, slot_b) {
                (Some(a), Some(b)) => {
                    a.send(value.clone());
                    b.send(value);
                }
                (Some(a), None) => a.send(value),
                (None, Some(b)) => b.send(value),
                (None, None) => return,
            }

            if gone_a {
                branch_a = None;
            }
            if gone_b {
                branch_b = None;
            }
        }
    });

    (rx_a, rx_b)
}

/// Waits for a free slot on a branch; `None` if the branch is detached or closed.
async fn reserve<T>(branch: &Option<mpsc::Sender<T>>) -> Option<mpsc::Permit<'_, T>> {
    match branch {
        Some(tx) => tx.reserve().await.ok(),
        None => None,
    }
}
