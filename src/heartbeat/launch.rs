//! # Launching wards.
//!
//! [`launch`] is the free-function form: give it a token, a pulse interval and
//! a body, get back `(pulses, results)`.
//!
//! [`Launch`] is the reusable form the steward works with: something that can
//! be launched again and again, once per generation. [`WardFn`] implements it
//! over a closure that builds a fresh body per launch.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use steward::{heartbeat::{Launch, Ward, WardFn}, CancellationToken, WardError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let counter = WardFn::new("counter", |mut ward: Ward<u32>| async move {
//!     for i in 0..3 {
//!         ward.send(i).await?;
//!     }
//!     Ok::<_, WardError>(())
//! });
//!
//! let token = CancellationToken::new();
//! let (_pulses, mut results) = counter.launch(token, Duration::from_millis(100));
//! assert_eq!(results.recv().await, Some(0));
//! # }
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::WardError;
use crate::streams::STAGE_CAPACITY;

use super::pulse::{Heartbeat, Pulses};
use super::ward::Ward;

/// Streams handed back by a launch: liveness first, data second.
pub type Launched<T> = (Pulses, mpsc::Receiver<T>);

/// Spawns `body` as a ward and returns its heartbeat and result streams.
///
/// The body is raced against `token`, so it stops promptly on cancellation
/// even if it never looks at the token. Both streams close when the body
/// returns, is cancelled, or panics.
///
/// An `Err` returned by the body ends the ward like any other return; a
/// watcher sees it only as silence.
pub fn launch<T, F, Fut>(token: CancellationToken, interval: Duration, body: F) -> Launched<T>
where
    T: Send + 'static,
    F: FnOnce(Ward<T>) -> Fut,
    Fut: Future<Output = Result<(), WardError>> + Send + 'static,
{
    let (heartbeat, pulses) = Heartbeat::channel();
    let (tx, rx) = mpsc::channel(STAGE_CAPACITY);
    let fut = body(Ward::new(token.clone(), interval, heartbeat, tx));

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            res = fut => report(&res),
        }
    });

    (pulses, rx)
}

#[cfg(feature = "logging")]
fn report(res: &Result<(), WardError>) {
    if let Err(e) = res {
        if !e.is_cancellation() {
            tracing::debug!(error = %e, "ward exited with error");
        }
    }
}

#[cfg(not(feature = "logging"))]
fn report(_: &Result<(), WardError>) {}

/// # Something that can be launched as a ward, any number of times.
///
/// Each call to [`launch`](Launch::launch) must start an independent run bound
/// to the given token. The steward calls it once per generation.
pub trait Launch: Send + Sync + 'static {
    /// Type of the values on the result stream.
    type Item: Send + 'static;

    /// Returns a stable, human-readable name (used in events).
    fn name(&self) -> &str;

    /// Starts one run and returns its `(pulses, results)` streams.
    fn launch(&self, token: CancellationToken, interval: Duration) -> Launched<Self::Item>;
}

/// Shared handle to a launcher.
pub type WardRef<T> = Arc<dyn Launch<Item = T>>;

/// Function-backed launcher.
///
/// Wraps a closure that *creates* a new body per launch, so generations share
/// nothing unless the closure captures an `Arc` on purpose.
pub struct WardFn<T, F> {
    name: Cow<'static, str>,
    f: F,
    _item: PhantomData<fn(Ward<T>)>,
}

impl<T, F> WardFn<T, F> {
    /// Creates a new function-backed launcher.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _item: PhantomData,
        }
    }

    /// Creates the launcher and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<T, F, Fut> Launch for WardFn<T, F>
where
    T: Send + 'static,
    F: Fn(Ward<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WardError>> + Send + 'static,
{
    type Item = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn launch(&self, token: CancellationToken, interval: Duration) -> Launched<T> {
        launch(token, interval, &self.f)
    }
}

impl<L: Launch + ?Sized> Launch for Arc<L> {
    type Item = L::Item;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn launch(&self, token: CancellationToken, interval: Duration) -> Launched<L::Item> {
        (**self).launch(token, interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time;

    async fn slow_sevens(mut ward: Ward<u32>) -> Result<(), WardError> {
        loop {
            ward.sleep(Duration::from_millis(250)).await?;
            ward.send(7).await?;
        }
    }

    async fn oblivious(_ward: Ward<u8>) -> Result<(), WardError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn explosive(_ward: Ward<u8>) -> Result<(), WardError> {
        panic!("ward blew up");
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_and_pulses_are_independent() {
        let token = CancellationToken::new();
        let (mut pulses, mut results) =
            launch(token.clone(), Duration::from_millis(100), slow_sevens);

        let mut seen_pulses = 0;
        let mut seen_results = 0;
        let deadline = time::sleep(Duration::from_millis(900));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                Some(_) = pulses.recv() => seen_pulses += 1,
                Some(v) = results.recv() => {
                    assert_eq!(v, 7);
                    seen_results += 1;
                }
                _ = &mut deadline => break,
            }
        }
        assert!(seen_pulses >= 6, "pulses={seen_pulses}");
        assert_eq!(seen_results, 3);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_closes_both_streams() {
        let token = CancellationToken::new();
        let (mut pulses, mut results) = launch(token.clone(), Duration::from_millis(10), oblivious);

        token.cancel();
        let closed = time::timeout(Duration::from_millis(10), async {
            while pulses.recv().await.is_some() {}
            results.recv().await
        })
        .await;
        assert_eq!(closed.expect("ward outlived its token"), None);
    }

    #[tokio::test]
    async fn test_panicking_ward_closes_streams() {
        let token = CancellationToken::new();
        let (mut pulses, mut results) = launch(token, Duration::from_secs(1), explosive);
        assert_eq!(results.recv().await, None);
        assert_eq!(pulses.recv().await, None);
    }

    #[tokio::test]
    async fn test_ward_fn_builds_fresh_body_per_launch() {
        let launches = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&launches);
        let ward = WardFn::new("fresh", move |mut ward: Ward<usize>| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { ward.send(n).await }
        });
        assert_eq!(ward.name(), "fresh");

        let token = CancellationToken::new();
        let (_p1, mut r1) = ward.launch(token.clone(), Duration::from_secs(1));
        let (_p2, mut r2) = ward.launch(token.clone(), Duration::from_secs(1));
        assert_eq!(r1.recv().await, Some(0));
        assert_eq!(r2.recv().await, Some(1));
        assert_eq!(launches.load(Ordering::SeqCst), 2);
    }
}
