//! # Steward: heartbeat supervisor for a ward.
//!
//! A [`Steward`] wraps any [`Launch`] and is itself a [`Launch`] with the same
//! item type, so supervised launchers can be supervised again.
//!
//! ```text
//! steward.launch(parent, interval)
//!   ├─► (steward pulses, results)        results = bridge(parent, generations)
//!   └─► spawn runner::Run::drive()
//!         generation 1: ward.launch(or(parent, done₁), ward_interval) ─┐
//!         generation 2: ward.launch(or(parent, done₂), ward_interval) ─┼─► generations
//!         ...                                                          ┘
//! ```
//!
//! Lifecycle events go to the steward's [`Bus`]; subscribers given to the
//! builder receive them through a [`SubscriberSet`].
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use steward::{heartbeat::{Launch, Ward, WardFn}, supervise, CancellationToken, WardError};
//!
//! async fn count(mut ward: Ward<u64>) -> Result<(), WardError> {
//!     let mut n = 0;
//!     loop {
//!         ward.send(n).await?;
//!         n += 1;
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), steward::RuntimeError> {
//! let steward = supervise(Duration::from_secs(1), WardFn::new("count", count))?;
//!
//! let token = CancellationToken::new();
//! let (_pulses, mut results) = steward.launch(token.clone(), Duration::from_secs(1));
//! assert_eq!(results.recv().await, Some(0));
//! assert_eq!(results.recv().await, Some(1));
//! token.cancel();
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::heartbeat::{Heartbeat, Launch, Launched};
use crate::policies::BackoffPolicy;
use crate::streams::bridge_unbounded;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::builder::StewardBuilder;
use super::config::StewardConfig;
use super::runner::Run;

/// State shared by every launch of one steward.
pub(crate) struct Inner<L> {
    pub(crate) ward: L,
    pub(crate) name: Arc<str>,
    pub(crate) timeout: Duration,
    pub(crate) ward_interval: Duration,
    pub(crate) stop_grace: Duration,
    pub(crate) backoff: BackoffPolicy,
    pub(crate) bus: Bus,
    /// Subscribers not yet wired; taken by the first launch.
    pending: Mutex<Vec<Arc<dyn Subscribe>>>,
}

/// Restarts a ward whenever its heartbeat goes silent for longer than the timeout.
pub struct Steward<L> {
    inner: Arc<Inner<L>>,
}

impl<L> Clone for Steward<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Steward<()> {
    /// Returns a builder for a steward with the given configuration.
    pub fn builder(cfg: StewardConfig) -> StewardBuilder {
        StewardBuilder::new(cfg)
    }
}

impl<L: Launch> Steward<L> {
    pub(crate) fn new_internal(
        cfg: StewardConfig,
        ward: L,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let name: Arc<str> = if cfg.name.is_empty() {
            Arc::from(ward.name())
        } else {
            Arc::from(cfg.name.as_str())
        };
        Self {
            inner: Arc::new(Inner {
                name,
                timeout: cfg.timeout,
                ward_interval: cfg.ward_interval_or_default(),
                stop_grace: cfg.stop_grace_or_default(),
                backoff: cfg.backoff,
                bus: Bus::new(cfg.bus_capacity_clamped()),
                pending: Mutex::new(subscribers),
                ward,
            }),
        }
    }

    /// The supervised launcher.
    pub fn ward(&self) -> &L {
        &self.inner.ward
    }

    /// Silence allowed before a restart.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Pulse interval handed to each generation.
    pub fn ward_interval(&self) -> Duration {
        self.inner.ward_interval
    }

    /// The steward's event bus.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Shorthand for `self.bus().subscribe()`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Starts the subscriber fan-out once, on the first launch.
    fn wire_subscribers(&self) {
        let subs = {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *pending)
        };
        if subs.is_empty() {
            return;
        }

        let bus = self.inner.bus.clone();
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(subs, bus);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        });
    }
}

impl<L: Launch> Launch for Steward<L> {
    type Item = L::Item;

    fn name(&self) -> &str {
        &self.inner.name
    }

    /// Starts supervising; `interval` paces the steward's own heartbeat.
    ///
    /// A `parent` that is already canceled yields two closed streams.
    fn launch(&self, parent: CancellationToken, interval: Duration) -> Launched<L::Item> {
        let (heartbeat, pulses) = Heartbeat::channel();
        let (generations, streams) = mpsc::unbounded_channel();
        let results = bridge_unbounded(parent.clone(), streams);

        self.wire_subscribers();
        if parent.is_cancelled() {
            let stopped =
                Event::new(EventKind::StewardStopped).with_steward(Arc::clone(&self.inner.name));
            self.inner.bus.publish(stopped);
            return (pulses, results);
        }

        let run = Run::new(
            Arc::clone(&self.inner),
            parent,
            interval,
            heartbeat,
            generations,
        );
        tokio::spawn(run.drive());
        (pulses, results)
    }
}

/// Wraps `ward` in a steward with the given timeout and default settings.
///
/// ### Errors
/// [`RuntimeError::InvalidTimeout`] when `timeout` is zero.
pub fn supervise<L: Launch>(timeout: Duration, ward: L) -> Result<Steward<L>, RuntimeError> {
    let cfg = StewardConfig {
        timeout,
        ..StewardConfig::default()
    };
    Steward::builder(cfg).build(ward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WardError;
    use crate::heartbeat::{Ward, WardFn};
    use async_trait::async_trait;
    use std::future::pending;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::{self, Instant};

    const HOUR: Duration = Duration::from_secs(3600);

    async fn mute(_ward: Ward<u8>) -> Result<(), WardError> {
        pending::<()>().await;
        Ok(())
    }

    async fn three_then_silent(mut ward: Ward<u32>) -> Result<(), WardError> {
        for i in 0..3 {
            ward.send(i).await?;
        }
        pending::<()>().await;
        Ok(())
    }

    /// Heartbeat that outlives cancellation.
    struct Stubborn;

    impl Launch for Stubborn {
        type Item = ();

        fn name(&self) -> &str {
            "stubborn"
        }

        fn launch(&self, _token: CancellationToken, _interval: Duration) -> Launched<()> {
            let (heartbeat, pulses) = Heartbeat::channel();
            let (_tx, rx) = mpsc::channel(1);
            tokio::spawn(async move {
                let _held = heartbeat;
                time::sleep(HOUR).await;
            });
            (pulses, rx)
        }
    }

    async fn one_then_silent(mut ward: Ward<u32>) -> Result<(), WardError> {
        ward.send(7).await?;
        pending::<()>().await;
        Ok(())
    }

    async fn steady(mut ward: Ward<u8>) -> Result<(), WardError> {
        Err(ward.idle().await)
    }

    /// Keeps both its heartbeat and its results sender after cancellation.
    #[derive(Default)]
    struct Hoarder(AtomicU32);

    impl Launch for Hoarder {
        type Item = u32;

        fn name(&self) -> &str {
            "hoarder"
        }

        fn launch(&self, _token: CancellationToken, _interval: Duration) -> Launched<u32> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            let (heartbeat, pulses) = Heartbeat::channel();
            let (tx, rx) = mpsc::channel(1);
            tokio::spawn(async move {
                let _held = heartbeat;
                let _ = tx.send(n).await;
                time::sleep(HOUR).await;
                drop(tx);
            });
            (pulses, rx)
        }
    }

    async fn next_of(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
        loop {
            let ev = rx.recv().await.unwrap();
            if ev.kind == kind {
                return ev;
            }
        }
    }

    fn config(timeout: Duration) -> StewardConfig {
        StewardConfig {
            timeout,
            ..StewardConfig::default()
        }
    }

    #[test]
    fn test_rejects_timeout_not_above_interval() {
        let cfg = StewardConfig {
            timeout: Duration::from_millis(100),
            ward_interval: Duration::from_millis(200),
            ..StewardConfig::default()
        };
        let err = Steward::builder(cfg)
            .build(WardFn::new("mute", mute))
            .err()
            .unwrap();
        assert_eq!(err.as_label(), "runtime_invalid_timeout");
        assert!(supervise(Duration::ZERO, WardFn::new("mute", mute)).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_precanceled_parent_gives_closed_streams() {
        let steward = supervise(Duration::from_millis(100), WardFn::new("mute", mute)).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let (mut pulses, mut results) = steward.launch(token, HOUR);
        assert!(pulses.recv().await.is_none());
        assert!(results.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_ward_restarted_within_timeout() {
        let timeout = Duration::from_millis(200);
        let steward = supervise(timeout, WardFn::new("three", three_then_silent)).unwrap();
        let mut events = steward.subscribe();

        let token = CancellationToken::new();
        let (_pulses, mut results) = steward.launch(token.clone(), HOUR);
        for want in 0..3 {
            assert_eq!(results.recv().await, Some(want));
        }
        let last_pulse = Instant::now();

        let ev = next_of(&mut events, EventKind::WardUnhealthy).await;
        let silence = last_pulse.elapsed();
        assert_eq!(ev.generation, Some(1));
        assert_eq!(ev.steward.as_deref(), Some("three"));
        assert!(silence >= timeout, "restarted early: {silence:?}");
        assert!(silence <= timeout + Duration::from_millis(5), "restarted late: {silence:?}");

        // The next generation continues on the same stream.
        assert_eq!(results.recv().await, Some(0));
        token.cancel();
        assert_eq!(results.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_count_matches_window() {
        let period = Duration::from_millis(100);
        let steward = supervise(period, WardFn::new("mute", mute)).unwrap();
        let mut events = steward.subscribe();

        let token = CancellationToken::new();
        let _streams = steward.launch(token.clone(), HOUR);

        let window = Duration::from_millis(1050);
        let deadline = Instant::now() + window;
        let mut restarts = 0;
        while let Ok(ev) = time::timeout_at(deadline, events.recv()).await {
            if ev.unwrap().kind == EventKind::WardUnhealthy {
                restarts += 1;
            }
        }
        let expected = (window.as_millis() / period.as_millis()) as i64;
        assert!((restarts - expected).abs() <= 1, "restarts = {restarts}");
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_steward_pulses_while_ward_is_silent() {
        let steward = supervise(Duration::from_millis(100), WardFn::new("mute", mute)).unwrap();
        let token = CancellationToken::new();
        let (mut pulses, _results) = steward.launch(token.clone(), Duration::from_millis(50));

        let deadline = Instant::now() + Duration::from_millis(320);
        let mut beats = 0;
        while let Ok(Some(_)) = time::timeout_at(deadline, pulses.recv()).await {
            beats += 1;
        }
        assert!(beats >= 5, "beats = {beats}");

        token.cancel();
        assert!(pulses.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_results_do_not_stall_supervision() {
        let period = Duration::from_millis(100);
        let steward = supervise(period, WardFn::new("one", one_then_silent)).unwrap();
        let mut events = steward.subscribe();

        let token = CancellationToken::new();
        // Held for the whole test, never read.
        let (_pulses, _results) = steward.launch(token.clone(), HOUR);

        let deadline = Instant::now() + Duration::from_secs(2);
        let (mut starting, mut unhealthy) = (0, 0);
        while let Ok(ev) = time::timeout_at(deadline, events.recv()).await {
            match ev.unwrap().kind {
                EventKind::WardStarting => starting += 1,
                EventKind::WardUnhealthy => unhealthy += 1,
                _ => {}
            }
        }
        assert!(unhealthy >= 15, "unhealthy = {unhealthy}");
        assert!(starting - unhealthy <= 1, "starting = {starting}, unhealthy = {unhealthy}");
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ward_pulses_are_forwarded() {
        let steward = supervise(Duration::from_millis(100), WardFn::new("steady", steady)).unwrap();
        let token = CancellationToken::new();
        // The steward's own ticker never fires within the test.
        let (mut pulses, _results) = steward.launch(token.clone(), HOUR);

        let deadline = Instant::now() + Duration::from_millis(320);
        let mut beats = 0;
        while let Ok(Some(_)) = time::timeout_at(deadline, pulses.recv()).await {
            beats += 1;
        }
        assert!(beats >= 5, "beats = {beats}");
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_lingering_results_do_not_block_later_generations() {
        let cfg = StewardConfig {
            stop_grace: Duration::from_millis(50),
            ..config(Duration::from_millis(100))
        };
        let steward = Steward::builder(cfg).build(Hoarder::default()).unwrap();

        let token = CancellationToken::new();
        let (_pulses, mut results) = steward.launch(token.clone(), HOUR);
        for want in 1..=3 {
            let got = time::timeout(Duration::from_secs(1), results.recv())
                .await
                .unwrap_or_else(|_| panic!("generation {want} never reached the consumer"));
            assert_eq!(got, Some(want));
        }
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_stewards_restart_only_the_inner_ward() {
        let inner = supervise(Duration::from_millis(100), WardFn::new("mute", mute)).unwrap();
        let mut inner_events = inner.subscribe();

        let outer = Steward::builder(StewardConfig {
            name: "outer".into(),
            ..config(Duration::from_secs(1))
        })
        .build(inner)
        .unwrap();
        let mut outer_events = outer.subscribe();
        assert_eq!(outer.name(), "outer");

        let token = CancellationToken::new();
        let _streams = outer.launch(token.clone(), HOUR);
        time::sleep(Duration::from_secs(2)).await;

        let count = |rx: &mut broadcast::Receiver<Event>| {
            let mut n = 0;
            while let Ok(ev) = rx.try_recv() {
                if ev.kind == EventKind::WardUnhealthy {
                    n += 1;
                }
            }
            n
        };
        assert!(count(&mut inner_events) >= 15);
        assert_eq!(count(&mut outer_events), 0);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_lingering_generation_is_reported_and_replaced() {
        let cfg = StewardConfig {
            stop_grace: Duration::from_millis(50),
            ..config(Duration::from_millis(100))
        };
        let steward = Steward::builder(cfg).build(Stubborn).unwrap();
        let mut events = steward.subscribe();
        let start = Instant::now();

        let token = CancellationToken::new();
        let _streams = steward.launch(token.clone(), HOUR);

        let lingering = next_of(&mut events, EventKind::WardLingering).await;
        assert_eq!(lingering.generation, Some(1));
        assert_eq!(lingering.timeout_ms, Some(50));
        assert_eq!(start.elapsed(), Duration::from_millis(150));

        let next = next_of(&mut events, EventKind::WardStarting).await;
        assert_eq!(next.generation, Some(2));
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_next_generation() {
        let cfg = StewardConfig {
            backoff: BackoffPolicy::constant(Duration::from_millis(300)),
            ..config(Duration::from_millis(100))
        };
        let steward = Steward::builder(cfg)
            .build(WardFn::new("mute", mute))
            .unwrap();
        let mut events = steward.subscribe();
        let start = Instant::now();

        let token = CancellationToken::new();
        let _streams = steward.launch(token.clone(), HOUR);

        let backoff = next_of(&mut events, EventKind::BackoffScheduled).await;
        assert_eq!(backoff.delay_ms, Some(300));
        assert_eq!(backoff.generation, Some(1));

        let next = next_of(&mut events, EventKind::WardStarting).await;
        assert_eq!(next.generation, Some(2));
        assert_eq!(start.elapsed(), Duration::from_millis(400));

        // Cancel during the second backoff.
        next_of(&mut events, EventKind::BackoffScheduled).await;
        token.cancel();
        let stopped = next_of(&mut events, EventKind::StewardStopped).await;
        assert_eq!(stopped.generation, Some(2));
    }

    #[derive(Default)]
    struct Recorder(std::sync::Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_lifecycle() {
        let recorder = Arc::new(Recorder::default());
        let steward = Steward::builder(config(Duration::from_millis(100)))
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build(WardFn::new("mute", mute))
            .unwrap();

        let token = CancellationToken::new();
        let (mut pulses, _results) = steward.launch(token.clone(), HOUR);
        time::sleep(Duration::from_millis(150)).await;
        token.cancel();
        assert!(pulses.recv().await.is_none());
        time::sleep(Duration::from_millis(10)).await;

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(seen.first(), Some(&EventKind::StewardStarting));
        assert_eq!(seen.last(), Some(&EventKind::StewardStopped));
        assert!(seen.contains(&EventKind::WardUnhealthy));
        assert_eq!(
            seen.iter().filter(|k| **k == EventKind::WardStarting).count(),
            2
        );
    }
}
