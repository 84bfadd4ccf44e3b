//! # Steward control loop.
//!
//! One [`Run`] drives one launch of a steward until its parent token fires.
//!
//! ```text
//!            ┌───────────── restart ─────────────┐
//!            ▼                                   │
//! Starting ──► Monitoring ──── timeout ────► Restarting
//!   │  done = new token                          │ done.cancel()
//!   │  token = or(parent, done)                  │ wait heartbeat close (≤ stop_grace)
//!   │  push drain(token, results) to bridge      │ backoff sleep (optional)
//!   ▼                                            │
//! parent.cancelled() at any point ──────────► Stopped
//! ```
//!
//! ## Rules
//! - Every wait in the loop keeps pulsing the steward's own heartbeat and
//!   observes the parent token first.
//! - A ward pulse resets the timeout window and is forwarded as a steward
//!   pulse; a closed ward heartbeat is silence.
//! - The previous generation is canceled before the next one is launched.
//! - Handing results to the bridge never waits for the consumer, and each
//!   generation's results end when its token fires.

use std::future::{pending, Future};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::cancel::{or2, Merged};
use crate::events::{Event, EventKind};
use crate::heartbeat::{Heartbeat, Launch, Pulse, Pulses};
use crate::streams::drain;

use super::steward::Inner;

/// One ward generation as seen by the control loop.
struct Generation {
    number: u64,
    done: CancellationToken,
    /// Keeps the `or(parent, done)` monitor alive while the generation runs.
    _scope: Merged,
    pulses: Option<Pulses>,
}

/// How a monitored generation ended.
enum Verdict {
    /// No pulse within the timeout. `pulsed` tells whether it ever pulsed.
    Silent { pulsed: bool },
    /// The parent token fired.
    Stopped,
}

pub(crate) struct Run<L: Launch> {
    inner: Arc<Inner<L>>,
    parent: CancellationToken,
    heartbeat: Heartbeat,
    ticker: Interval,
    generations: mpsc::UnboundedSender<mpsc::Receiver<L::Item>>,
}

impl<L: Launch> Run<L> {
    pub(crate) fn new(
        inner: Arc<Inner<L>>,
        parent: CancellationToken,
        interval: Duration,
        heartbeat: Heartbeat,
        generations: mpsc::UnboundedSender<mpsc::Receiver<L::Item>>,
    ) -> Self {
        let period = interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            inner,
            parent,
            heartbeat,
            ticker,
            generations,
        }
    }

    /// Runs generations until the parent is canceled or nobody reads results.
    pub(crate) async fn drive(mut self) {
        self.publish(Event::new(EventKind::StewardStarting).with_timeout(self.inner.timeout));

        let mut number = 0;
        let mut started = None;
        let mut streak = 0u32;
        loop {
            number += 1;
            let Some(mut generation) = self.start(number) else {
                break;
            };
            started = Some(number);

            let watched = watch(&mut generation.pulses, &self.heartbeat, self.inner.timeout);
            let verdict =
                match attend(&self.parent, &mut self.ticker, &self.heartbeat, watched).await {
                    Some(pulsed) => Verdict::Silent { pulsed },
                    None => Verdict::Stopped,
                };

            generation.done.cancel();
            let Verdict::Silent { pulsed } = verdict else {
                break;
            };

            self.publish(
                Event::new(EventKind::WardUnhealthy)
                    .with_generation(generation.number)
                    .with_timeout(self.inner.timeout),
            );
            if !self.retire(generation).await {
                break;
            }

            if pulsed {
                streak = 0;
            }
            let delay = self.inner.backoff.next(streak);
            streak = streak.saturating_add(1);
            if !self.pause(number, delay).await {
                break;
            }
        }

        let stopped = Event::new(EventKind::StewardStopped);
        self.publish(match started {
            Some(n) => stopped.with_generation(n),
            None => stopped,
        });
    }

    /// Launches generation `number` and hands its results to the bridge.
    ///
    /// Returns `None` when the parent fired or nobody holds the results anymore.
    fn start(&mut self, number: u64) -> Option<Generation> {
        if self.parent.is_cancelled() {
            return None;
        }
        let done = CancellationToken::new();
        let scope = or2(&self.parent, &done);
        let token = scope.token().clone();

        self.publish(Event::new(EventKind::WardStarting).with_generation(number));
        let (pulses, results) = self.inner.ward.launch(token.clone(), self.inner.ward_interval);

        if self.generations.send(drain(token, results)).is_err() {
            done.cancel();
            return None;
        }
        Some(Generation {
            number,
            done,
            _scope: scope,
            pulses: Some(pulses),
        })
    }

    /// Waits for a canceled generation to close its heartbeat, at most `stop_grace`.
    ///
    /// Returns `false` if the parent fired meanwhile.
    async fn retire(&mut self, mut generation: Generation) -> bool {
        let grace = self.inner.stop_grace;
        let closing = time::timeout(grace, closed(&mut generation.pulses));
        match attend(&self.parent, &mut self.ticker, &self.heartbeat, closing).await {
            Some(Ok(())) => true,
            Some(Err(_)) => {
                self.publish(
                    Event::new(EventKind::WardLingering)
                        .with_generation(generation.number)
                        .with_timeout(grace),
                );
                true
            }
            None => false,
        }
    }

    /// Sleeps the restart backoff. Returns `false` if the parent fired meanwhile.
    async fn pause(&mut self, number: u64, delay: Duration) -> bool {
        if delay.is_zero() {
            return true;
        }
        self.publish(
            Event::new(EventKind::BackoffScheduled)
                .with_generation(number)
                .with_delay(delay),
        );
        let sleep = time::sleep(delay);
        attend(&self.parent, &mut self.ticker, &self.heartbeat, sleep)
            .await
            .is_some()
    }

    fn publish(&self, ev: Event) {
        self.inner.bus.publish(ev.with_steward(Arc::clone(&self.inner.name)));
    }
}

/// Drives `fut` while pulsing on every tick; `None` if `parent` fires first.
async fn attend<F: Future>(
    parent: &CancellationToken,
    ticker: &mut Interval,
    heartbeat: &Heartbeat,
    fut: F,
) -> Option<F::Output> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            biased;
            _ = parent.cancelled() => return None,
            out = &mut fut => return Some(out),
            _ = ticker.tick() => {
                heartbeat.pulse();
            }
        }
    }
}

/// Resolves once the ward stays silent for `timeout`; tells whether it ever pulsed.
///
/// Every ward pulse is passed on through `heartbeat`.
async fn watch(pulses: &mut Option<Pulses>, heartbeat: &Heartbeat, timeout: Duration) -> bool {
    let mut pulsed = false;
    while time::timeout(timeout, next_pulse(pulses)).await.is_ok() {
        heartbeat.pulse();
        pulsed = true;
    }
    pulsed
}

/// Next pulse, or never once the heartbeat has closed.
async fn next_pulse(pulses: &mut Option<Pulses>) -> Pulse {
    if let Some(rx) = pulses.as_mut() {
        if let Some(pulse) = rx.recv().await {
            return pulse;
        }
    }
    *pulses = None;
    pending().await
}

/// Resolves when the heartbeat closes.
async fn closed(pulses: &mut Option<Pulses>) {
    while let Some(rx) = pulses.as_mut() {
        if rx.recv().await.is_none() {
            *pulses = None;
        }
    }
}
