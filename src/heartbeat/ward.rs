//! # Ward handle.
//!
//! A ward body never touches its channels directly; it works through a
//! [`Ward`], which keeps pulsing on every interval tick while the body waits
//! on anything (a result send, a sleep, an arbitrary future) and gives up as
//! soon as the ward's token fires.
//!
//! ```text
//! ward.send(v) / ward.guard(fut) / ward.sleep(d)
//!   loop select {
//!     token.cancelled()  → Err(WardError::Canceled)
//!     fut                → Ok(out)
//!     ticker.tick()      → heartbeat.pulse(); keep waiting
//!   }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::WardError;

use super::pulse::Heartbeat;

/// Working handle passed to a ward body by [`launch`](super::launch).
pub struct Ward<T> {
    token: CancellationToken,
    interval: Duration,
    ticker: Interval,
    heartbeat: Heartbeat,
    results: mpsc::Sender<T>,
}

impl<T> Ward<T> {
    pub(crate) fn new(
        token: CancellationToken,
        interval: Duration,
        heartbeat: Heartbeat,
        results: mpsc::Sender<T>,
    ) -> Self {
        // Interval panics on zero periods; a zero interval means "pulse as often as possible".
        let period = interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            token,
            interval,
            ticker,
            heartbeat,
            results,
        }
    }

    /// The ward's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Shorthand for `self.token().is_cancelled()`.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The pulse interval this ward was launched with.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Emits a pulse right now (best-effort).
    pub fn pulse(&self) -> bool {
        self.heartbeat.pulse()
    }

    /// Delivers one result, pulsing while the consumer is slow.
    ///
    /// A successful delivery also counts as a sign of life and attempts a pulse.
    ///
    /// ### Errors
    /// - [`WardError::Canceled`] if the token fired first;
    /// - [`WardError::Closed`] if the result stream was dropped.
    pub async fn send(&mut self, value: T) -> Result<(), WardError> {
        let sent = pump(
            &self.token,
            &mut self.ticker,
            &self.heartbeat,
            self.results.send(value),
        )
        .await?;
        sent.map_err(|_| WardError::Closed)?;
        self.heartbeat.pulse();
        Ok(())
    }

    /// Drives `fut` to completion while pulsing, unless the token fires first.
    pub async fn guard<F: Future>(&mut self, fut: F) -> Result<F::Output, WardError> {
        pump(&self.token, &mut self.ticker, &self.heartbeat, fut).await
    }

    /// Sleeps for `dur` while pulsing.
    pub async fn sleep(&mut self, dur: Duration) -> Result<(), WardError> {
        self.guard(time::sleep(dur)).await
    }

    /// Pulses until the token fires; always returns [`WardError::Canceled`].
    pub async fn idle(&mut self) -> WardError {
        let forever = std::future::pending::<Infallible>();
        match pump(&self.token, &mut self.ticker, &self.heartbeat, forever).await {
            Ok(never) => match never {},
            Err(e) => e,
        }
    }
}

async fn pump<F: Future>(
    token: &CancellationToken,
    ticker: &mut Interval,
    heartbeat: &Heartbeat,
    fut: F,
) -> Result<F::Output, WardError> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(WardError::Canceled),
            out = &mut fut => return Ok(out),
            _ = ticker.tick() => {
                heartbeat.pulse();
            }
        }
    }
}
