//! Cancellation scope handed to rate limiters.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cancel::never;

/// A cancellation token with an optional deadline.
///
/// Limiters observe both: they abort a wait when the token fires, and they
/// refuse a wait that would end after the deadline.
#[derive(Clone, Debug)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Context bound to `token`, without a deadline.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::new(never())
    }

    /// Sets the deadline to `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let at = Instant::now() + timeout;
        self.with_deadline(at)
    }

    /// Sets an absolute deadline; an earlier existing deadline wins.
    pub fn with_deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(prev) if prev < at => prev,
            _ => at,
        });
        self
    }

    /// The cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline as seen from `now` (`None` without deadline).
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|at| at.saturating_duration_since(now))
    }

    /// True once the deadline has been reached.
    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(at) if at <= now)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
