//! Error types used by the steward runtime, wards and rate limiters.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`]: invalid construction of runtime pieces (signals, stewards).
//! - [`WardError`]: the outcome of a single ward body.
//! - [`LimitError`]: a rate limiter refused or abandoned a wait.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while wiring the runtime.
///
/// These are configuration mistakes detected up front, before any task is spawned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// [`or`](crate::cancel::or) was called without any token to merge.
    #[error("cannot merge an empty set of cancellation signals")]
    NoSignals,

    /// The steward timeout does not leave room for at least one ward pulse.
    #[error("steward timeout {timeout:?} must be greater than ward pulse interval {interval:?}")]
    InvalidTimeout {
        /// The configured monitoring timeout.
        timeout: Duration,
        /// The pulse interval handed to the ward.
        interval: Duration,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use steward::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::NoSignals.as_label(), "runtime_no_signals");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoSignals => "runtime_no_signals",
            RuntimeError::InvalidTimeout { .. } => "runtime_invalid_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::NoSignals => "no signals to merge".to_string(),
            RuntimeError::InvalidTimeout { timeout, interval } => {
                format!("timeout={timeout:?} <= interval={interval:?}")
            }
        }
    }
}

/// # Errors produced by a ward body.
///
/// A ward that is canceled or loses its consumer stops with one of the
/// cancellation-class variants; anything else is a [`WardError::Fail`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WardError {
    /// The ward's token fired.
    #[error("ward cancelled")]
    Canceled,

    /// Nobody is reading the result stream anymore.
    #[error("result stream closed")]
    Closed,

    /// The ward gave up on its own.
    #[error("ward failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl WardError {
    /// Shorthand for [`WardError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WardError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use steward::WardError;
    ///
    /// assert_eq!(WardError::fail("boom").as_label(), "ward_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WardError::Canceled => "ward_canceled",
            WardError::Closed => "ward_closed",
            WardError::Fail { .. } => "ward_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WardError::Canceled => "cancelled".to_string(),
            WardError::Closed => "result stream closed".to_string(),
            WardError::Fail { error } => format!("error: {error}"),
        }
    }

    /// True when the ward stopped because it was told to (or nobody listens).
    ///
    /// ```
    /// use steward::WardError;
    ///
    /// assert!(WardError::Canceled.is_cancellation());
    /// assert!(!WardError::fail("nope").is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, WardError::Canceled | WardError::Closed)
    }
}

/// # Errors produced by rate limiters.
///
/// [`MultiLimiter`](crate::MultiLimiter) propagates these verbatim from the first
/// member that refuses.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// The context was canceled before a permit became available.
    #[error("context cancelled")]
    Canceled,

    /// The permit would only be available after the context deadline.
    #[error("rate: wait of {wait:?} would exceed context deadline")]
    DeadlineExceeded {
        /// How long the caller would have had to wait.
        wait: Duration,
    },

    /// The limiter can never grant a permit of this size.
    #[error("rate: request exceeds limiter burst {burst}")]
    BurstExceeded {
        /// The limiter's burst capacity.
        burst: u32,
    },
}

impl LimitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LimitError::Canceled => "limit_canceled",
            LimitError::DeadlineExceeded { .. } => "limit_deadline_exceeded",
            LimitError::BurstExceeded { .. } => "limit_burst_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LimitError::Canceled => "context cancelled".to_string(),
            LimitError::DeadlineExceeded { wait } => format!("deadline: would wait {wait:?}"),
            LimitError::BurstExceeded { burst } => format!("burst: {burst}"),
        }
    }

    /// True for the cancellation/timeout class of errors.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            LimitError::Canceled | LimitError::DeadlineExceeded { .. }
        )
    }
}
