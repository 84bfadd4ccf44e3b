//! # Runtime events emitted by stewards.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Steward events**: the supervisor's own lifecycle (starting, stopped)
//! - **Ward events**: one generation's lifecycle (starting, unhealthy, lingering, backoff)
//! - **Subscriber events**: problems delivering events (overflow, panic)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, steward
//! name, generation number, reasons and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use steward::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::WardUnhealthy)
//!     .with_steward("ingest")
//!     .with_generation(3)
//!     .with_timeout(Duration::from_secs(2));
//!
//! assert_eq!(ev.kind, EventKind::WardUnhealthy);
//! assert_eq!(ev.steward.as_deref(), Some("ingest"));
//! assert_eq!(ev.generation, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `steward`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `steward`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Steward lifecycle ===
    /// A steward accepted a launch and is about to start its first generation.
    ///
    /// Sets:
    /// - `steward`: steward name
    /// - `timeout_ms`: monitoring timeout
    StewardStarting,

    /// The parent token fired; the steward and its current generation are gone.
    ///
    /// Sets:
    /// - `steward`: steward name
    /// - `generation`: last generation number (absent if none ever started)
    StewardStopped,

    // === Ward lifecycle ===
    /// A new ward generation is being launched.
    ///
    /// Sets:
    /// - `steward`: steward name
    /// - `generation`: generation number (1-based, per launch)
    WardStarting,

    /// No pulse arrived within the timeout; the generation is being replaced.
    ///
    /// Sets:
    /// - `steward`: steward name
    /// - `generation`: the silent generation
    /// - `timeout_ms`: monitoring timeout
    WardUnhealthy,

    /// A cancelled generation did not close its streams within the stop grace.
    ///
    /// Sets:
    /// - `steward`: steward name
    /// - `generation`: the lingering generation
    /// - `timeout_ms`: stop grace that was exceeded
    WardLingering,

    /// The next generation is delayed by the restart backoff.
    ///
    /// Sets:
    /// - `steward`: steward name
    /// - `generation`: the generation that just failed
    /// - `delay_ms`: delay before the next launch
    BackoffScheduled,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the steward (or subscriber), if applicable.
    pub steward: Option<Arc<str>>,
    /// Ward generation (starting from 1).
    pub generation: Option<u64>,
    /// Timeout or grace in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Delay before next launch in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            steward: None,
            generation: None,
            timeout_ms: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a steward name.
    #[inline]
    pub fn with_steward(mut self, name: impl Into<Arc<str>>) -> Self {
        self.steward = Some(name.into());
        self
    }

    /// Attaches a generation number.
    #[inline]
    pub fn with_generation(mut self, n: u64) -> Self {
        self.generation = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_steward(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_steward(subscriber)
            .with_reason(info)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::WardStarting);
        let b = Event::new(EventKind::WardStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_durations_saturate() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
