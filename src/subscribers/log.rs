//! # LogWriter
//!
//! Renders steward events through [`tracing`], so the embedding application
//! decides where they go by installing any subscriber it likes.
//!
//! | kind | level |
//! |---|---|
//! | `StewardStarting`, `WardStarting`, `StewardStopped` | `info` |
//! | `WardUnhealthy`, `WardLingering`, `SubscriberOverflow`, `SubscriberPanicked` | `warn` |
//! | `BackoffScheduled` | `debug` |

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let steward = e.steward.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::StewardStarting => {
                tracing::info!(steward, timeout_ms = e.timeout_ms, seq = e.seq, "steward starting");
            }
            EventKind::WardStarting => {
                tracing::info!(steward, generation = e.generation, seq = e.seq, "ward starting");
            }
            EventKind::WardUnhealthy => {
                tracing::warn!(
                    steward,
                    generation = e.generation,
                    timeout_ms = e.timeout_ms,
                    seq = e.seq,
                    "ward unhealthy, restarting"
                );
            }
            EventKind::WardLingering => {
                tracing::warn!(
                    steward,
                    generation = e.generation,
                    grace_ms = e.timeout_ms,
                    seq = e.seq,
                    "canceled ward did not stop within grace"
                );
            }
            EventKind::BackoffScheduled => {
                tracing::debug!(
                    steward,
                    generation = e.generation,
                    delay_ms = e.delay_ms,
                    seq = e.seq,
                    "restart delayed"
                );
            }
            EventKind::StewardStopped => {
                tracing::info!(steward, generation = e.generation, seq = e.seq, "steward stopped");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = steward, reason = e.reason.as_deref(), "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(subscriber = steward, info = e.reason.as_deref(), "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
