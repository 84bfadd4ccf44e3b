//! # Event subscribers.
//!
//! A steward publishes its lifecycle on a [`Bus`](crate::events::Bus). Subscribers
//! passed to [`StewardBuilder::with_subscribers`](crate::StewardBuilder::with_subscribers)
//! receive those events through a [`SubscriberSet`], each on its own bounded queue.
//!
//! ```text
//! steward loop ── publish ──► Bus ──► listener ──► SubscriberSet ──┬──► LogWriter
//!                                                                  └──► custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use steward::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct RestartCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for RestartCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::WardUnhealthy {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "restart-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
