//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by stewards and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the steward control loop, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the steward's subscriber listener (fans out to `SubscriberSet`)
//!   and anyone holding [`Steward::bus`](crate::Steward::bus).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
