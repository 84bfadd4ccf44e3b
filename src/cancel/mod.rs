//! Cancellation signals and how to merge them.
//!
//! The token itself is [`CancellationToken`] from `tokio_util`: a sticky,
//! one-shot, broadcastable "stop" signal. This module adds the fan-in side:
//!
//! - [`or`] merges any number of tokens into one that fires on the first input;
//! - [`or2`] is the two-token shorthand used by the steward per generation;
//! - [`never`] is an explicit sentinel for "no cancellation scope".
//!
//! ## Rules
//! - A merged token observes its inputs without registering with them, so
//!   inputs never need to unregister anything.
//! - Each merged token owns exactly **one** monitor task. It exits as soon as
//!   any input fires, the merged token itself is cancelled, or the last
//!   [`Merged`] handle is dropped.

mod or;

pub use or::{never, or, or2, Merged};
pub use tokio_util::sync::CancellationToken;
