//! Cancellation-aware stream plumbing.
//!
//! A *stream* here is a [`tokio::sync::mpsc::Receiver`]: one producer task owns
//! the `Sender` and end-of-stream is the channel closing. Every stage in this
//! module is a spawned task whose sends and receives are all `select!`ed
//! against a [`CancellationToken`](crate::CancellationToken), so no stage can
//! outlive its token.
//!
//! ## Contents
//! - [`drain`] forward a stream until it ends or the token fires (`orDone`)
//! - [`bridge`] flatten a stream of streams into one stream
//! - [`tee`] split one stream into two lockstep-paced streams
//! - [`generate`], [`repeat`], [`repeat_with`], [`take`] sources and a limiter stage
//! - [`replicate`] race several replicas of the same work, keep the first answer
//!
//! ## Quick wiring
//! ```text
//! generate ──► take ──► drain ──► tee ──┬──► consumer A
//!                                      └──► consumer B
//!
//! generations ──► bridge ──► consumer      (used by the steward)
//! ```
//!
//! ## Rules
//! - Element order is preserved end to end (FIFO per source).
//! - Stage channels hold at most [`STAGE_CAPACITY`] element. An element already
//!   buffered when the token fires is still readable; nothing is sent after.
//! - A stage stops when its token fires, its source closes, or its consumer drops the output.

mod bridge;
mod drain;
mod replicate;
mod source;
mod tee;

pub use bridge::bridge;
pub use drain::drain;
pub use replicate::replicate;
pub use source::{generate, repeat, repeat_with, take};
pub use tee::tee;

pub(crate) use bridge::bridge_unbounded;
pub(crate) use drain::{forward, Drained};

/// Buffer size of every channel created by a stage.
pub const STAGE_CAPACITY: usize = 1;
