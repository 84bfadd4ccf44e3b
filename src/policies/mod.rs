//! Restart pacing for stewards.
//!
//! A steward replaces a silent ward immediately by default. These policies let
//! callers slow that down when a ward keeps dying right after launch.
//!
//! ## Contents
//! - [`BackoffPolicy`] delay before generation `n + 1` after `n` silent generations
//! - [`JitterPolicy`]  randomization applied on top of the computed delay
//!
//! ## Quick wiring
//! ```text
//! StewardConfig { backoff: BackoffPolicy, .. }
//!      └─► core::steward control loop:
//!           - silent generation ──► delay = backoff.next(streak)
//!           - publish BackoffScheduled{ delay } and sleep (cancellable)
//!           - any pulse from a generation resets the streak to 0
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` is [`BackoffPolicy::none`]: restart without delay.
//! - `JitterPolicy::None`.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
