//! Runtime core: the steward.
//!
//! Public API from this module is [`Steward`], its [`StewardBuilder`] and
//! [`StewardConfig`], plus the [`supervise`] shorthand.
//!
//! Internal modules:
//! - [`runner`]: the per-launch control loop (start, monitor, restart);
//! - [`steward`]: shared state, subscriber wiring and the `Launch` impl;
//! - [`builder`]: validation and construction;
//! - [`config`]: settings and their sentinel defaults.

mod builder;
mod config;
mod runner;
mod steward;

pub use builder::StewardBuilder;
pub use config::StewardConfig;
pub use steward::{supervise, Steward};
