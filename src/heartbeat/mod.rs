//! Heartbeat protocol for supervised workers ("wards").
//!
//! A ward produces results at its own pace and, independently, tells whoever
//! watches it that it is still running by emitting content-free [`Pulse`]s.
//!
//! ## Contents
//! - [`Pulse`], [`Heartbeat`], [`Pulses`] the liveness channel (best-effort, capacity 1)
//! - [`Ward`] the handle a ward body works through (pulsing, cancellable sends)
//! - [`launch`] spawn a ward body and get its `(pulses, results)` streams
//! - [`Launch`], [`WardFn`], [`WardRef`] launcher abstraction shared with the steward
//!
//! ## Architecture
//! ```text
//! launch(token, interval, body)
//!   ├─► Heartbeat::channel()  ──► Pulses   (returned)
//!   ├─► mpsc::channel()       ──► results  (returned)
//!   └─► spawn( select { body(Ward) | token.cancelled() } )
//!              │
//!              ├─ every `interval` while blocked: heartbeat.pulse()   (dropped if full)
//!              └─ on any exit (return, cancel, panic): both senders dropped → streams close
//! ```
//!
//! ## Rules
//! - A pulse means "still running", not "still producing".
//! - Dropped pulses are never an error.
//! - Both streams close exactly once, on every exit path.

mod launch;
mod pulse;
mod ward;

pub use launch::{launch, Launch, Launched, WardFn, WardRef};
pub use pulse::{Heartbeat, Pulse, Pulses};
pub use ward::Ward;
