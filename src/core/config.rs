//! # Steward configuration.
//!
//! [`StewardConfig`] is a plain struct with public fields; build it with
//! struct-update syntax over [`Default`].
//!
//! ## Sentinel values
//! - `name = ""` → the ward's own [`Launch::name`](crate::heartbeat::Launch::name)
//! - `ward_interval = 0s` → `timeout / 2`
//! - `stop_grace = 0s` → `timeout`
//! - `bus_capacity = 0` → 1
//!
//! ```rust
//! use std::time::Duration;
//! use steward::StewardConfig;
//!
//! let cfg = StewardConfig {
//!     timeout: Duration::from_secs(4),
//!     ..StewardConfig::default()
//! };
//! assert_eq!(cfg.ward_interval_or_default(), Duration::from_secs(2));
//! assert!(cfg.validate().is_ok());
//! ```

use std::time::Duration;

use crate::error::RuntimeError;
use crate::policies::BackoffPolicy;

/// Settings for one steward.
#[derive(Clone, Debug)]
pub struct StewardConfig {
    /// Name used in events (`""` = the ward's name).
    pub name: String,

    /// How long the ward may stay silent before it is replaced.
    pub timeout: Duration,

    /// Pulse interval handed to the ward (`0s` = `timeout / 2`).
    ///
    /// Must be strictly shorter than `timeout`.
    pub ward_interval: Duration,

    /// How long a canceled generation may take to close its heartbeat before
    /// the next one starts anyway (`0s` = `timeout`).
    pub stop_grace: Duration,

    /// Capacity of the event bus ring buffer (min 1).
    pub bus_capacity: usize,

    /// Delay between generations.
    pub backoff: BackoffPolicy,
}

impl StewardConfig {
    /// Pulse interval for the ward with the sentinel resolved.
    #[inline]
    pub fn ward_interval_or_default(&self) -> Duration {
        if self.ward_interval.is_zero() {
            self.timeout / 2
        } else {
            self.ward_interval
        }
    }

    /// Stop grace with the sentinel resolved.
    #[inline]
    pub fn stop_grace_or_default(&self) -> Duration {
        if self.stop_grace.is_zero() {
            self.timeout
        } else {
            self.stop_grace
        }
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks that the timeout leaves room for at least one ward pulse.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let interval = self.ward_interval_or_default();
        if self.timeout <= interval {
            return Err(RuntimeError::InvalidTimeout {
                timeout: self.timeout,
                interval,
            });
        }
        Ok(())
    }
}

impl Default for StewardConfig {
    /// - `timeout = 2s`, `ward_interval = 1s`, `stop_grace = 2s`
    /// - `bus_capacity = 1024`
    /// - `backoff = BackoffPolicy::none()`
    fn default() -> Self {
        Self {
            name: String::new(),
            timeout: Duration::from_secs(2),
            ward_interval: Duration::ZERO,
            stop_grace: Duration::ZERO,
            bus_capacity: 1024,
            backoff: BackoffPolicy::none(),
        }
    }
}
