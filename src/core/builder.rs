use std::sync::Arc;

use crate::core::{Steward, StewardConfig};
use crate::error::RuntimeError;
use crate::heartbeat::Launch;
use crate::subscribers::Subscribe;

/// Builder for a [`Steward`].
///
/// ```rust
/// use std::{sync::Arc, time::Duration};
/// use steward::{heartbeat::{Launch, Ward, WardFn}, Steward, StewardConfig, Subscribe};
///
/// let ward = WardFn::new("idle", |mut ward: Ward<()>| async move { Err::<(), _>(ward.idle().await) });
/// let cfg = StewardConfig { timeout: Duration::from_millis(500), ..StewardConfig::default() };
///
/// let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
/// let steward = Steward::builder(cfg).with_subscribers(subs).build(ward).unwrap();
/// assert_eq!(steward.name(), "idle");
/// ```
pub struct StewardBuilder {
    cfg: StewardConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl StewardBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: StewardConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Their workers start on the first launch, inside the runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and wraps `ward`.
    pub fn build<L: Launch>(self, ward: L) -> Result<Steward<L>, RuntimeError> {
        self.cfg.validate()?;
        Ok(Steward::new_internal(self.cfg, ward, self.subscribers))
    }
}
