//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 300           # Batch window for map change events
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::watch::DEFAULT_DEBOUNCE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl WatchConfig {
    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
