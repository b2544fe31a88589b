//! `[cache]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cache]
//! ttl = 300                   # Key space lifetime in seconds
//! capacity = 10               # Key spaces kept at once
//! root_lookup_ttl = 60        # Root map lookup lifetime in seconds
//! root_lookup_capacity = 256  # Directories remembered
//! sweep_floor = 30            # Minimum seconds between background sweeps
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keyspace::cache::{
    DEFAULT_CAPACITY, DEFAULT_ROOT_LOOKUP_CAPACITY, DEFAULT_ROOT_LOOKUP_TTL, DEFAULT_TTL,
};

/// Divides the key-space TTL into the background sweep period.
const SWEEP_DIVISOR: u32 = 4;

/// Cache sizing and lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Key space TTL in seconds.
    pub ttl: u64,
    /// Maximum cached key spaces.
    pub capacity: usize,
    /// Root map lookup TTL in seconds.
    pub root_lookup_ttl: u64,
    /// Maximum cached directory lookups.
    pub root_lookup_capacity: usize,
    /// Minimum background sweep interval in seconds.
    pub sweep_floor: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL.as_secs(),
            capacity: DEFAULT_CAPACITY,
            root_lookup_ttl: DEFAULT_ROOT_LOOKUP_TTL.as_secs(),
            root_lookup_capacity: DEFAULT_ROOT_LOOKUP_CAPACITY,
            sweep_floor: 30,
        }
    }
}

impl CacheConfig {
    #[inline]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    #[inline]
    pub fn root_lookup_ttl(&self) -> Duration {
        Duration::from_secs(self.root_lookup_ttl)
    }

    /// Background sweep period: `max(sweep_floor, ttl / 4)`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_floor).max(self.ttl() / SWEEP_DIVISOR)
    }
}
