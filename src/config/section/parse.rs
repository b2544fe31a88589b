//! `[parse]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [parse]
//! max_key_matches = 10000     # Key definitions read per map
//! max_map_refs = 1000         # Sub-map references followed per map
//! ```

use serde::{Deserialize, Serialize};

use crate::keyspace::parse::{DEFAULT_MAX_KEY_MATCHES, DEFAULT_MAX_MAP_REFS};

/// Per-document extraction caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    pub max_key_matches: usize,
    pub max_map_refs: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_key_matches: DEFAULT_MAX_KEY_MATCHES,
            max_map_refs: DEFAULT_MAX_MAP_REFS,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_parse_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.parse.max_key_matches, 10_000);
        assert_eq!(config.parse.max_map_refs, 1_000);
    }

    #[test]
    fn test_parse_config_override() {
        let config = test_parse_config("[parse]\nmax_map_refs = 50");
        assert_eq!(config.parse.max_map_refs, 50);
        assert_eq!(config.parse.max_key_matches, 10_000);
    }
}
