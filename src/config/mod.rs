//! Engine configuration from `ditakeys.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── cache      # [cache]
//! │   ├── parse      # [parse]
//! │   ├── watch      # [watch]
//! │   └── workspace  # [workspace]
//! ├── error          # ConfigError
//! └── mod.rs         # EngineConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section       | Purpose                                         |
//! |---------------|-------------------------------------------------|
//! | `[workspace]` | Boundary roots for path resolution              |
//! | `[cache]`     | Key-space and root-lookup TTL / capacity        |
//! | `[parse]`     | Per-document match caps                         |
//! | `[watch]`     | Invalidation debounce window                    |

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{CacheConfig, ParseConfig, WatchConfig, WorkspaceConfig};

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::utils::path::{normalize_path, resolve_path};

/// Default config file name, searched upward from the current directory.
pub const CONFIG_FILE: &str = "ditakeys.toml";

/// Root configuration structure representing `ditakeys.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Absolute path to the config file, empty when running on defaults
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative roots are resolved against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub workspace: WorkspaceConfig,
    pub cache: CacheConfig,
    pub parse: ParseConfig,
    pub watch: WatchConfig,
}

impl EngineConfig {
    /// Load configuration.
    ///
    /// With `path`, that file must exist. Without it, `ditakeys.toml` is
    /// searched upward from the current directory; if none is found the
    /// defaults apply with the current directory as project root.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let found = match path {
            Some(path) => Some(normalize_path(path)),
            None => find_config_file(Path::new(CONFIG_FILE)),
        };

        let Some(config_path) = found else {
            let mut config = Self::default();
            config.root = normalize_path(Path::new("."));
            config.validate()?;
            return Ok(config);
        };

        let mut config = Self::from_path(&config_path)?;
        config.root = config_path
            .parent()
            .map_or_else(|| normalize_path(Path::new(".")), Path::to_path_buf);
        config.config_path = config_path;
        config.validate()?;
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {} are ignored: {}", path.display(), fields.join(", "));
    }

    /// Reject settings that would leave the caches or parser unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.cache.capacity == 0, "cache.capacity must be at least 1"),
            (self.cache.ttl == 0, "cache.ttl must be at least 1 second"),
            (self.cache.root_lookup_capacity == 0, "cache.root_lookup_capacity must be at least 1"),
            (self.cache.root_lookup_ttl == 0, "cache.root_lookup_ttl must be at least 1 second"),
            (self.cache.sweep_floor == 0, "cache.sweep_floor must be at least 1 second"),
            (self.parse.max_key_matches == 0, "parse.max_key_matches must be at least 1"),
            (self.parse.max_map_refs == 0, "parse.max_map_refs must be at least 1"),
        ];
        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(ConfigError::Validation((*message).to_string())),
            None => Ok(()),
        }
    }

    /// Absolute boundary roots. Relative entries resolve against the
    /// config file's directory (or the current directory).
    pub fn boundary_roots(&self) -> Vec<PathBuf> {
        let base = if self.root.as_os_str().is_empty() {
            normalize_path(Path::new("."))
        } else {
            self.root.clone()
        };
        self.workspace
            .roots
            .iter()
            .map(|root| resolve_path(root, &base))
            .collect()
    }
}

/// Find a config file by searching upward from the current directory.
///
/// ```text
/// /home/user/docs/topics/   ← cwd
/// /home/user/docs/ditakeys.toml  ← found!
/// ```
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
pub fn test_parse_config(extra: &str) -> EngineConfig {
    let (parsed, ignored) = EngineConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            EngineConfig::parse_with_ignored("[cache]\nttl = 10\nbogus = 1\n[extra]\nx = 1").unwrap();
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f == "cache.bogus"));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = test_parse_config("[cache]\ncapacity = 0");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("cache.capacity")));
    }

    #[test]
    fn test_validate_rejects_zero_caps() {
        let config = test_parse_config("[parse]\nmax_key_matches = 0");
        assert!(config.validate().is_err());
        assert!(test_parse_config("").validate().is_ok());
    }

    #[test]
    fn test_load_explicit_file_resolves_roots() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ditakeys.toml");
        fs::write(&path, "[workspace]\nroots = [\".\", \"shared\", \"/abs\"]\n").unwrap();

        let config = EngineConfig::load(Some(&path)).unwrap();
        let root = normalize_path(temp.path());
        assert_eq!(config.root, root);
        assert_eq!(
            config.boundary_roots(),
            vec![root.clone(), root.join("shared"), PathBuf::from("/abs")]
        );
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let err = EngineConfig::load(Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ditakeys.toml");
        fs::write(&path, "[cache\nttl = ").unwrap();
        assert!(matches!(EngineConfig::load(Some(&path)), Err(ConfigError::Toml(_))));
    }
}
