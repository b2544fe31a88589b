//! `[workspace]` section configuration.
//!
//! Boundary roots that resolved paths must stay inside. Relative roots are
//! taken from the config file's directory. An empty list disables the
//! boundary (single-file mode).
//!
//! ```toml
//! [workspace]
//! roots = [".", "../shared-keys"]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub roots: Vec<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
        }
    }
}
