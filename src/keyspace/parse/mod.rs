//! Map content parsing.
//!
//! Extracts, from the text of a single map document:
//! - key definitions (any element with a `keys` attribute)
//! - references to sub-maps (map-nesting elements whose href names a map)
//!
//! Pure function over text: no I/O, no recursion into sub-maps. Both
//! extractions are bounded by match caps from [`ParseOptions`].

mod keydef;
mod mapref;
mod scan;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use super::{Boundary, KeyDefinition};
use crate::config::ParseConfig;

/// Default cap on key-definition matches per document.
pub const DEFAULT_MAX_KEY_MATCHES: usize = 10_000;
/// Default cap on sub-map reference matches per document.
pub const DEFAULT_MAX_MAP_REFS: usize = 1_000;

/// Extraction limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_key_matches: usize,
    pub max_map_refs: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_key_matches: DEFAULT_MAX_KEY_MATCHES,
            max_map_refs: DEFAULT_MAX_MAP_REFS,
        }
    }
}

impl From<&ParseConfig> for ParseOptions {
    fn from(config: &ParseConfig) -> Self {
        Self {
            max_key_matches: config.max_key_matches,
            max_map_refs: config.max_map_refs,
        }
    }
}

/// Records extracted from one map document, in document order.
#[derive(Debug, Default)]
pub struct ParsedMap {
    pub keys: Vec<KeyDefinition>,
    pub map_refs: Vec<PathBuf>,
    /// Key-definition extraction stopped at the cap
    pub keys_capped: bool,
    /// Sub-map extraction stopped at the cap
    pub refs_capped: bool,
}

/// Parse one map document.
///
/// `map_path` must be absolute; relative hrefs resolve against its parent.
/// Paths outside `boundary` are dropped and logged.
pub fn parse_map(
    text: &str,
    map_path: &Path,
    options: &ParseOptions,
    boundary: &Boundary,
) -> ParsedMap {
    let stripped = scan::strip_comments(text);
    let text: &str = &stripped;
    let base_dir = map_path.parent().unwrap_or(map_path);
    let mut parsed = ParsedMap::default();
    let mut key_matches = 0usize;
    let mut ref_matches = 0usize;

    for tag in scan::start_tags(text) {
        if parsed.keys_capped && parsed.refs_capped {
            break;
        }

        if !parsed.keys_capped
            && let Some(keys) = tag.attr("keys")
        {
            if key_matches >= options.max_key_matches {
                crate::log!("keys"; "{}: stopped after {} key definitions", map_path.display(), key_matches);
                parsed.keys_capped = true;
            } else {
                key_matches += 1;
                let ctx = keydef::DefContext { text, map_path, base_dir, boundary };
                keydef::extract(&ctx, &tag, keys, &mut parsed.keys);
            }
        }

        if !parsed.refs_capped && mapref::is_map_reference(&tag) {
            if ref_matches >= options.max_map_refs {
                crate::log!("keys"; "{}: stopped after {} map references", map_path.display(), ref_matches);
                parsed.refs_capped = true;
            } else {
                ref_matches += 1;
                if let Some(path) = mapref::resolve(&tag, map_path, base_dir, boundary) {
                    parsed.map_refs.push(path);
                }
            }
        }
    }

    parsed
}
