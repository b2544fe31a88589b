//! Key space data model.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Visibility of a key target, from the `scope` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScope {
    Local,
    Peer,
    External,
}

impl KeyScope {
    /// Parse an attribute value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "local" => Some(Self::Local),
            "peer" => Some(Self::Peer),
            "external" => Some(Self::External),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Peer => "peer",
            Self::External => "external",
        }
    }
}

/// One resolved meaning of a key name.
///
/// Immutable once built; key spaces hand out shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDefinition {
    pub key_name: String,
    /// Resolved location of the referenced content
    pub target_file: Option<PathBuf>,
    /// Anchor taken from the `#fragment` of the href
    pub element_id: Option<String>,
    /// Literal text carried by the definition (keyword, linktext, navtitle)
    pub inline_content: Option<String>,
    /// Map document that defines this key
    pub source_map: PathBuf,
    pub scope: Option<KeyScope>,
    pub processing_role: Option<String>,
}

impl KeyDefinition {
    /// A definition with neither a target nor inline content.
    pub fn is_empty(&self) -> bool {
        self.target_file.is_none() && self.inline_content.is_none()
    }
}

/// Keys reachable from one root map at one point in time.
///
/// # Invariants
/// - `map_hierarchy` has no duplicates and is in BFS visitation order
/// - every key's `source_map` appears in `map_hierarchy`
/// - never mutated after construction; a rebuild produces a new value
#[derive(Debug, Serialize)]
pub struct KeySpace {
    root_map: PathBuf,
    keys: FxHashMap<String, Arc<KeyDefinition>>,
    map_hierarchy: Vec<PathBuf>,
    #[serde(skip)]
    build_time: Instant,
}

impl KeySpace {
    /// Identity of this key space.
    #[inline]
    pub fn root_map(&self) -> &Path {
        &self.root_map
    }

    /// Look up a key by name (case-sensitive).
    #[inline]
    pub fn get(&self, key_name: &str) -> Option<&Arc<KeyDefinition>> {
        self.keys.get(key_name)
    }

    #[inline]
    pub fn contains_key(&self, key_name: &str) -> bool {
        self.keys.contains_key(key_name)
    }

    /// Maps in BFS visitation order.
    #[inline]
    pub fn map_hierarchy(&self) -> &[PathBuf] {
        &self.map_hierarchy
    }

    /// Whether `map` was visited while building this key space.
    pub fn contains_map(&self, map: &Path) -> bool {
        self.map_hierarchy.iter().any(|m| m == map)
    }

    #[inline]
    pub fn build_time(&self) -> Instant {
        self.build_time
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Definitions sorted by key name.
    pub fn iter_sorted(&self) -> Vec<&Arc<KeyDefinition>> {
        let mut defs: Vec<_> = self.keys.values().collect();
        defs.sort_unstable_by(|a, b| a.key_name.cmp(&b.key_name));
        defs
    }
}

/// Accumulates a key space during traversal.
pub(crate) struct KeySpaceBuilder {
    root_map: PathBuf,
    keys: FxHashMap<String, Arc<KeyDefinition>>,
    map_hierarchy: Vec<PathBuf>,
    visited: FxHashSet<PathBuf>,
}

impl KeySpaceBuilder {
    pub(crate) fn new(root_map: PathBuf) -> Self {
        Self {
            root_map,
            keys: FxHashMap::default(),
            map_hierarchy: Vec::new(),
            visited: FxHashSet::default(),
        }
    }

    pub(crate) fn is_visited(&self, map: &Path) -> bool {
        self.visited.contains(map)
    }

    /// Record a map visit. Returns `false` if it was already visited.
    pub(crate) fn visit(&mut self, map: &Path) -> bool {
        if !self.visited.insert(map.to_path_buf()) {
            return false;
        }
        self.map_hierarchy.push(map.to_path_buf());
        true
    }

    /// Insert a definition unless its key name is already taken.
    ///
    /// Returns `true` if the definition was kept.
    pub(crate) fn define(&mut self, def: KeyDefinition) -> bool {
        debug_assert!(self.visited.contains(&def.source_map));
        if self.keys.contains_key(&def.key_name) {
            return false;
        }
        self.keys.insert(def.key_name.clone(), Arc::new(def));
        true
    }

    pub(crate) fn finish(self) -> KeySpace {
        KeySpace {
            root_map: self.root_map,
            keys: self.keys,
            map_hierarchy: self.map_hierarchy,
            build_time: Instant::now(),
        }
    }
}
