//! Key space resolution for DITA maps.
//!
//! A key space is the set of key definitions reachable from one root map.
//! Building one walks the map hierarchy breadth-first; the first definition
//! of a key name wins.
//!
//! ```text
//! resolve_key(name, file)
//!   → lookup    (root map for file, cached per directory)
//!   → build     (single-flight BFS over maps, cached per root map)
//!       → parse     (key definitions + sub-map refs, bounded)
//!       → boundary  (drop hrefs outside the workspace)
//!   → KeySpace::get(name)
//! ```
//!
//! # Module Structure
//!
//! - `boundary` - workspace containment check for resolved paths
//! - `parse` - map text → key definitions and sub-map references
//! - `cache` - key-space and root-lookup caches (TTL + LRU)
//! - `build` - BFS traversal and in-flight build deduplication
//! - `lookup` - upward search for the governing root map
//! - `fs` - file access collaborator
//! - `engine` - public façade

pub mod boundary;
pub mod build;
pub mod cache;
pub mod engine;
pub mod fs;
pub mod lookup;
pub mod parse;

mod keyref;
mod space;

pub use boundary::{Boundary, is_within_boundary};
pub use cache::CacheStats;
pub use engine::{Invalidation, KeyEngine};
pub use fs::{FileAccess, TokioFs};
pub use keyref::{KeyRef, ResolvedKeyRef};
pub use space::{KeyDefinition, KeyScope, KeySpace};
