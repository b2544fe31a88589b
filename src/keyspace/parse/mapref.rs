//! Sub-map reference extraction.

use std::path::{Path, PathBuf};

use super::scan::StartTag;
use crate::keyspace::Boundary;
use crate::utils::path::{is_map_file, is_remote_href, resolve_path, split_path_fragment};

/// Map-nesting elements (map and bookmap vocabularies).
pub(super) const MAP_CONTAINERS: [&str; 12] = [
    "mapref",
    "topicref",
    "topicgroup",
    "topichead",
    "chapter",
    "part",
    "appendix",
    "appendices",
    "frontmatter",
    "backmatter",
    "glossarylist",
    "notices",
];

/// A map-nesting element whose href names a local map file.
pub(super) fn is_map_reference(tag: &StartTag<'_>) -> bool {
    if !MAP_CONTAINERS.contains(&tag.name) {
        return false;
    }
    let Some(href) = tag.attr("href") else {
        return false;
    };
    let (path, _) = split_path_fragment(href.trim());
    !is_remote_href(path) && is_map_file(Path::new(path))
}

/// Resolve a map reference to an absolute path, or `None` if it falls
/// outside the boundary.
pub(super) fn resolve(
    tag: &StartTag<'_>,
    map_path: &Path,
    base_dir: &Path,
    boundary: &Boundary,
) -> Option<PathBuf> {
    let href = tag.attr("href")?.trim();
    let (path, _) = split_path_fragment(href);
    let resolved = resolve_path(Path::new(path), base_dir);
    if !boundary.contains(&resolved) {
        crate::log!("keys"; "{}: map reference outside workspace dropped: {}", map_path.display(), href);
        return None;
    }
    Some(resolved)
}
