//! Key definition extraction.

use std::path::{Path, PathBuf};

use super::mapref::MAP_CONTAINERS;
use super::scan::{self, StartTag};
use crate::keyspace::{Boundary, KeyDefinition, KeyScope};
use crate::utils::path::{is_remote_href, resolve_path, split_path_fragment};

/// Children consulted for inline content, in priority order.
const INLINE_SOURCES: [&str; 3] = ["keyword", "linktext", "navtitle"];

pub(super) struct DefContext<'a> {
    pub text: &'a str,
    pub map_path: &'a Path,
    pub base_dir: &'a Path,
    pub boundary: &'a Boundary,
}

/// Push one definition per token of `keys`, all sharing the element's
/// target and attributes.
pub(super) fn extract(ctx: &DefContext<'_>, tag: &StartTag<'_>, keys: &str, out: &mut Vec<KeyDefinition>) {
    let names: Vec<&str> = keys.split_whitespace().collect();
    if names.is_empty() {
        return;
    }

    let (target_file, element_id) = match tag.attr("href") {
        Some(href) => resolve_target(ctx, href),
        None => (None, None),
    };

    let inline_content = if target_file.is_none() && !tag.self_closing {
        inline_content(ctx.text, tag)
    } else {
        None
    };

    let scope = tag.attr("scope").and_then(KeyScope::parse);
    let processing_role = tag.attr("processing-role").map(str::to_string);

    for name in names {
        out.push(KeyDefinition {
            key_name: name.to_string(),
            target_file: target_file.clone(),
            element_id: element_id.clone(),
            inline_content: inline_content.clone(),
            source_map: ctx.map_path.to_path_buf(),
            scope,
            processing_role: processing_role.clone(),
        });
    }
}

/// Resolve an href to (target file, element id).
///
/// Remote and out-of-boundary hrefs produce no target.
fn resolve_target(ctx: &DefContext<'_>, href: &str) -> (Option<PathBuf>, Option<String>) {
    let href = href.trim();
    if href.is_empty() {
        return (None, None);
    }
    if is_remote_href(href) {
        crate::debug!("keys"; "remote href not resolved: {}", href);
        return (None, None);
    }

    let (path, fragment) = split_path_fragment(href);
    if path.is_empty() {
        return (None, None);
    }

    let target = resolve_path(Path::new(path), ctx.base_dir);
    if !ctx.boundary.contains(&target) {
        crate::log!("keys"; "{}: href outside workspace dropped: {}", ctx.map_path.display(), href);
        return (None, None);
    }

    let element_id = (!fragment.is_empty()).then(|| fragment.to_string());
    (Some(target), element_id)
}

/// Literal text from the element's own `<topicmeta>`.
///
/// A `<topicmeta>` that belongs to a nested map element is not consulted.
fn inline_content(text: &str, tag: &StartTag<'_>) -> Option<String> {
    let body = scan::element_body(text, tag.name, tag.end)?;

    let meta = scan::start_tags(body)
        .take_while(|t| !MAP_CONTAINERS.contains(&t.name) && t.name != "keydef")
        .find(|t| t.name == "topicmeta" && !t.self_closing)?;
    let meta_body = scan::element_body(body, "topicmeta", meta.end)?;

    INLINE_SOURCES.iter().find_map(|source| {
        scan::start_tags(meta_body)
            .filter(|t| t.name == *source && !t.self_closing)
            .find_map(|t| scan::element_body(meta_body, source, t.end).and_then(scan::text_content))
    })
}
