//! href processing utilities.
//!
//! Provides consistent href handling across the parser and the engine:
//! - Remote link detection (http/https)
//! - Fragment splitting
//! - Map file suffix detection

use std::path::Path;

/// File suffixes that identify a map document.
pub const MAP_SUFFIXES: [&str; 2] = ["ditamap", "bookmap"];

/// Check if an href points at a remote http/https resource.
///
/// # Examples
/// ```
/// use ditakeys::utils::path::is_remote_href;
/// assert!(is_remote_href("https://example.com/guide.html"));
/// assert!(is_remote_href("HTTP://example.com"));
/// assert!(!is_remote_href("topics/intro.dita"));
/// ```
#[inline]
pub fn is_remote_href(href: &str) -> bool {
    let lower = href.trim_start().get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Split an href into path and fragment parts
///
/// # Returns
/// A tuple of (path, fragment) where fragment is empty string if no `#` found
///
/// # Examples
/// ```
/// use ditakeys::utils::path::split_path_fragment;
/// assert_eq!(split_path_fragment("info.dita#sec1"), ("info.dita", "sec1"));
/// assert_eq!(split_path_fragment("info.dita"), ("info.dita", ""));
/// ```
#[inline]
pub fn split_path_fragment(href: &str) -> (&str, &str) {
    href.split_once('#').unwrap_or((href, ""))
}

/// Check if a path (or href) names a map document by suffix.
///
/// Comparison is case-insensitive.
#[inline]
pub fn is_map_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MAP_SUFFIXES.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote_href() {
        assert!(is_remote_href("https://example.com"));
        assert!(is_remote_href("http://example.com"));
        assert!(is_remote_href("Https://example.com"));
        assert!(!is_remote_href("./file.dita"));
        assert!(!is_remote_href("#section"));
        assert!(!is_remote_href("http"));
    }

    #[test]
    fn test_split_path_fragment() {
        assert_eq!(split_path_fragment("a.dita#t/p1"), ("a.dita", "t/p1"));
        assert_eq!(split_path_fragment("a.dita"), ("a.dita", ""));
        assert_eq!(split_path_fragment("#section"), ("", "section"));
    }

    #[test]
    fn test_is_map_file() {
        assert!(is_map_file(Path::new("/ws/root.ditamap")));
        assert!(is_map_file(Path::new("book.BOOKMAP")));
        assert!(!is_map_file(Path::new("topic.dita")));
        assert!(!is_map_file(Path::new("ditamap")));
    }
}
