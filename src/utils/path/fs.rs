//! Path normalization utilities.
//!
//! Every path that participates in key space identity goes through
//! [`normalize_path`], so the parser (which never touches the disk) and the
//! engine (which does) agree on what a path looks like.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Relative paths are joined with the current directory, then `.` and `..`
/// components are folded lexically. Symlinks are not resolved, so the result
/// is stable whether or not the file exists.
///
/// # Example
/// ```
/// use std::path::Path;
/// use ditakeys::utils::path::normalize_path;
/// assert_eq!(normalize_path(Path::new("/ws/maps/../root.ditamap")), Path::new("/ws/root.ditamap"));
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean(path)
    } else {
        std::env::current_dir().map_or_else(|_| clean(path), |cwd| clean(&cwd.join(path)))
    }
}

/// Resolve `path` against `base_dir` unless it is already absolute.
///
/// Always returns a normalized path when `base_dir` is absolute.
#[inline]
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return clean(path);
    }
    normalize_path(&base_dir.join(path))
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// `..` at the root stays at the root.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                );
                if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
