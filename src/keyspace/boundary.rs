//! Workspace containment for resolved paths.
//!
//! A path is accepted only if it lies strictly inside one of the boundary
//! roots. An empty boundary accepts everything (single-file mode).

use std::path::{Path, PathBuf};

use crate::utils::path::normalize_path;

/// Check whether `path` lies strictly inside one of `roots`.
///
/// Comparison is component-wise on normalized paths, so `/ws-extra` is not
/// inside `/ws`, and `/ws` itself is not inside `/ws`.
pub fn is_within_boundary(path: &Path, roots: &[PathBuf]) -> bool {
    if roots.is_empty() {
        return true;
    }
    let path = normalize_path(path);
    roots.iter().any(|root| {
        let root = normalize_path(root);
        path != root && path.starts_with(&root)
    })
}

/// Normalized boundary roots for one workspace.
#[derive(Debug, Clone, Default)]
pub struct Boundary {
    roots: Vec<PathBuf>,
}

impl Boundary {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut roots: Vec<PathBuf> = roots.into_iter().map(|r| normalize_path(&r)).collect();
        roots.sort();
        roots.dedup();
        Self { roots }
    }

    /// No roots: every path is accepted.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_unrestricted(&self) -> bool {
        self.roots.is_empty()
    }

    #[inline]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// See [`is_within_boundary`].
    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        is_within_boundary(path, &self.roots)
    }

    /// The boundary root enclosing `path` (or equal to it), deepest first.
    ///
    /// Used to stop upward directory searches.
    pub fn root_for(&self, path: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }
}
