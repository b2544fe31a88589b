//! Upward search for the root map governing a file.

use std::path::{Path, PathBuf};

use super::{Boundary, FileAccess};
use crate::utils::path::is_map_file;

/// Conventional root map names, most preferred first.
pub const ROOT_MAP_NAMES: [&str; 6] = [
    "root.ditamap",
    "main.ditamap",
    "master.ditamap",
    "index.ditamap",
    "book.bookmap",
    "main.bookmap",
];

/// Choose the root map among the file names of one directory.
///
/// Conventional names win in [`ROOT_MAP_NAMES`] order; otherwise the
/// alphabetically first map file.
pub fn pick_root_map(names: &[String]) -> Option<&str> {
    let mut maps: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| is_map_file(Path::new(n)))
        .collect();
    if maps.is_empty() {
        return None;
    }

    for preferred in ROOT_MAP_NAMES {
        if let Some(name) = maps.iter().find(|n| n.eq_ignore_ascii_case(preferred)).copied() {
            return Some(name);
        }
    }

    maps.sort_unstable();
    maps.first().copied()
}

/// Search from `start_dir` upward for a root map.
///
/// The search never leaves the boundary root enclosing `start_dir`; a
/// directory outside every boundary root finds nothing. An unrestricted
/// boundary searches up to the file system root.
pub async fn find_root_map<F: FileAccess>(
    fs: &F,
    start_dir: &Path,
    boundary: &Boundary,
) -> Option<PathBuf> {
    let stop = if boundary.is_unrestricted() {
        None
    } else {
        Some(boundary.root_for(start_dir)?.to_path_buf())
    };

    let mut dir = start_dir;
    loop {
        match fs.list_dir(dir).await {
            Ok(names) => {
                if let Some(name) = pick_root_map(&names) {
                    return Some(dir.join(name));
                }
            }
            Err(e) => crate::debug!("keys"; "cannot list {}: {}", dir.display(), e),
        }

        if stop.as_deref() == Some(dir) {
            return None;
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::fs::memory::MemoryFs;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pick_prefers_conventional_names() {
        let list = names(&["zeta.ditamap", "main.ditamap", "root.ditamap", "a.dita"]);
        assert_eq!(pick_root_map(&list), Some("root.ditamap"));

        let list = names(&["zeta.ditamap", "Main.ditamap"]);
        assert_eq!(pick_root_map(&list), Some("Main.ditamap"));
    }

    #[test]
    fn test_pick_alphabetical_fallback() {
        let list = names(&["guide.bookmap", "alpha.ditamap", "topic.dita"]);
        assert_eq!(pick_root_map(&list), Some("alpha.ditamap"));
        assert_eq!(pick_root_map(&names(&["topic.dita"])), None);
    }

    #[tokio::test]
    async fn test_find_walks_upward() {
        let fs = MemoryFs::new();
        fs.insert("/ws/root.ditamap", "<map/>");
        fs.insert("/ws/topics/deep/t.dita", "<topic/>");
        let boundary = Boundary::new([PathBuf::from("/ws")]);

        let found = find_root_map(&fs, Path::new("/ws/topics/deep"), &boundary).await;
        assert_eq!(found, Some(PathBuf::from("/ws/root.ditamap")));
    }

    #[tokio::test]
    async fn test_find_nearest_directory_wins() {
        let fs = MemoryFs::new();
        fs.insert("/ws/root.ditamap", "<map/>");
        fs.insert("/ws/sub/sub.ditamap", "<map/>");
        let boundary = Boundary::new([PathBuf::from("/ws")]);

        let found = find_root_map(&fs, Path::new("/ws/sub"), &boundary).await;
        assert_eq!(found, Some(PathBuf::from("/ws/sub/sub.ditamap")));
    }

    #[tokio::test]
    async fn test_find_stops_at_boundary() {
        let fs = MemoryFs::new();
        fs.insert("/root.ditamap", "<map/>");
        fs.insert("/ws/topics/t.dita", "<topic/>");
        let boundary = Boundary::new([PathBuf::from("/ws")]);

        assert_eq!(find_root_map(&fs, Path::new("/ws/topics"), &boundary).await, None);
        assert_eq!(find_root_map(&fs, Path::new("/other"), &boundary).await, None);
    }

    #[tokio::test]
    async fn test_find_unrestricted_reaches_fs_root() {
        let fs = MemoryFs::new();
        fs.insert("/root.ditamap", "<map/>");

        let found = find_root_map(&fs, Path::new("/a/b"), &Boundary::unrestricted()).await;
        assert_eq!(found, Some(PathBuf::from("/root.ditamap")));
    }
}
