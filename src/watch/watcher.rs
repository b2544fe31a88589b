//! File system watcher feeding the intake channel.

use std::path::PathBuf;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::types::{ChangeKind, FileChange};
use crate::utils::path::is_map_file;

/// Watches boundary roots and forwards map file changes.
///
/// Dropping the watcher stops the notifications.
pub struct MapWatcher {
    _watcher: RecommendedWatcher,
}

impl MapWatcher {
    /// Start watching `roots` recursively. Missing roots are skipped.
    pub fn new(roots: &[PathBuf], tx: mpsc::UnboundedSender<FileChange>) -> notify::Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for change in changes_from_event(&event) {
                        // Receiver gone means the engine was disposed.
                        if tx.send(change).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => crate::log!("watch"; "notify error: {}", e),
            }
        })?;

        for root in roots {
            if root.is_dir() {
                watcher.watch(root, RecursiveMode::Recursive)?;
                crate::debug!("watch"; "watching {}", root.display());
            } else {
                crate::log!("watch"; "not a directory, skipped: {}", root.display());
            }
        }

        Ok(Self { _watcher: watcher })
    }
}

/// Map file changes carried by a notify event.
///
/// Metadata-only modifications are ignored.
pub(super) fn changes_from_event(event: &notify::Event) -> Vec<FileChange> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Removed,
        EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .filter(|p| is_map_file(p))
        .map(|p| FileChange::new(kind, p.clone()))
        .collect()
}
