use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::{ChangeKind, FileChange};
use crate::utils::path::{is_map_file, normalize_path};

/// Pure debouncer: only handles timing and event deduplication.
/// No business logic, no global state access.
pub(crate) struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    window: Duration,
}

impl Debouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            window,
        }
    }

    /// Add a change, applying dedup rules:
    /// - Remove + Create/Modify → Create/Modify (file was restored)
    /// - Modify + Remove → Remove (file was deleted)
    /// - Create + Remove → Remove (may have been cached while it existed)
    /// - Same type events: first event wins
    ///
    /// Non-map and editor temp files are ignored.
    pub(crate) fn add(&mut self, change: FileChange) {
        let FileChange { kind, path } = change;
        if !is_map_file(&path) || is_temp_file(&path) {
            return;
        }
        let path = normalize_path(&path);

        if let Some(&existing) = self.changes.get(&path) {
            match (existing, kind) {
                (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                    crate::debug!("watch"; "restore {}->{}: {}", existing.label(), kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                (ChangeKind::Created | ChangeKind::Modified, ChangeKind::Removed) => {
                    crate::debug!("watch"; "upgrade {}->removed: {}", existing.label(), path.display());
                    self.changes.insert(path, ChangeKind::Removed);
                }
                _ => return,
            }
            self.last_event = Some(Instant::now());
            return;
        }

        crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
        self.changes.insert(path, kind);
        self.last_event = Some(Instant::now());
    }

    /// Take the batch once the window has elapsed since the last event.
    pub(crate) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }
        self.take()
    }

    /// Take the batch regardless of timing (used on shutdown).
    pub(crate) fn take(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;
        (!changes.is_empty()).then_some(changes)
    }

    pub(crate) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        last_event.elapsed() >= self.window && !self.changes.is_empty()
    }

    /// Precise sleep duration until next possible ready time.
    pub(crate) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with('~') || name.starts_with('.') || name.starts_with('#')
}
