//! Change intake for cache invalidation.
//!
//! Map file changes arrive in bursts (bulk saves, branch switches). They are
//! collected on a channel, debounced, and handed to the engine as one batch
//! per quiet window.
//!
//! ```text
//! MapWatcher (notify) ─┐
//!                      ├─> channel → Debouncer (pure timing) → invalidation batch
//! notify_change() ─────┘
//! ```

mod debouncer;
mod types;
mod watcher;


use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

pub(crate) use debouncer::Debouncer;
pub use types::{ChangeKind, FileChange};
pub use watcher::MapWatcher;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Run the intake loop until the channel closes or `apply` returns `false`.
///
/// `apply` receives the distinct changed paths of one batch, sorted.
/// Pending changes are flushed when the channel closes.
pub(crate) async fn run_intake<H>(
    mut rx: mpsc::UnboundedReceiver<FileChange>,
    window: Duration,
    mut apply: H,
) where
    H: FnMut(Vec<PathBuf>) -> bool,
{
    let mut debouncer = Debouncer::new(window);

    loop {
        tokio::select! {
            biased;
            change = rx.recv() => match change {
                Some(change) => debouncer.add(change),
                None => {
                    if let Some(batch) = debouncer.take() {
                        apply(into_sorted(batch.into_keys()));
                    }
                    break;
                }
            },
            _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                if let Some(batch) = debouncer.take_if_ready()
                    && !apply(into_sorted(batch.into_keys()))
                {
                    break;
                }
            }
        }
    }
}

fn into_sorted(paths: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<_> = paths.collect();
    paths.sort();
    paths
}
