//! Key space construction.
//!
//! - [`traverse`]: breadth-first walk of a map hierarchy
//! - [`SingleFlight`]: at most one in-flight build per root map
//!
//! # Precedence
//!
//! Maps are visited in strict BFS order and the first definition of a key
//! name wins. "First" therefore means closest to the root map, and among
//! maps at the same depth, the one referenced earlier. A deeper map can
//! never override a shallower one.

use std::collections::VecDeque;
use std::future::Future;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::OnceCell;

use super::parse::{ParseOptions, parse_map};
use super::space::KeySpaceBuilder;
use super::{Boundary, FileAccess, KeySpace};

/// Walk the map hierarchy under `root` and collect its key space.
///
/// Never fails: missing and unreadable maps are logged and skipped. A
/// missing root map yields an empty key space.
pub async fn traverse<F: FileAccess>(
    fs: &F,
    root: PathBuf,
    options: &ParseOptions,
    boundary: &Boundary,
) -> KeySpace {
    let mut builder = KeySpaceBuilder::new(root.clone());
    let mut queue = VecDeque::from([root]);

    while let Some(map) = queue.pop_front() {
        if builder.is_visited(&map) {
            continue;
        }
        if !fs.exists(&map).await {
            crate::log!("keys"; "map not found, skipped: {}", map.display());
            continue;
        }
        builder.visit(&map);

        let text = match fs.read_text(&map).await {
            Ok(text) => text,
            Err(e) => {
                crate::log!("keys"; "cannot read {}: {}", map.display(), e);
                continue;
            }
        };

        let parsed = parse_map(&text, &map, options, boundary);
        let mut shadowed = 0usize;
        for def in parsed.keys {
            if !builder.define(def) {
                shadowed += 1;
            }
        }
        if shadowed > 0 {
            crate::debug!("keys"; "{}: {} definitions shadowed by earlier maps", map.display(), shadowed);
        }

        queue.extend(parsed.map_refs);
    }

    builder.finish()
}

/// Deduplicates concurrent work per key.
///
/// The first caller for a key runs the work; callers arriving while it is
/// in flight wait for and share its result. The slot is cleared once the
/// work completes, so the next call starts fresh.
pub struct SingleFlight<K, V> {
    in_flight: DashMap<K, Arc<OnceCell<V>>>,
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            in_flight: DashMap::new(),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `key` unless a run is already in flight.
    ///
    /// Returns the result and whether this call joined an existing run.
    pub async fn run<W, Fut>(&self, key: K, work: W) -> (V, bool)
    where
        W: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        // Check-and-insert under the shard lock; the guard ends with the block.
        let (cell, joined) = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(e) => (Arc::clone(e.get()), true),
            Entry::Vacant(e) => {
                let cell = Arc::new(OnceCell::new());
                e.insert(Arc::clone(&cell));
                (cell, false)
            }
        };

        let value = cell.get_or_init(work).await.clone();
        self.in_flight
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &cell));
        (value, joined)
    }

    /// Number of keys with work in flight.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::fs::memory::MemoryFs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn ws() -> Boundary {
        Boundary::new([PathBuf::from("/ws")])
    }

    async fn build(fs: &MemoryFs, root: &str) -> KeySpace {
        traverse(fs, PathBuf::from(root), &ParseOptions::default(), &ws()).await
    }

    #[tokio::test]
    async fn test_bfs_precedence_prefers_shallow_map() {
        let fs = MemoryFs::new();
        // root → a → deep (defines k first in DFS order), root → b (defines k)
        fs.insert(
            "/ws/root.ditamap",
            r#"<map><mapref href="a.ditamap"/><mapref href="b.ditamap"/></map>"#,
        );
        fs.insert("/ws/a.ditamap", r#"<map><mapref href="deep.ditamap"/></map>"#);
        fs.insert("/ws/deep.ditamap", r#"<map><keydef keys="k" href="deep.dita"/></map>"#);
        fs.insert("/ws/b.ditamap", r#"<map><keydef keys="k" href="b.dita"/></map>"#);

        let space = build(&fs, "/ws/root.ditamap").await;

        let k = space.get("k").unwrap();
        assert_eq!(k.source_map, PathBuf::from("/ws/b.ditamap"));
        assert_eq!(
            space.map_hierarchy(),
            &[
                PathBuf::from("/ws/root.ditamap"),
                PathBuf::from("/ws/a.ditamap"),
                PathBuf::from("/ws/b.ditamap"),
                PathBuf::from("/ws/deep.ditamap"),
            ]
        );
    }

    #[tokio::test]
    async fn test_same_depth_earlier_reference_wins() {
        let fs = MemoryFs::new();
        fs.insert(
            "/ws/root.ditamap",
            r#"<map><mapref href="m1.ditamap"/><mapref href="m2.ditamap"/></map>"#,
        );
        fs.insert("/ws/m1.ditamap", r#"<map><keydef keys="k" href="one.dita"/></map>"#);
        fs.insert("/ws/m2.ditamap", r#"<map><keydef keys="k" href="two.dita"/></map>"#);

        let space = build(&fs, "/ws/root.ditamap").await;
        let k = space.get("k").unwrap();
        assert_eq!(k.source_map, PathBuf::from("/ws/m1.ditamap"));
        assert_eq!(k.target_file, Some(PathBuf::from("/ws/one.dita")));
    }

    #[tokio::test]
    async fn test_root_definition_beats_submap() {
        let fs = MemoryFs::new();
        fs.insert(
            "/ws/root.ditamap",
            r#"<map><mapref href="sub.ditamap"/><keydef keys="k" href="root.dita"/></map>"#,
        );
        fs.insert("/ws/sub.ditamap", r#"<map><keydef keys="k" href="sub.dita"/></map>"#);

        let space = build(&fs, "/ws/root.ditamap").await;
        assert_eq!(space.get("k").unwrap().source_map, PathBuf::from("/ws/root.ditamap"));
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let fs = MemoryFs::new();
        fs.insert("/ws/a.ditamap", r#"<map><mapref href="b.ditamap"/><keydef keys="a"/></map>"#);
        fs.insert("/ws/b.ditamap", r#"<map><mapref href="a.ditamap"/><keydef keys="b"/></map>"#);

        let space = build(&fs, "/ws/a.ditamap").await;
        assert_eq!(
            space.map_hierarchy(),
            &[PathBuf::from("/ws/a.ditamap"), PathBuf::from("/ws/b.ditamap")]
        );
        assert_eq!(space.len(), 2);
        assert_eq!(fs.reads(), 2);
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let fs = MemoryFs::new();
        let space = build(&fs, "/ws/nope.ditamap").await;
        assert!(space.is_empty());
        assert!(space.map_hierarchy().is_empty());
        assert_eq!(space.root_map(), Path::new("/ws/nope.ditamap"));
    }

    #[tokio::test]
    async fn test_missing_submap_skipped() {
        let fs = MemoryFs::new();
        fs.insert(
            "/ws/root.ditamap",
            r#"<map><mapref href="gone.ditamap"/><mapref href="ok.ditamap"/></map>"#,
        );
        fs.insert("/ws/ok.ditamap", r#"<map><keydef keys="ok"/></map>"#);

        let space = build(&fs, "/ws/root.ditamap").await;
        assert!(space.contains_key("ok"));
        assert!(!space.contains_map(Path::new("/ws/gone.ditamap")));
    }

    #[tokio::test]
    async fn test_every_key_source_is_in_hierarchy() {
        let fs = MemoryFs::new();
        fs.insert(
            "/ws/root.ditamap",
            r#"<map><keydef keys="x y"/><mapref href="s/sub.ditamap"/></map>"#,
        );
        fs.insert("/ws/s/sub.ditamap", r#"<map><keydef keys="z" href="../t.dita"/></map>"#);

        let space = build(&fs, "/ws/root.ditamap").await;
        assert_eq!(space.len(), 3);
        for def in space.iter_sorted() {
            assert!(space.contains_map(&def.source_map));
        }
        assert_eq!(space.get("z").unwrap().target_file, Some(PathBuf::from("/ws/t.dita")));
    }

    #[tokio::test]
    async fn test_single_flight_shares_result() {
        let flight: Arc<SingleFlight<String, usize>> = Arc::new(SingleFlight::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let task = |flight: Arc<SingleFlight<String, usize>>, runs: Arc<AtomicUsize>| async move {
            flight
                .run("k".to_string(), || async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    runs.fetch_add(1, Ordering::SeqCst) + 1
                })
                .await
        };

        let (a, b) = tokio::join!(
            task(Arc::clone(&flight), Arc::clone(&runs)),
            task(Arc::clone(&flight), Arc::clone(&runs))
        );

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(a.0, b.0);
        assert!(a.1 != b.1, "exactly one caller joins");
        assert!(flight.is_empty());
    }

    #[tokio::test]
    async fn test_single_flight_runs_again_after_completion() {
        let flight: SingleFlight<&'static str, u32> = SingleFlight::new();
        let (first, _) = flight.run("k", || async { 1 }).await;
        let (second, joined) = flight.run("k", || async { 2 }).await;
        assert_eq!((first, second), (1, 2));
        assert!(!joined);
    }
}
