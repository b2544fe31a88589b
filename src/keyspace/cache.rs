//! Key-space and root-lookup caches.
//!
//! Both caches share one policy: entries older than the TTL are dead, and
//! inserting into a full cache evicts the oldest entry. Callers pass `now`
//! explicitly so expiry is deterministic under test.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::KeySpace;

/// Default key-space TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
/// Default key-space capacity.
pub const DEFAULT_CAPACITY: usize = 10;
/// Default root-lookup TTL.
pub const DEFAULT_ROOT_LOOKUP_TTL: Duration = Duration::from_secs(60);
/// Default root-lookup capacity.
pub const DEFAULT_ROOT_LOOKUP_CAPACITY: usize = 256;

#[inline]
fn is_expired(stamp: Instant, ttl: Duration, now: Instant) -> bool {
    now.saturating_duration_since(stamp) > ttl
}

/// Removals performed by a cache operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub expired: usize,
    pub evicted: usize,
}

// ============================================================================
// Key-space cache
// ============================================================================

/// Root map path → key space, bounded by TTL and capacity.
#[derive(Debug)]
pub struct KeySpaceCache {
    entries: FxHashMap<PathBuf, Arc<KeySpace>>,
    ttl: Duration,
    capacity: usize,
}

impl KeySpaceCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Live entry for `root`. An expired entry is removed and reported via
    /// the `bool`.
    pub fn get(&mut self, root: &Path, now: Instant) -> (Option<Arc<KeySpace>>, bool) {
        let Some(space) = self.entries.get(root) else {
            return (None, false);
        };
        if is_expired(space.build_time(), self.ttl, now) {
            self.entries.remove(root);
            return (None, true);
        }
        (Some(Arc::clone(space)), false)
    }

    /// Insert after sweeping expired entries and evicting the oldest ones
    /// until there is room.
    pub fn insert(&mut self, space: Arc<KeySpace>, now: Instant) -> Removed {
        let root = space.root_map().to_path_buf();
        self.entries.remove(&root);

        let expired = self.sweep(now);
        let mut evicted = 0;
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, s)| s.build_time())
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            crate::debug!("cache"; "evict {}", oldest.display());
            self.entries.remove(&oldest);
            evicted += 1;
        }

        self.entries.insert(root, space);
        Removed { expired, evicted }
    }

    /// Remove expired entries. Returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, s| !is_expired(s.build_time(), ttl, now));
        before - self.entries.len()
    }

    /// Remove every key space whose hierarchy contains `map`.
    ///
    /// Returns the root maps of the removed key spaces.
    pub fn invalidate_map(&mut self, map: &Path) -> Vec<PathBuf> {
        let stale: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|(_, s)| s.contains_map(map))
            .map(|(k, _)| k.clone())
            .collect();
        for root in &stale {
            self.entries.remove(root);
        }
        stale
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

// ============================================================================
// Root-lookup cache
// ============================================================================

#[derive(Debug, Clone)]
struct RootEntry {
    root: Option<PathBuf>,
    cached_at: Instant,
}

/// Directory → governing root map (or none found), short-lived.
#[derive(Debug)]
pub struct RootMapCache {
    entries: FxHashMap<PathBuf, RootEntry>,
    ttl: Duration,
    capacity: usize,
}

impl RootMapCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// `Some(result)` on a live hit, where `result` is `None` for
    /// "no root map found".
    pub fn get(&mut self, dir: &Path, now: Instant) -> Option<Option<PathBuf>> {
        let entry = self.entries.get(dir)?;
        if is_expired(entry.cached_at, self.ttl, now) {
            self.entries.remove(dir);
            return None;
        }
        Some(entry.root.clone())
    }

    pub fn insert(&mut self, dir: PathBuf, root: Option<PathBuf>, now: Instant) -> Removed {
        self.entries.remove(&dir);
        let expired = self.sweep(now);
        let mut evicted = 0;
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.cached_at)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
            evicted += 1;
        }
        self.entries.insert(dir, RootEntry { root, cached_at: now });
        Removed { expired, evicted }
    }

    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| !is_expired(e.cached_at, ttl, now));
        before - self.entries.len()
    }

    /// Forget lookups that a change to map file `changed` may affect: its
    /// directory, every directory below it, and any lookup that resolved
    /// to `changed` itself.
    pub fn invalidate_file(&mut self, changed: &Path) -> usize {
        let Some(dir) = changed.parent() else {
            return 0;
        };
        let before = self.entries.len();
        self.entries
            .retain(|key, e| !key.starts_with(dir) && e.root.as_deref() != Some(changed));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Snapshot of cache sizes and counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub key_spaces: usize,
    pub root_lookups: usize,
    pub hits: u64,
    pub misses: u64,
    /// Traversals actually run
    pub builds: u64,
    /// Requests that joined an in-flight build
    pub coalesced: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
}

/// Lock-free counters behind [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub builds: AtomicU64,
    pub coalesced: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
    pub invalidations: AtomicU64,
}

impl Counters {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64, n: usize) {
        if n > 0 {
            counter.fetch_add(n as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_removed(&self, removed: Removed) {
        Self::bump(&self.expirations, removed.expired);
        Self::bump(&self.evictions, removed.evicted);
    }

    pub(crate) fn snapshot(&self, key_spaces: usize, root_lookups: usize) -> CacheStats {
        CacheStats {
            key_spaces,
            root_lookups,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}
