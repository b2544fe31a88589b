//! Key Space Resolution Engine.
//!
//! One engine per workspace. It owns the caches, the in-flight build
//! table and the change intake; nothing here is process-global.
//!
//! ```text
//! resolve_key ─> find_root_map ─> build_key_space ─> KeySpace::get
//!                  (dir cache)      (cache → single-flight → traverse)
//!
//! notify_change ─> intake (debounce) ─> invalidate_paths ─> broadcast
//! ```


use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::build::{SingleFlight, traverse};
use super::cache::{CacheStats, Counters, KeySpaceCache, RootMapCache};
use super::lookup;
use super::parse::ParseOptions;
use super::{Boundary, FileAccess, KeyDefinition, KeyRef, KeySpace, ResolvedKeyRef, TokioFs};
use crate::config::{ConfigError, EngineConfig};
use crate::utils::path::normalize_path;
use crate::watch::{self, FileChange};

/// Buffered invalidation notices per subscriber.
const EVENT_BUFFER: usize = 64;

/// One applied invalidation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// Normalized paths reported changed
    pub changed: Vec<PathBuf>,
    /// Root maps whose cached key spaces were dropped
    pub evicted_roots: Vec<PathBuf>,
}

/// Public façade over key space building and resolution.
///
/// Cheap to clone; clones share state.
pub struct KeyEngine<F: FileAccess = TokioFs> {
    inner: Arc<EngineInner<F>>,
}

impl<F: FileAccess> Clone for KeyEngine<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct EngineInner<F> {
    fs: F,
    config: EngineConfig,
    boundary: Boundary,
    parse: ParseOptions,
    /// Lock order: `key_spaces` before `root_lookups`.
    key_spaces: Mutex<KeySpaceCache>,
    root_lookups: Mutex<RootMapCache>,
    flights: SingleFlight<PathBuf, Arc<KeySpace>>,
    /// Bumped by every invalidation while `key_spaces` is held; builds that
    /// straddle a bump are not cached
    generation: AtomicU64,
    counters: Counters,
    changes_tx: mpsc::UnboundedSender<FileChange>,
    changes_rx: Mutex<Option<mpsc::UnboundedReceiver<FileChange>>>,
    events: broadcast::Sender<Invalidation>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl KeyEngine<TokioFs> {
    /// Engine over the real file system.
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::new(config, TokioFs)
    }
}

impl<F: FileAccess> KeyEngine<F> {
    /// Create an engine. Fails only on invalid configuration.
    ///
    /// Background work (periodic sweep, change intake) starts with
    /// [`start`](Self::start); changes sent before that are buffered.
    pub fn new(config: EngineConfig, fs: F) -> Result<Self, ConfigError> {
        config.validate()?;

        let boundary = Boundary::new(config.boundary_roots());
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let inner = EngineInner {
            fs,
            boundary,
            parse: ParseOptions::from(&config.parse),
            key_spaces: Mutex::new(KeySpaceCache::new(config.cache.ttl(), config.cache.capacity)),
            root_lookups: Mutex::new(RootMapCache::new(
                config.cache.root_lookup_ttl(),
                config.cache.root_lookup_capacity,
            )),
            flights: SingleFlight::new(),
            generation: AtomicU64::new(0),
            counters: Counters::default(),
            changes_tx,
            changes_rx: Mutex::new(Some(changes_rx)),
            events,
            tasks: Mutex::new(Vec::new()),
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Spawn the periodic sweep and the change intake on the current tokio
    /// runtime. Calling it again is a no-op.
    pub fn start(&self) {
        let Some(rx) = self.inner.changes_rx.lock().take() else {
            return;
        };

        let weak = Arc::downgrade(&self.inner);
        let window = self.inner.config.watch.debounce();
        let intake = tokio::spawn(watch::run_intake(rx, window, move |paths| {
            match weak.upgrade() {
                Some(inner) => {
                    inner.invalidate(paths);
                    true
                }
                None => false,
            }
        }));

        let sweeper = tokio::spawn(run_sweeper(
            Arc::downgrade(&self.inner),
            self.inner.config.cache.sweep_interval(),
        ));

        self.inner.tasks.lock().extend([intake, sweeper]);
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// Resolve `key_name` for a file: find its root map, build or fetch the
    /// key space, look the key up.
    ///
    /// `None` when no root map governs the file or the key is undefined.
    pub async fn resolve_key(&self, key_name: &str, context_file: &Path) -> Option<Arc<KeyDefinition>> {
        let root = self.find_root_map(context_file).await?;
        let space = self.build_key_space(&root).await;
        let found = space.get(key_name).cloned();
        if found.is_none() {
            crate::debug!("keys"; "key `{}` not defined in {}", key_name, root.display());
        }
        found
    }

    /// Resolve a `keyref`/`conkeyref` value (`key` or `key/element`).
    ///
    /// The reference's element overrides the definition's fragment.
    pub async fn resolve_keyref(&self, reference: &str, context_file: &Path) -> Option<ResolvedKeyRef> {
        let keyref = KeyRef::parse(reference)?;
        let definition = self.resolve_key(keyref.key, context_file).await?;
        let element_id = keyref
            .element_id
            .map(str::to_string)
            .or_else(|| definition.element_id.clone());
        Some(ResolvedKeyRef {
            definition,
            element_id,
        })
    }

    /// Build the key space for `root_map`, or return the cached one.
    ///
    /// Concurrent calls for the same root map share one traversal.
    pub async fn build_key_space(&self, root_map: &Path) -> Arc<KeySpace> {
        let root = normalize_path(root_map);
        let inner = &self.inner;

        if let Some(space) = inner.cached(&root, true) {
            return space;
        }

        let (space, joined) = inner
            .flights
            .run(root.clone(), || async {
                // A build that finished between our miss and joining the
                // flight table has already filled the cache.
                match inner.cached(&root, false) {
                    Some(space) => space,
                    None => inner.build(&root).await,
                }
            })
            .await;

        if joined {
            Counters::bump(&inner.counters.coalesced, 1);
        }
        space
    }

    /// The root map governing `context_file`, using the directory cache.
    pub async fn find_root_map(&self, context_file: &Path) -> Option<PathBuf> {
        let file = normalize_path(context_file);
        let dir = file.parent()?.to_path_buf();
        let inner = &self.inner;

        if let Some(hit) = inner.root_lookups.lock().get(&dir, Instant::now()) {
            return hit;
        }

        let found = lookup::find_root_map(&inner.fs, &dir, &inner.boundary).await;
        match &found {
            Some(root) => crate::debug!("keys"; "root map for {}: {}", dir.display(), root.display()),
            None => crate::debug!("keys"; "no root map above {}", dir.display()),
        }

        let removed = inner
            .root_lookups
            .lock()
            .insert(dir, found.clone(), Instant::now());
        inner.counters.record_removed(removed);
        found
    }

    // ------------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------------

    /// Queue a change for debounced invalidation.
    pub fn notify_change(&self, change: FileChange) {
        // Fails only once the intake has shut down, when nothing is cached
        // worth invalidating anyway.
        let _ = self.inner.changes_tx.send(change);
    }

    /// Sender for change sources such as [`MapWatcher`](crate::watch::MapWatcher).
    pub fn change_sender(&self) -> mpsc::UnboundedSender<FileChange> {
        self.inner.changes_tx.clone()
    }

    /// Invalidate immediately, bypassing the debounce window.
    pub fn invalidate_paths(&self, paths: impl IntoIterator<Item = PathBuf>) -> Invalidation {
        self.inner.invalidate(paths.into_iter().collect())
    }

    /// Receive a notice after every applied invalidation batch.
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.inner.events.subscribe()
    }

    // ------------------------------------------------------------------------
    // Introspection and lifecycle
    // ------------------------------------------------------------------------

    pub fn cache_stats(&self) -> CacheStats {
        let key_spaces = self.inner.key_spaces.lock().len();
        let root_lookups = self.inner.root_lookups.lock().len();
        self.inner.counters.snapshot(key_spaces, root_lookups)
    }

    /// Empty both caches now.
    pub fn clear_cache(&self) {
        let mut spaces = self.inner.key_spaces.lock();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        spaces.clear();
        self.inner.root_lookups.lock().clear();
        drop(spaces);
        crate::debug!("cache"; "cleared");
    }

    /// Stop background tasks and drop cached state.
    pub fn dispose(&self) {
        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }
        self.clear_cache();
    }

    #[inline]
    pub fn boundary(&self) -> &Boundary {
        &self.inner.boundary
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }
}

impl<F: FileAccess> EngineInner<F> {
    /// Live cached key space. `count` records the hit or miss.
    fn cached(&self, root: &Path, count: bool) -> Option<Arc<KeySpace>> {
        let (space, expired) = self.key_spaces.lock().get(root, Instant::now());
        if expired {
            Counters::bump(&self.counters.expirations, 1);
        }
        if count {
            let counter = if space.is_some() {
                &self.counters.hits
            } else {
                &self.counters.misses
            };
            Counters::bump(counter, 1);
        }
        space
    }

    /// Traverse and cache, unless an invalidation happened meanwhile.
    async fn build(&self, root: &Path) -> Arc<KeySpace> {
        let generation = self.generation.load(Ordering::SeqCst);
        Counters::bump(&self.counters.builds, 1);

        let started = Instant::now();
        let space = Arc::new(traverse(&self.fs, root.to_path_buf(), &self.parse, &self.boundary).await);
        crate::debug!(
            "keys";
            "built {}: {} keys from {} maps in {:?}",
            root.display(),
            space.len(),
            space.map_hierarchy().len(),
            started.elapsed()
        );

        // Compared under the lock that invalidation bumps it under.
        let inserted = {
            let mut spaces = self.key_spaces.lock();
            (self.generation.load(Ordering::SeqCst) == generation)
                .then(|| spaces.insert(Arc::clone(&space), Instant::now()))
        };
        match inserted {
            Some(removed) => self.counters.record_removed(removed),
            None => crate::debug!("cache"; "not caching {}: invalidated during build", root.display()),
        }
        space
    }

    fn invalidate(&self, paths: Vec<PathBuf>) -> Invalidation {
        if paths.is_empty() {
            return Invalidation::default();
        }
        let changed: Vec<PathBuf> = paths.iter().map(|p| normalize_path(p)).collect();
        let mut evicted_roots = Vec::new();
        {
            let mut spaces = self.key_spaces.lock();
            self.generation.fetch_add(1, Ordering::SeqCst);
            let mut lookups = self.root_lookups.lock();
            for path in &changed {
                lookups.invalidate_file(path);
                for root in spaces.invalidate_map(path) {
                    if !evicted_roots.contains(&root) {
                        evicted_roots.push(root);
                    }
                }
            }
        }

        Counters::bump(&self.counters.invalidations, evicted_roots.len());
        for root in &evicted_roots {
            crate::log!("cache"; "invalidated {}", root.display());
        }

        let notice = Invalidation {
            changed,
            evicted_roots,
        };
        // No subscribers is fine.
        let _ = self.events.send(notice.clone());
        notice
    }

    /// Remove expired entries; skipped when both caches are empty.
    fn sweep(&self) {
        let now = Instant::now();
        let mut spaces = self.key_spaces.lock();
        let mut lookups = self.root_lookups.lock();
        if spaces.is_empty() && lookups.is_empty() {
            return;
        }
        let expired = spaces.sweep(now) + lookups.sweep(now);
        drop((spaces, lookups));

        if expired > 0 {
            Counters::bump(&self.counters.expirations, expired);
            crate::debug!("cache"; "swept {} expired entries", expired);
        }
    }
}

/// Periodic expiry, independent of inserts. Exits once the engine is gone.
async fn run_sweeper<F: FileAccess>(inner: Weak<EngineInner<F>>, period: std::time::Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.sweep();
    }
}
