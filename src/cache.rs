//! Caching layer for hivfacts
//!
//! This module provides:
//! - [`MemoCache`]: build-once cache shared by table registries
//! - [`LruCache`]: bounded cache with least-recently-used eviction
//! - [`ParseCache`]: parsed mutation strings, sized by `[cache]` in the config
//!
//! # Example
//!
//! ```
//! use hivfacts::cache::ParseCache;
//!
//! let cache = ParseCache::new(1000);
//! let mutation = cache.get_or_parse("RT:M41L", None).unwrap();
//! assert_eq!(mutation.short_text(), "41L");
//! println!("Cache stats: {:?}", cache.stats());
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;

use crate::config::FactsConfig;
use crate::error::FactsError;
use crate::gene::Gene;
use crate::mutation::{parse_mutation, split_mutation_tokens, Mutation, MutationSet};

/// Statistics for cache usage
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of values built (memo caches only)
    pub builds: u64,
    /// Number of items currently in cache
    pub size: usize,
    /// Maximum cache capacity (0 means unbounded)
    pub capacity: usize,
    /// Number of evictions
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

/// Unbounded cache that builds each key at most once
///
/// Concurrent first requests for the same key share one build: the map
/// lock is only held to find or create the per-key cell, and the build
/// runs inside that cell. A failed build leaves the cell empty so a later
/// call can retry.
pub struct MemoCache<K: Hash + Eq + Clone, V> {
    cells: RwLock<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
}

impl<K: Hash + Eq + Clone, V> MemoCache<K, V> {
    pub fn new() -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
        }
    }

    fn cell(&self, key: &K) -> Arc<OnceCell<Arc<V>>> {
        if let Some(cell) = self
            .cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(cell);
        }
        let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(key.clone()).or_default())
    }

    /// Return the cached value for `key`, building it with `build` on first use
    pub fn get_or_try_build<F, E>(&self, key: &K, build: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let cell = self.cell(key);
        if let Some(value) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(value));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = cell.get_or_try_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            build().map(Arc::new)
        })?;
        Ok(Arc::clone(value))
    }

    /// Cached value without building
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of built values
    pub fn len(&self) -> usize {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cells
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            size: self.len(),
            capacity: 0,
            evictions: 0,
        }
    }
}

impl<K: Hash + Eq + Clone, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe LRU cache implementation
///
/// Each entry carries its last access tick in an atomic, so a hit can
/// refresh recency while holding only the read lock.
pub struct LruCache<K: Hash + Eq + Clone, V: Clone> {
    entries: RwLock<HashMap<K, (V, AtomicU64)>>,
    capacity: usize,
    access_counter: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    /// Create a new LRU cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
            capacity,
            access_counter: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.access_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if let Some((value, last_access)) = entries.get(key) {
            last_access.store(self.tick(), Ordering::Relaxed);
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(value.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert a value, evicting the least recently used entry when full
    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let access = AtomicU64::new(self.tick());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            self.evict_lru(&mut entries);
        }

        entries.insert(key, (value, access));
    }

    fn evict_lru(&self, entries: &mut HashMap<K, (V, AtomicU64)>) {
        if let Some(lru_key) = entries
            .iter()
            .min_by_key(|(_, (_, access))| access.load(Ordering::Relaxed))
            .map(|(k, _)| k.clone())
        {
            entries.remove(&lru_key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: 0,
            size: self.len(),
            capacity: self.capacity,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache for parsed HIV-1 mutation strings
///
/// Keyed by the text and the default gene used to resolve it. Only
/// successful parses are cached.
pub struct ParseCache {
    cache: LruCache<(Option<Gene>, String), Mutation>,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Cache sized by `[cache] parse_capacity`, or `None` when it is zero
    pub fn from_config(config: &FactsConfig) -> Option<Self> {
        match config.cache.parse_capacity {
            0 => None,
            capacity => Some(Self::new(capacity)),
        }
    }

    /// Get a parsed mutation from cache or parse it
    pub fn get_or_parse(
        &self,
        text: &str,
        default_gene: Option<Gene>,
    ) -> Result<Mutation, FactsError> {
        let key = (default_gene, text.to_string());
        if let Some(mutation) = self.cache.get(&key) {
            return Ok(mutation);
        }
        let mutation = parse_mutation(text, default_gene)?;
        self.cache.insert(key, mutation.clone());
        Ok(mutation)
    }

    /// [`parse_mutation_set`](crate::mutation::parse_mutation_set) with
    /// each token looked up in the cache first
    pub fn parse_mutation_set(
        &self,
        text: Option<&str>,
        default_gene: Option<Gene>,
    ) -> Result<MutationSet, FactsError> {
        let Some(text) = text else {
            return Ok(MutationSet::new());
        };
        split_mutation_tokens(text)
            .map(|token| self.get_or_parse(token, default_gene))
            .collect()
    }

    /// Cached mutation only (no parsing)
    pub fn get(&self, text: &str, default_gene: Option<Gene>) -> Option<Mutation> {
        self.cache.get(&(default_gene, text.to_string()))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(1000)
    }
}
