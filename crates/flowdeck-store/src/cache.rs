//! TTL cache with explicit expiry instants.
//!
//! Each entry records the absolute instant it stops being fresh.  A read at
//! or after that instant is a miss and drops the entry; [`TtlCache::invalidate`]
//! removes an entry outright regardless of its expiry.  Values are replaced
//! whole, never mutated in place, so readers never observe a partial value.
//!
//! Invalidation bumps a per-key generation (or a cache-wide epoch for
//! [`TtlCache::invalidate_all`]).  A load started before the bump still
//! returns its value to its caller but does not store it.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

// ── cache stats ──────────────────────────────────────────────────────

/// Counters tracking cache effectiveness.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    /// Total cache hits since creation.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Total cache misses since creation, expired reads included.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Reads that found an entry past its expiry.
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Total lookups (hits + misses).
    pub fn total(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Hit rate as a value between 0.0 and 1.0 (returns 0.0 if no lookups).
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.hits() as f64 / total as f64
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} expired={} rate={:.2}%",
            self.hits(),
            self.misses(),
            self.expirations(),
            self.hit_rate() * 100.0,
        )
    }
}

// ── cache ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A concurrent map whose entries expire a fixed duration after insertion.
///
/// `V` is cloned out on every hit, so it is normally an `Arc`.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    entries: Arc<DashMap<K, Entry<V>>>,
    generations: Arc<DashMap<K, u64>>,
    epoch: Arc<AtomicU64>,
    stats: Arc<CacheStats>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
            generations: Arc::clone(&self.generations),
            epoch: Arc::clone(&self.epoch),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        debug!(name, ttl_ms = ttl.as_millis() as u64, "ttl cache created");
        Self {
            name,
            ttl,
            entries: Arc::new(DashMap::new()),
            generations: Arc::new(DashMap::new()),
            epoch: Arc::new(AtomicU64::new(0)),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Look up a fresh value.  An expired entry is dropped and reported as
    /// a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        // Copy out before touching the map again; holding the read guard
        // across `remove_if` would deadlock the shard.
        let found = self
            .entries
            .get(key)
            .map(|entry| (entry.value.clone(), entry.expires_at));

        match found {
            Some((value, expires_at)) if now < expires_at => {
                self.stats.record_hit();
                debug!(cache = self.name, ?key, "cache hit");
                Some(value)
            }
            Some(_) => {
                self.entries
                    .remove_if(key, |_, entry| entry.expires_at <= now);
                self.stats.record_expiration();
                self.stats.record_miss();
                debug!(cache = self.name, ?key, "cache entry expired");
                None
            }
            None => {
                self.stats.record_miss();
                debug!(cache = self.name, ?key, "cache miss");
                None
            }
        }
    }

    /// Store a value, replacing any previous entry with a fresh expiry.
    pub fn insert(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        debug!(cache = self.name, ?key, "cache insert");
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Remove an entry regardless of its expiry.  Returns whether one was
    /// present.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut generation = self.generations.entry(key.clone()).or_insert(0);
        *generation += 1;
        let removed = self.entries.remove(key).is_some();
        drop(generation);
        debug!(cache = self.name, ?key, removed, "cache invalidate");
        removed
    }

    /// Remove all entries.
    pub fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        // Passing every generation shard waits out loads that checked the
        // old epoch and are mid-insert, so `clear` runs after them.
        self.generations.iter_mut().for_each(|mut g| *g += 1);
        self.entries.clear();
        debug!(cache = self.name, "cache invalidate_all");
    }

    /// Absolute expiry of the entry for `key`, if one is stored.
    pub fn expires_at(&self, key: &K) -> Option<Instant> {
        self.entries.get(key).map(|entry| entry.expires_at)
    }

    /// Number of stored entries, expired ones not yet evicted included.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a reference to the cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn generation(&self, key: &K) -> u64 {
        self.generations.get(key).map_or(0, |g| *g)
    }

    /// Try the cache, and on a miss run the async loader and cache its
    /// result.  A failed load caches nothing, so the next call retries.
    /// A load overtaken by an invalidation of `key` is returned but not
    /// cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(cached) = self.get(&key) {
            return Ok(cached);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let generation = self.generation(&key);
        let value = loader().await?;

        // The generation guard is held across the insert so an invalidation
        // cannot land between the check and the store.
        let current = self.generations.entry(key.clone()).or_insert(0);
        if *current == generation && self.epoch.load(Ordering::SeqCst) == epoch {
            self.insert(key, value.clone());
        } else {
            debug!(cache = self.name, ?key, "load overtaken by invalidation, not cached");
        }
        drop(current);
        Ok(value)
    }
}

// ── tests ────────────────────────────────────────────────────────────
