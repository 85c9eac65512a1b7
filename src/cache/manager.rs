//! TTL memoization cache
//!
//! Provides a `MemoCache` that stores successful fetch results in memory keyed by
//! string, stamping each entry with the time it was stored. Freshness is checked
//! lazily on read; nothing is swept in the background.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// Default time-to-live for cached profiles in milliseconds (10 minutes)
pub const DEFAULT_TTL_MS: u64 = 10 * 60 * 1000;

/// A single cached value with the instant it was stored
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Result of inspecting the cache, including metadata about freshness
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was stored
    pub cached_at: DateTime<Utc>,
    /// Whether the entry has reached its TTL
    pub is_expired: bool,
}

/// In-memory cache that memoizes fallible async fetches for a fixed TTL
///
/// An entry is fresh while `now - stored_at < ttl`. Reaching the TTL exactly counts
/// as expired. Expired entries stay in the map until the next successful fetch for
/// the same key overwrites them.
///
/// The map lock is only held for the synchronous lookup and store, never while the
/// underlying fetch is awaited. Two callers missing on the same key at the same time
/// will therefore both fetch, and the last one to finish wins.
pub struct MemoCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> fmt::Debug for MemoCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}

impl<V: Clone> MemoCache<V> {
    /// Creates a cache using the wall clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with a TTL given in milliseconds
    ///
    /// TTLs beyond what [`Duration`] can hold saturate to [`Duration::MAX`].
    pub fn from_millis(ttl_ms: u64) -> Self {
        let ttl = i64::try_from(ttl_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .unwrap_or(Duration::MAX);
        Self::new(ttl)
    }

    /// Creates a cache with an injected clock
    ///
    /// Useful for testing, where a [`super::ManualClock`] makes expiry deterministic.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// The TTL shared by every entry in this cache
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result
    ///
    /// # Arguments
    /// * `key` - Cache key; callers namespace it when sources share a cache
    /// * `fetch` - Performs the real upstream round-trip
    ///
    /// # Returns
    /// * `Ok(V)` from the cache when a fresh entry exists, without calling `fetch`
    /// * `Ok(V)` from `fetch` otherwise, after storing it
    /// * `Err(E)` from `fetch` unchanged; the cache is left untouched
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key, "cache hit");
            return Ok(value);
        }

        debug!(key, "cache miss, fetching");
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Returns the value for `key` if present and fresh
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        self.entries()
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Returns the entry for `key` whether or not it has expired
    pub fn peek(&self, key: &str) -> Option<CachedData<V>> {
        let now = self.clock.now();
        self.entries().get(key).map(|entry| CachedData {
            data: entry.value.clone(),
            cached_at: entry.stored_at,
            is_expired: !self.is_fresh(entry, now),
        })
    }

    /// Stores `value` under `key`, replacing any previous entry
    pub fn insert(&self, key: &str, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries().insert(key.to_string(), entry);
    }

    /// Removes the entry for `key`, returning whether one was present
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries().remove(key).is_some();
        if removed {
            debug!(key, "cache entry invalidated");
        }
        removed
    }
}

impl<V> MemoCache<V> {
    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.ttl
    }
}
