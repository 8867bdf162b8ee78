//! Bounded cache with TTL, smallest-insertion-time eviction and a
//! background cleanup timer (spec §4.1 / C1).
//!
//! Used both directly as the unified multi-provider result cache (C5) and,
//! keyed by provider + minute bucket, as the storage backing the rate
//! limiter (C2). Every operation is concurrency-safe, guarded by a single
//! `std::sync::Mutex` — contention is expected to be low since each call
//! does O(capacity) work at worst (the eviction scan), not I/O.

mod error;
mod store;

pub use error::CacheError;

use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store::Store;
use tokio::task::JoinHandle;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Default TTL used by the unified search cache (spec §3: 30 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// A bounded, TTL-aware, concurrency-safe cache.
///
/// Cloning shares the same underlying store (`Arc`), matching the teacher's
/// pattern of a cheaply cloneable handle wrapping `Arc<Mutex<...>>` state
/// (e.g. `SharedRateLimiter`).
#[derive(Clone)]
pub struct BoundedCache<K, V> {
    inner: Arc<Mutex<Store<K, V>>>,
    name: Arc<str>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Creates a cache with the given capacity. `name` is used only for
    /// metrics/tracing labels.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(Self {
            inner: Arc::new(Mutex::new(Store::new(capacity))),
            name: Arc::from(name.into()),
        })
    }

    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let evicted = self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .set(key, value, ttl);

        #[cfg(feature = "metrics")]
        {
            counter!("cache_sets_total", "cache" => self.name.to_string()).increment(1);
            if evicted.is_some() {
                counter!("cache_evictions_total", "cache" => self.name.to_string()).increment(1);
            }
        }
        #[cfg(not(feature = "metrics"))]
        let _ = evicted;
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let result = self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key);

        #[cfg(feature = "metrics")]
        {
            let outcome = if result.is_some() { "hit" } else { "miss" };
            counter!("cache_lookups_total", "cache" => self.name.to_string(), "outcome" => outcome)
                .increment(1);
        }
        result
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Spawns a detached background task that sweeps expired entries every
    /// `cleanup_interval`, per spec §4.1. The returned handle may be
    /// dropped (the task keeps running) or aborted for an explicit
    /// shutdown, matching the "fire-and-forget with its own lifecycle"
    /// design note in spec §9 for cache warming.
    pub fn spawn_cleanup(&self, cleanup_interval: Duration) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let name = Arc::clone(&self.name);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cleanup_interval);
            loop {
                ticker.tick().await;
                let removed = inner.lock().unwrap_or_else(|e| e.into_inner()).sweep_expired();
                if removed > 0 {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(cache = %name, removed, "cache cleanup swept expired entries");
                    #[cfg(feature = "metrics")]
                    counter!("cache_cleanup_removed_total", "cache" => name.to_string())
                        .increment(removed as u64);
                }
                #[cfg(not(any(feature = "tracing", feature = "metrics")))]
                let _ = (&name, removed);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_rejected() {
        let result: Result<BoundedCache<&str, &str>, _> = BoundedCache::new("test", 0);
        assert_eq!(result.unwrap_err(), CacheError::ZeroCapacity);
    }

    #[test]
    fn get_after_set_within_window_returns_stored_value() {
        let cache: BoundedCache<&str, i32> = BoundedCache::new("test", 4).unwrap();
        cache.set("a", 1, Duration::from_secs(60));
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn clone_shares_state() {
        let cache: BoundedCache<&str, i32> = BoundedCache::new("test", 4).unwrap();
        let clone = cache.clone();
        cache.set("a", 1, Duration::from_secs(60));
        assert_eq!(clone.get(&"a"), Some(1));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_sets_and_gets_are_safe() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new("test", 1000).unwrap();
        let mut handles = Vec::new();
        for i in 0..50u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.set(i, i * 2, Duration::from_secs(60));
                cache.get(&i)
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let got = handle.await.unwrap();
            assert_eq!(got, Some(i as u32 * 2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn background_cleanup_removes_expired_entries() {
        let cache: BoundedCache<&str, i32> = BoundedCache::new("test", 4).unwrap();
        cache.set("a", 1, Duration::from_millis(10));
        let _handle = cache.spawn_cleanup(Duration::from_millis(5));

        tokio::time::advance(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;

        assert_eq!(cache.len(), 0);
    }
}
