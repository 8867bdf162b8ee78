//! Cache storage: a mapping from keys to `{data, inserted_at, ttl}` (spec §4.1).
//!
//! Eviction drops the single entry with the smallest `inserted_at` once the
//! store is at capacity — not access-recency LRU. This mirrors the
//! teacher's `CacheStore`/`EvictionStore` split (separate storage backend
//! from TTL bookkeeping) but replaces the pluggable LRU/LFU/FIFO policy
//! with the one eviction rule spec.md names.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) > self.ttl
    }
}

pub(crate) struct Store<K, V> {
    map: HashMap<K, Entry<V>>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> Store<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts a value, evicting the smallest-`inserted_at` entry first if
    /// the store is already at capacity. Returns the evicted key/value, if
    /// any.
    pub(crate) fn set(&mut self, key: K, value: V, ttl: Duration) -> Option<(K, V)> {
        let mut evicted = None;
        if self.map.len() >= self.capacity && !self.map.contains_key(&key) {
            if let Some(oldest_key) = self
                .map
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                if let Some(e) = self.map.remove(&oldest_key) {
                    evicted = Some((oldest_key, e.value));
                }
            }
        }
        self.map.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
        evicted
    }

    /// Returns the value if present and not expired; expired entries are
    /// removed on access.
    pub(crate) fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        let expired = match self.map.get(key) {
            Some(e) => e.is_expired(now),
            None => return None,
        };
        if expired {
            self.map.remove(key);
            None
        } else {
            self.map.get(key).map(|e| e.value.clone())
        }
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key).map(|e| e.value)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }

    /// Sweeps every expired entry; returns the number removed.
    pub(crate) fn sweep_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.map.len();
        self.map.retain(|_, e| !e.is_expired(now));
        before - self.map.len()
    }
}
