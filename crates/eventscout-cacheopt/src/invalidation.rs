//! Dependency-driven invalidation: a key → {dependents} graph drained in
//! batches by a background timer (spec §4.12).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A cache that can drop one key by name. Implemented for
/// `BoundedCache<String, V>` so the invalidation graph can route deletes
/// without being generic over every cache's value type.
pub trait InvalidatableCache: Send + Sync {
    fn invalidate_key(&self, key: &str);
}

impl<V> InvalidatableCache for eventscout_cache::BoundedCache<String, V>
where
    V: Clone + Send + 'static,
{
    fn invalidate_key(&self, key: &str) {
        self.remove(&key.to_string());
    }
}

/// Routes a key prefix (`search:`, `analysis:`, `speaker:`, ...) to the
/// cache it should be deleted from.
pub struct InvalidationRoute {
    pub prefix: &'static str,
    pub cache: Arc<dyn InvalidatableCache>,
}

pub struct InvalidationGraph {
    dependents: Mutex<HashMap<String, HashSet<String>>>,
    queue: Mutex<VecDeque<String>>,
    routes: Vec<InvalidationRoute>,
    batch_size: usize,
}

impl InvalidationGraph {
    pub fn new(routes: Vec<InvalidationRoute>, batch_size: usize) -> Self {
        Self {
            dependents: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            routes,
            batch_size: batch_size.max(1),
        }
    }

    /// Registers `dependent` as invalidated whenever `key` is invalidated.
    pub fn add_dependency(&self, key: impl Into<String>, dependent: impl Into<String>) {
        self.dependents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.into())
            .or_default()
            .insert(dependent.into());
    }

    /// Enqueues `key` and every registered dependent of `key` for deletion
    /// on the next batch drain.
    pub fn invalidate(&self, key: impl Into<String>) {
        let key = key.into();
        let dependents = self
            .dependents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned()
            .unwrap_or_default();

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(key);
        queue.extend(dependents);
    }

    pub fn pending_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn route_delete(&self, key: &str) {
        for route in &self.routes {
            if key.starts_with(route.prefix) {
                route.cache.invalidate_key(key);
            }
        }
    }

    /// Pops up to `batch_size` queued keys and routes each to the matching
    /// cache(s).
    pub fn drain_batch(&self) -> usize {
        let batch: Vec<String> = {
            let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            (0..self.batch_size).filter_map(|_| queue.pop_front()).collect()
        };
        let drained = batch.len();
        for key in batch {
            self.route_delete(&key);
        }
        drained
    }
}

/// Spawns a detached timer draining `graph` every `delay`, the same
/// fire-and-forget shape as `BoundedCache::spawn_cleanup`.
pub fn spawn_drain_timer(graph: Arc<InvalidationGraph>, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(delay);
        loop {
            ticker.tick().await;
            let drained = graph.drain_batch();
            #[cfg(feature = "tracing")]
            if drained > 0 {
                tracing::debug!(drained, "invalidation batch drained");
            }
            #[cfg(not(feature = "tracing"))]
            let _ = drained;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventscout_cache::BoundedCache;

    #[test]
    fn invalidate_enqueues_key_and_dependents() {
        let graph = InvalidationGraph::new(Vec::new(), 10);
        graph.add_dependency("search:fintech", "analysis:fintech-summit");
        graph.invalidate("search:fintech");
        assert_eq!(graph.pending_len(), 2);
    }

    #[test]
    fn drain_batch_respects_batch_size() {
        let graph = InvalidationGraph::new(Vec::new(), 2);
        graph.invalidate("search:a");
        graph.invalidate("search:b");
        graph.invalidate("search:c");
        assert_eq!(graph.drain_batch(), 2);
        assert_eq!(graph.pending_len(), 1);
    }

    #[test]
    fn routes_delete_to_matching_prefix_cache() {
        let search_cache: BoundedCache<String, String> = BoundedCache::new("search", 10).unwrap();
        search_cache.set("search:fintech".to_string(), "cached".to_string(), Duration::from_secs(60));

        let routes = vec![InvalidationRoute {
            prefix: "search:",
            cache: Arc::new(search_cache.clone()),
        }];
        let graph = InvalidationGraph::new(routes, 10);
        graph.invalidate("search:fintech");
        graph.drain_batch();

        assert_eq!(search_cache.get(&"search:fintech".to_string()), None);
    }
}
