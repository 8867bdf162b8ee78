//! Background cache warming: registered strategies generate keys, fetch
//! values, and populate a cache without ever blocking a user request (spec
//! §4.12).

use async_trait::async_trait;
use eventscout_core::StageError;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A cache a warming strategy can populate.
pub trait WarmableCache: Send + Sync {
    fn warm(&self, key: String, value: String, ttl: Duration);
}

impl WarmableCache for eventscout_cache::BoundedCache<String, String> {
    fn warm(&self, key: String, value: String, ttl: Duration) {
        self.set(key, value, ttl);
    }
}

/// The collaborator that actually fetches a value for a warmed key (e.g. a
/// search call or an LLM analysis).
#[async_trait]
pub trait WarmingDataProvider: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<String, StageError>;
}

pub struct WarmingStrategy {
    pub name: String,
    pub priority: i32,
    pub enabled: bool,
    pub ttl: Duration,
    pub query_generator: Box<dyn Fn() -> Vec<String> + Send + Sync>,
    pub data_provider: Arc<dyn WarmingDataProvider>,
    pub target: Arc<dyn WarmableCache>,
}

#[derive(Debug, Clone, Default)]
pub struct WarmingOutcome {
    pub attempted: usize,
    pub warmed: usize,
}

pub struct WarmingRegistry {
    strategies: Mutex<Vec<WarmingStrategy>>,
}

impl WarmingRegistry {
    pub fn new() -> Self {
        Self {
            strategies: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, strategy: WarmingStrategy) {
        self.strategies.lock().unwrap_or_else(|e| e.into_inner()).push(strategy);
    }

    /// Runs one warming cycle: enabled strategies are visited highest
    /// priority first, each contributing keys up to `batch_size` in total,
    /// fetched with `per_key_timeout`. Failures are skipped, never fatal.
    pub async fn run_cycle(&self, batch_size: usize, per_key_timeout: Duration) -> WarmingOutcome {
        let ordered: Vec<(String, Vec<String>, Arc<dyn WarmingDataProvider>, Arc<dyn WarmableCache>, Duration)> = {
            let mut strategies: Vec<_> = self
                .strategies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .filter(|s| s.enabled)
                .map(|s| (s.priority, s.name.clone(), (s.query_generator)(), Arc::clone(&s.data_provider), Arc::clone(&s.target), s.ttl))
                .collect();
            strategies.sort_by(|a, b| b.0.cmp(&a.0));
            strategies.into_iter().map(|(_, name, keys, provider, target, ttl)| (name, keys, provider, target, ttl)).collect()
        };

        let mut outcome = WarmingOutcome::default();
        'outer: for (_name, keys, provider, target, ttl) in ordered {
            for key in keys {
                if outcome.attempted >= batch_size {
                    break 'outer;
                }
                outcome.attempted += 1;
                let result = tokio::time::timeout(per_key_timeout, provider.fetch(&key)).await;
                if let Ok(Ok(value)) = result {
                    target.warm(key, value, ttl);
                    outcome.warmed += 1;
                }
            }
        }
        outcome
    }
}

impl Default for WarmingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
