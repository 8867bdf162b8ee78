//! Unified multi-provider search (spec §4.5 / C5).
//!
//! In-flight deduplication for Firecrawl is grounded on the teacher's
//! `tower-resilience-coalesce::service::InFlight`: a `Mutex<HashMap<K,
//! broadcast::Sender<Result<Res, E>>>>` where the first caller for a key
//! becomes the leader and later callers subscribe to its result. Expressed
//! here as a plain async method rather than a `tower::Service` wrapper,
//! since this is an application-level fan-out, not network middleware.

use crate::item::{SearchItem, SearchResponse};
use crate::provider::SearchProvider;
use crate::query::{self, SearchRequest};
use eventscout_cache::BoundedCache;
use eventscout_circuitbreaker::CircuitBreaker;
use eventscout_core::StageError;
use eventscout_ratelimiter::RateLimiter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

pub const FIRECRAWL_DEADLINE: Duration = Duration::from_secs(40);
pub const CSE_DEADLINE: Duration = Duration::from_secs(5);
pub const DATABASE_DEADLINE: Duration = Duration::from_secs(2);

type InFlightMap = Mutex<HashMap<String, broadcast::Sender<Result<Vec<SearchItem>, String>>>>;

struct InFlight {
    requests: InFlightMap,
}

impl InFlight {
    fn new() -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
        }
    }

    fn try_join(&self, key: &str) -> Option<broadcast::Receiver<Result<Vec<SearchItem>, String>>> {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = requests.get(key) {
            Some(sender.subscribe())
        } else {
            let (tx, _rx) = broadcast::channel(1);
            requests.insert(key.to_string(), tx);
            None
        }
    }

    fn complete(&self, key: &str, result: Result<Vec<SearchItem>, String>) {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = requests.remove(key) {
            let _ = sender.send(result);
        }
    }
}

pub struct SearchEngine {
    firecrawl: Arc<dyn SearchProvider>,
    cse: Arc<dyn SearchProvider>,
    database: Arc<dyn SearchProvider>,
    firecrawl_breaker: CircuitBreaker,
    cse_breaker: CircuitBreaker,
    database_breaker: CircuitBreaker,
    rate_limiter: RateLimiter,
    cache: BoundedCache<String, SearchResponse>,
    cache_ttl: Duration,
    firecrawl_in_flight: Arc<InFlight>,
}

impl SearchEngine {
    pub fn new(
        firecrawl: Arc<dyn SearchProvider>,
        cse: Arc<dyn SearchProvider>,
        database: Arc<dyn SearchProvider>,
        rate_limiter: RateLimiter,
        cache: BoundedCache<String, SearchResponse>,
        cache_ttl: Duration,
    ) -> Self {
        use eventscout_circuitbreaker::CircuitBreakerConfig;
        Self {
            firecrawl,
            cse,
            database,
            firecrawl_breaker: CircuitBreaker::new(
                CircuitBreakerConfig::new("firecrawl").call_timeout(FIRECRAWL_DEADLINE),
            ),
            cse_breaker: CircuitBreaker::new(CircuitBreakerConfig::new("cse").call_timeout(CSE_DEADLINE)),
            database_breaker: CircuitBreaker::new(
                CircuitBreakerConfig::new("database").call_timeout(DATABASE_DEADLINE),
            ),
            rate_limiter,
            cache,
            cache_ttl,
            firecrawl_in_flight: Arc::new(InFlight::new()),
        }
    }

    pub async fn search(&self, req: SearchRequest) -> SearchResponse {
        let cache_key = query::normalise_cache_key(&req);

        if req.use_cache {
            if let Some(cached) = self.cache.get(&cache_key) {
                return cached;
            }
        }

        let (firecrawl_res, cse_res, database_res) = tokio::join!(
            self.call_firecrawl(&req, &cache_key),
            self.call_provider(&self.cse, &self.cse_breaker, "cse", &req),
            self.call_provider(&self.database, &self.database_breaker, "database", &req),
        );

        let mut attempted = vec!["firecrawl".to_string(), "cse".to_string(), "database".to_string()];

        let firecrawl_items = firecrawl_res.ok().filter(|items| !items.is_empty());
        let cse_items = cse_res
            .ok()
            .map(|items| filter_cse_items(items, req.country.as_deref()))
            .filter(|items| !items.is_empty());
        let database_items = database_res.ok().filter(|items| !items.is_empty());

        let chosen = firecrawl_items.or(cse_items).or(database_items);

        let response = match chosen {
            Some(items) => SearchResponse {
                items,
                providers: std::mem::take(&mut attempted),
            },
            None => SearchResponse {
                items: Vec::new(),
                providers: attempted,
            },
        };

        if req.use_cache && !response.items.is_empty() {
            let _ = self.cache.set(cache_key, response.clone(), self.cache_ttl);
        }

        response
    }

    async fn call_firecrawl(&self, req: &SearchRequest, key: &str) -> Result<Vec<SearchItem>, StageError> {
        if !self.rate_limiter.check_and_consume("firecrawl") {
            return Err(StageError::RateLimited("firecrawl".to_string()));
        }

        if let Some(mut receiver) = self.firecrawl_in_flight.try_join(key) {
            return match receiver.recv().await {
                Ok(Ok(items)) => Ok(items),
                Ok(Err(msg)) => Err(StageError::Unknown(msg)),
                Err(_) => Err(StageError::Aborted),
            };
        }

        let provider = Arc::clone(&self.firecrawl);
        let req_owned = req.clone();
        let result = self
            .firecrawl_breaker
            .call(|| async move { provider.search(&req_owned).await })
            .await;

        self.firecrawl_in_flight.complete(
            key,
            result.as_ref().map(|items| items.clone()).map_err(|e| e.to_string()),
        );

        result
    }

    async fn call_provider(
        &self,
        provider: &Arc<dyn SearchProvider>,
        breaker: &CircuitBreaker,
        name: &str,
        req: &SearchRequest,
    ) -> Result<Vec<SearchItem>, StageError> {
        if !self.rate_limiter.check_and_consume(name) {
            return Err(StageError::RateLimited(name.to_string()));
        }
        let provider = Arc::clone(provider);
        let req_owned = req.clone();
        breaker.call(|| async move { provider.search(&req_owned).await }).await
    }
}

fn filter_cse_items(items: Vec<SearchItem>, country: Option<&str>) -> Vec<SearchItem> {
    items
        .into_iter()
        .filter(|item| query::passes_country_filter(item.url(), country))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DatabaseProvider;
    use async_trait::async_trait;
    use eventscout_cache::BoundedCache;
    use eventscout_ratelimiter::RateLimiter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        response: Vec<SearchItem>,
        fail: bool,
    }

    #[async_trait]
    impl SearchProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, _req: &SearchRequest) -> Result<Vec<SearchItem>, StageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StageError::Http(503))
            } else {
                Ok(self.response.clone())
            }
        }
    }

    fn req() -> SearchRequest {
        SearchRequest {
            query: "fintech".to_string(),
            country: Some("DE".to_string()),
            date_from: None,
            date_to: None,
            limit: 10,
            use_cache: true,
        }
    }

    fn engine_with(
        firecrawl: Arc<dyn SearchProvider>,
        cse: Arc<dyn SearchProvider>,
        database: Arc<dyn SearchProvider>,
    ) -> SearchEngine {
        SearchEngine::new(
            firecrawl,
            cse,
            database,
            RateLimiter::new(1000),
            BoundedCache::new("search", 100).unwrap(),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn firecrawl_preferred_when_non_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let firecrawl = Arc::new(FakeProvider {
            name: "firecrawl",
            calls: Arc::clone(&calls),
            response: vec![SearchItem::Url("https://fc.example.de".to_string())],
            fail: false,
        });
        let cse = Arc::new(FakeProvider {
            name: "cse",
            calls: Arc::clone(&calls),
            response: vec![SearchItem::Url("https://cse.example.de".to_string())],
            fail: false,
        });
        let database = Arc::new(DatabaseProvider::new(vec![]));

        let engine = engine_with(firecrawl, cse, database);
        let response = engine.search(req()).await;
        assert_eq!(response.items[0].url(), "https://fc.example.de");
    }

    #[tokio::test]
    async fn falls_back_to_cse_when_firecrawl_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let firecrawl = Arc::new(FakeProvider {
            name: "firecrawl",
            calls: Arc::clone(&calls),
            response: vec![],
            fail: false,
        });
        let cse = Arc::new(FakeProvider {
            name: "cse",
            calls: Arc::clone(&calls),
            response: vec![SearchItem::Url("https://cse.example.de".to_string())],
            fail: false,
        });
        let database = Arc::new(DatabaseProvider::new(vec![]));

        let engine = engine_with(firecrawl, cse, database);
        let response = engine.search(req()).await;
        assert_eq!(response.items[0].url(), "https://cse.example.de");
    }

    #[tokio::test]
    async fn total_failure_yields_empty_items_with_attempted_providers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let firecrawl = Arc::new(FakeProvider {
            name: "firecrawl",
            calls: Arc::clone(&calls),
            response: vec![],
            fail: true,
        });
        let cse = Arc::new(FakeProvider {
            name: "cse",
            calls: Arc::clone(&calls),
            response: vec![],
            fail: true,
        });
        let database = Arc::new(DatabaseProvider::new(vec![]));

        let engine = engine_with(firecrawl, cse, database);
        let response = engine.search(req()).await;
        assert!(response.items.is_empty());
        assert_eq!(response.providers, vec!["firecrawl", "cse", "database"]);
    }

    #[tokio::test]
    async fn cse_results_are_country_filtered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let firecrawl = Arc::new(FakeProvider {
            name: "firecrawl",
            calls: Arc::clone(&calls),
            response: vec![],
            fail: false,
        });
        let cse = Arc::new(FakeProvider {
            name: "cse",
            calls: Arc::clone(&calls),
            response: vec![
                SearchItem::Url("https://events.example.de/fintech".to_string()),
                SearchItem::Url("https://events.example.fr/fintech".to_string()),
            ],
            fail: false,
        });
        let database = Arc::new(DatabaseProvider::new(vec![]));

        let engine = engine_with(firecrawl, cse, database);
        let response = engine.search(req()).await;
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].url(), "https://events.example.de/fintech");
    }

    #[tokio::test]
    async fn cached_response_short_circuits_providers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let firecrawl = Arc::new(FakeProvider {
            name: "firecrawl",
            calls: Arc::clone(&calls),
            response: vec![SearchItem::Url("https://fc.example.de".to_string())],
            fail: false,
        });
        let cse = Arc::new(FakeProvider {
            name: "cse",
            calls: Arc::clone(&calls),
            response: vec![],
            fail: false,
        });
        let database = Arc::new(DatabaseProvider::new(vec![]));

        let engine = engine_with(firecrawl, cse, database);
        let _first = engine.search(req()).await;
        let calls_after_first = calls.load(Ordering::SeqCst);
        let second = engine.search(req()).await;
        assert_eq!(calls.load(Ordering::SeqCst), calls_after_first, "cache hit must skip providers");
        assert_eq!(second.items[0].url(), "https://fc.example.de");
    }
}
