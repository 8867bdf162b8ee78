//! Whole-pipeline result cache and in-flight dedup (spec §8 scenarios 1 and
//! 6). Distinct from `eventscout-search`'s provider-response cache, which
//! only covers the Firecrawl search call: these two end-to-end scenarios
//! need the *entire* discover→rerank→prioritise→extract→quality pipeline
//! deduplicated, so the extractor's scraper is never invoked twice for two
//! concurrent, identical requests.
//!
//! Shaped after the teacher's `tower-resilience-coalesce::service::InFlight`
//! the same way `eventscout-search::engine::InFlight` is, generalized from a
//! single Firecrawl call to the whole pipeline result and using
//! `parking_lot::Mutex` per this crate's own concurrency note (spec §5
//! [NEW]), rather than carrying over the `std::sync::Mutex` already used in
//! `eventscout-search`.

use eventscout_core::SearchParams;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Normalises the fields that determine whether two requests are the same
/// pipeline invocation, independent of `SearchParams::validate`.
pub fn normalise_key(params: &SearchParams) -> String {
    let text = params.trimmed_user_text().to_lowercase();
    let country = params.country.as_deref().unwrap_or("").to_uppercase();
    format!("{}|{}|{}|{}", text, country, params.date_from, params.date_to)
}

type Broadcast<V> = broadcast::Sender<V>;

/// Tracks pipeline runs currently in flight, keyed by [`normalise_key`].
/// The first caller for a key becomes the leader and runs the pipeline;
/// later callers for the same key subscribe to its broadcast result.
pub struct ResultInFlight<V: Clone> {
    requests: Mutex<HashMap<String, Broadcast<V>>>,
}

impl<V: Clone> ResultInFlight<V> {
    pub fn new() -> Self {
        Self { requests: Mutex::new(HashMap::new()) }
    }

    /// Returns a receiver to join an already-running request, or `None` if
    /// this call is the leader (the caller must then call [`Self::complete`]
    /// once it has a result).
    pub fn try_join(&self, key: &str) -> Option<broadcast::Receiver<V>> {
        let mut requests = self.requests.lock();
        if let Some(sender) = requests.get(key) {
            Some(sender.subscribe())
        } else {
            let (tx, _rx) = broadcast::channel(1);
            requests.insert(key.to_string(), tx);
            None
        }
    }

    /// Broadcasts the leader's result to every joined follower and clears
    /// the in-flight entry.
    pub fn complete(&self, key: &str, value: V) {
        let mut requests = self.requests.lock();
        if let Some(sender) = requests.remove(key) {
            let _ = sender.send(value);
        }
    }
}

impl<V: Clone> Default for ResultInFlight<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedResultInFlight<V> = Arc<ResultInFlight<V>>;
