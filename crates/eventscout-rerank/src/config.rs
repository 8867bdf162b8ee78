/// Configuration for the rerank gate (spec §4.6).
#[derive(Debug, Clone)]
pub struct RerankConfig {
    /// Below this many non-aggregator URLs, keep a backstop of aggregators
    /// rather than discarding them outright.
    pub min_non_aggregator_urls: usize,
    pub max_backstop_aggregators: usize,
    /// Hard cap on documents sent to the reranker API.
    pub max_voyage_docs: usize,
    pub top_k: usize,
    pub country_tld_bonus: f64,
    pub speaker_path_bonus: f64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            min_non_aggregator_urls: 5,
            max_backstop_aggregators: 3,
            max_voyage_docs: 50,
            top_k: 30,
            country_tld_bonus: 0.05,
            speaker_path_bonus: 0.1,
        }
    }
}
