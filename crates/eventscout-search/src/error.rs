use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("cache error: {0}")]
    Cache(#[from] eventscout_cache::CacheError),
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}
