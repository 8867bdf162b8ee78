//! Error type for the bounded cache.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
}
