//! Shared error taxonomy.
//!
//! Per spec §7, failures are recovered at the lowest stage that can preserve
//! meaning; this enum only covers the categories that are allowed to
//! surface past a stage boundary (transient I/O and invariant violations).
//! Catastrophic failures never reach a caller as an `Err` — see
//! `eventscout-orchestrator`.

use thiserror::Error;

/// Errors shared by every pipeline stage crate.
#[derive(Debug, Error, Clone)]
pub enum StageError {
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("request was aborted")]
    Aborted,

    #[error("upstream returned HTTP {0}")]
    Http(u16),

    #[error("rate limit exceeded for provider {0}")]
    RateLimited(String),

    #[error("circuit breaker open for service {0}")]
    CircuitOpen(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl StageError {
    /// Whether this failure counts as "transient" per spec §4.3: timeout,
    /// abort, HTTP >=500, or unknown. HTTP 4xx is a soft failure, not
    /// transient, and must not trip a circuit breaker or retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StageError::Timeout(_) | StageError::Aborted | StageError::Unknown(_) => true,
            StageError::Http(code) => *code >= 500,
            StageError::RateLimited(_) | StageError::CircuitOpen(_) | StageError::InvalidInput(_) => {
                false
            }
        }
    }
}
