//! Orchestrator-level error type (spec §7: only input-invariant violations
//! surface as `Err`; everything else degrades to a reduced `SearchResult`).

use eventscout_core::SearchParamsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid search parameters: {0}")]
    InvalidParams(#[from] SearchParamsError),

    #[error("configuration error: {0}")]
    Config(String),
}
