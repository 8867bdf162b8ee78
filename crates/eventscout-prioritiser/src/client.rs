use async_trait::async_trait;
use eventscout_core::StageError;
use std::sync::Arc;

/// The LLM backend used to score one chunk of URLs. Returns raw text,
/// expected to be (possibly malformed) JSON.
#[async_trait]
pub trait PrioritiserLlm: Send + Sync {
    async fn complete(&self, instruction: &str, urls: &[String]) -> Result<String, StageError>;
}

#[async_trait]
impl PrioritiserLlm for Arc<dyn PrioritiserLlm> {
    async fn complete(&self, instruction: &str, urls: &[String]) -> Result<String, StageError> {
        (**self).complete(instruction, urls).await
    }
}

/// Coarse failure categories for per-chunk metrics (spec §4.7: "metrics
/// record success/timeout/quota/safety/invalid/network/unknown
/// categories").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Success,
    Timeout,
    Quota,
    Safety,
    Invalid,
    Network,
    Unknown,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Success => "success",
            FailureCategory::Timeout => "timeout",
            FailureCategory::Quota => "quota",
            FailureCategory::Safety => "safety",
            FailureCategory::Invalid => "invalid",
            FailureCategory::Network => "network",
            FailureCategory::Unknown => "unknown",
        }
    }
}

pub fn classify(error: &StageError) -> FailureCategory {
    match error {
        StageError::Timeout(_) => FailureCategory::Timeout,
        StageError::RateLimited(_) | StageError::CircuitOpen(_) => FailureCategory::Quota,
        StageError::InvalidInput(_) => FailureCategory::Invalid,
        StageError::Http(code) if *code >= 500 => FailureCategory::Network,
        StageError::Http(_) => FailureCategory::Invalid,
        StageError::Aborted => FailureCategory::Network,
        StageError::Unknown(_) => FailureCategory::Unknown,
    }
}
