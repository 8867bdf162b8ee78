use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CircuitBreakerError {
    #[error("circuit breaker '{0}' is open")]
    Open(String),
}
