//! Circuit breaker shielding each external service from cascading failure
//! (spec §4.3 / C3).

mod circuit;
mod config;
mod error;

pub use circuit::{CircuitState, CircuitStats};
pub use config::CircuitBreakerConfig;
pub use error::CircuitBreakerError;

use circuit::Circuit;
use eventscout_core::StageError;
use std::future::Future;
use std::sync::Arc;

/// A circuit breaker guarding one external service.
///
/// Cheaply cloneable (`Arc` inside); every clone shares the same state, so
/// one instance should be constructed per service and shared across all
/// call sites for that service (spec §5: "Circuit breakers are per-service,
/// process-wide").
#[derive(Clone)]
pub struct CircuitBreaker {
    config: Arc<CircuitBreakerConfig>,
    circuit: Arc<Circuit>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config: Arc::new(config),
            circuit: Arc::new(Circuit::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn state(&self) -> CircuitState {
        self.circuit.state()
    }

    pub fn stats(&self) -> CircuitStats {
        self.circuit.stats()
    }

    /// Runs `f` under this breaker's per-call timeout, classifying the
    /// outcome per spec §4.3: timeouts and transient `StageError`s trip the
    /// breaker; soft failures (HTTP 4xx, rate-limited, already circuit-open)
    /// do not.
    pub async fn call<F, Fut, T>(&self, f: F) -> Result<T, StageError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StageError>>,
    {
        if !self.circuit.try_acquire(&self.config) {
            #[cfg(feature = "metrics")]
            metrics::counter!("circuitbreaker_short_circuits_total", "circuit" => self.config.name.clone())
                .increment(1);
            return Err(StageError::CircuitOpen(self.config.name.clone()));
        }

        match tokio::time::timeout(self.config.call_timeout, f()).await {
            Ok(Ok(value)) => {
                self.circuit.record_success(&self.config);
                Ok(value)
            }
            Ok(Err(err)) => {
                if err.is_transient() {
                    self.circuit.record_failure(&self.config);
                } else {
                    // Soft failures still release the HALF_OPEN in-flight slot
                    // without counting toward the failure threshold.
                    self.circuit.record_success(&self.config);
                }
                Err(err)
            }
            Err(_) => {
                self.circuit.record_failure(&self.config);
                Err(StageError::Timeout(self.config.call_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(
            CircuitBreakerConfig::new("firecrawl")
                .failure_threshold(2)
                .reset_timeout(Duration::from_millis(20))
                .call_timeout(Duration::from_millis(50)),
        )
    }

    #[tokio::test]
    async fn opens_after_threshold_and_short_circuits() {
        let cb = breaker();
        for _ in 0..2 {
            let result: Result<(), StageError> = cb.call(|| async { Err(StageError::Http(503)) }).await;
            assert!(result.is_err());
        }
        assert_eq!(cb.state(), CircuitState::Open);

        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);
        let result: Result<(), StageError> = cb
            .call(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert!(matches!(result, Err(StageError::CircuitOpen(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0, "provider must not be invoked while open");
    }

    #[tokio::test]
    async fn timeout_counts_as_transient_failure() {
        let cb = breaker();
        for _ in 0..2 {
            let result: Result<(), StageError> = cb
                .call(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(())
                })
                .await;
            assert!(matches!(result, Err(StageError::Timeout(_))));
        }
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn http_4xx_does_not_open_circuit() {
        let cb = breaker();
        for _ in 0..10 {
            let _: Result<(), StageError> = cb.call(|| async { Err(StageError::Http(404)) }).await;
        }
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn recovers_through_half_open_after_reset_timeout() {
        let cb = breaker();
        for _ in 0..2 {
            let _: Result<(), StageError> = cb.call(|| async { Err(StageError::Http(503)) }).await;
        }
        assert_eq!(cb.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(30)).await;

        let result: Result<i32, StageError> = cb.call(|| async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
