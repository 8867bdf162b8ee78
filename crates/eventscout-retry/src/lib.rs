//! Adaptive-timeout retry engine wrapping fallible async operations
//! (spec §4.4 / C4).
//!
//! Grounded on the teacher's `tower-resilience-retry`: same per-attempt
//! loop shape and event-on-retry tracing, but expressed as a plain async
//! function rather than a `tower::Service`, since callers here are
//! application stages (search providers, page fetches), not network
//! middleware.

mod backoff;
mod config;
mod schedule;

pub use config::RetryConfig;
pub use schedule::TimeoutSchedule;

use eventscout_core::StageError;
use std::future::Future;

/// Runs `f` up to `config.max_attempts` times, retrying only transient
/// failures (`StageError::is_transient`), with a per-attempt timeout from
/// `config.timeouts` and exponential backoff with jitter between attempts.
pub async fn execute_with_retry<F, Fut, T>(config: &RetryConfig, mut f: F) -> Result<T, StageError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, StageError>>,
{
    let mut attempt = 0;
    loop {
        let timeout = config.timeouts.timeout_for(attempt);
        let outcome = tokio::time::timeout(timeout, f(attempt)).await;

        let error = match outcome {
            Ok(Ok(value)) => {
                #[cfg(feature = "tracing")]
                if attempt > 0 {
                    tracing::info!(retry = %config.name, attempts = attempt + 1, "succeeded after retries");
                }
                #[cfg(feature = "metrics")]
                metrics::counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "success")
                    .increment(1);
                return Ok(value);
            }
            Ok(Err(err)) => err,
            Err(_) => StageError::Timeout(timeout),
        };

        if !error.is_transient() {
            #[cfg(feature = "tracing")]
            tracing::debug!(retry = %config.name, "non-transient error, not retrying");
            return Err(error);
        }

        if attempt + 1 >= config.max_attempts {
            #[cfg(feature = "tracing")]
            tracing::warn!(retry = %config.name, attempts = attempt + 1, "retry attempts exhausted");
            #[cfg(feature = "metrics")]
            metrics::counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "exhausted")
                .increment(1);
            return Err(error);
        }

        let delay = backoff::next_delay(config, attempt);
        #[cfg(feature = "tracing")]
        tracing::debug!(retry = %config.name, attempt = attempt + 1, delay_ms = delay.as_millis(), "retrying after delay");
        #[cfg(feature = "metrics")]
        metrics::counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Runs `primary`; on any failure, runs `fallback` and returns its result
/// regardless of outcome (spec §4.4: `executeWithGracefulDegradation`).
pub async fn execute_with_graceful_degradation<P, PF, F, FF, T>(primary: P, fallback: F) -> Result<T, StageError>
where
    P: FnOnce() -> PF,
    PF: Future<Output = Result<T, StageError>>,
    F: FnOnce() -> FF,
    FF: Future<Output = Result<T, StageError>>,
{
    match primary().await {
        Ok(value) => Ok(value),
        Err(_) => fallback().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_config(max_attempts: usize) -> RetryConfig {
        RetryConfig::new("test")
            .max_attempts(max_attempts)
            .timeouts(TimeoutSchedule::fixed(Duration::from_millis(50)))
            .base_delay(Duration::from_millis(1))
            .jitter_factor(0.0)
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let config = fast_config(3);
        let result: Result<&str, StageError> = execute_with_retry(&config, |_attempt| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok("ok")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let config = fast_config(3);
        let result: Result<&str, StageError> = execute_with_retry(&config, |_attempt| {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(StageError::Http(503))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_failure_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let config = fast_config(3);
        let result: Result<(), StageError> = execute_with_retry(&config, |_attempt| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(StageError::Http(404))
            }
        })
        .await;
        assert!(matches!(result, Err(StageError::Http(404))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let config = fast_config(3);
        let result: Result<(), StageError> = execute_with_retry(&config, |_attempt| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(StageError::Aborted)
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn slow_attempt_times_out_and_counts_as_transient() {
        let config = RetryConfig::new("test")
            .max_attempts(1)
            .timeouts(TimeoutSchedule::fixed(Duration::from_millis(10)));
        let result: Result<(), StageError> = execute_with_retry(&config, |_attempt| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(StageError::Timeout(_))));
    }

    #[tokio::test]
    async fn graceful_degradation_falls_back_on_primary_failure() {
        let result = execute_with_graceful_degradation(
            || async { Err::<&str, _>(StageError::Http(500)) },
            || async { Ok::<&str, StageError>("fallback") },
        )
        .await;
        assert_eq!(result.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn graceful_degradation_returns_primary_on_success() {
        let result = execute_with_graceful_degradation(
            || async { Ok::<&str, StageError>("primary") },
            || async { Ok::<&str, StageError>("fallback") },
        )
        .await;
        assert_eq!(result.unwrap(), "primary");
    }
}
