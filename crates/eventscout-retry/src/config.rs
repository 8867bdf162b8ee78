use crate::schedule::TimeoutSchedule;
use std::time::Duration;

/// Configuration for one retried operation (spec §4.4).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub name: String,
    pub max_attempts: usize,
    pub timeouts: TimeoutSchedule,
    /// Backoff base: delay for attempt `n` is `base * 2^n` plus jitter.
    pub base_delay: Duration,
    /// Jitter fraction applied uniformly in `[0, jitter_factor] * current_delay`.
    pub jitter_factor: f64,
}

impl RetryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_attempts: 3,
            timeouts: TimeoutSchedule::fixed(Duration::from_secs(10)),
            base_delay: Duration::from_millis(500),
            jitter_factor: 0.2,
        }
    }

    pub fn max_attempts(mut self, n: usize) -> Self {
        assert!(n >= 1, "max_attempts must be at least 1");
        self.max_attempts = n;
        self
    }

    pub fn timeouts(mut self, schedule: TimeoutSchedule) -> Self {
        self.timeouts = schedule;
        self
    }

    pub fn base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }

    pub fn jitter_factor(mut self, f: f64) -> Self {
        self.jitter_factor = f;
        self
    }

    /// Preset used for the search stage's Firecrawl/CSE/Database calls.
    pub fn search(name: impl Into<String>) -> Self {
        Self::new(name)
            .max_attempts(3)
            .timeouts(TimeoutSchedule::search_default())
            .base_delay(Duration::from_secs(1))
    }
}
