//! Pool configuration and per-kind default timeouts (spec §4.8 / C8).

use std::time::Duration;

/// The external system a task talks to, used to pick a default per-task
/// timeout when the caller doesn't override one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Firecrawl,
    Gemini,
    Voyage,
    /// One deep-crawl extraction (spec §4.11 step 7: 30s/URL).
    Extraction,
    Generic,
}

impl TaskKind {
    pub fn default_timeout(&self) -> Duration {
        match self {
            TaskKind::Firecrawl => Duration::from_secs(40),
            TaskKind::Gemini => Duration::from_secs(15),
            TaskKind::Voyage => Duration::from_secs(10),
            TaskKind::Extraction => Duration::from_secs(30),
            TaskKind::Generic => Duration::from_secs(5),
        }
    }
}

/// Pool-wide concurrency bound and early-termination thresholds.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub min_concurrency: usize,
    pub max_concurrency: usize,
    pub early_termination: bool,
    pub min_results: usize,
    pub quality_threshold: f64,
}

impl ExecutorConfig {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            min_concurrency: 1,
            max_concurrency: max_concurrency.max(1),
            early_termination: false,
            min_results: 0,
            quality_threshold: 1.0,
        }
    }

    pub fn min_concurrency(mut self, min: usize) -> Self {
        self.min_concurrency = min.max(1);
        self
    }

    pub fn with_early_termination(mut self, min_results: usize, quality_threshold: f64) -> Self {
        self.early_termination = true;
        self.min_results = min_results;
        self.quality_threshold = quality_threshold;
        self
    }
}
