use std::time::Duration;

/// Configuration for one circuit breaker instance (spec §4.3).
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub name: String,
    /// Consecutive transient failures before CLOSED -> OPEN.
    pub failure_threshold: u32,
    /// How long OPEN waits before allowing a HALF_OPEN probe.
    pub reset_timeout: Duration,
    /// Consecutive successes in HALF_OPEN before HALF_OPEN -> CLOSED.
    pub success_threshold: u32,
    /// Maximum concurrent probe calls allowed while HALF_OPEN.
    pub max_requests: u32,
    /// Per-call timeout; a timeout counts as a transient failure.
    pub call_timeout: Duration,
}

impl CircuitBreakerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
            success_threshold: 2,
            max_requests: 1,
            call_timeout: Duration::from_secs(10),
        }
    }

    pub fn failure_threshold(mut self, n: u32) -> Self {
        self.failure_threshold = n;
        self
    }

    pub fn reset_timeout(mut self, d: Duration) -> Self {
        self.reset_timeout = d;
        self
    }

    pub fn success_threshold(mut self, n: u32) -> Self {
        self.success_threshold = n;
        self
    }

    pub fn max_requests(mut self, n: u32) -> Self {
        self.max_requests = n;
        self
    }

    pub fn call_timeout(mut self, d: Duration) -> Self {
        self.call_timeout = d;
        self
    }
}
