//! Per-provider minute-bucket rate limiter (spec §4.2 / C2).
//!
//! Grounded on the teacher's `tower-resilience-ratelimiter` crate, but
//! spec.md calls for one specific algorithm rather than the teacher's
//! pluggable fixed/sliding-log/sliding-counter windows: a hard minute
//! bucket keyed by `floor(now / 60s)`, reset at the start of the next
//! minute (the Open-Question resolution in spec §9). Hourly/daily
//! aggregates are advisory counters only, consulted by the LLM budget
//! checker in `eventscout-prioritiser`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[cfg(feature = "metrics")]
use metrics::counter;

/// Per-bucket counters for one provider.
#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    minute: u64,
    count_this_minute: u32,
    hour: u64,
    count_this_hour: u32,
    day: u64,
    count_this_day: u32,
}

struct State {
    buckets: HashMap<String, Bucket>,
}

/// Minute-bucket rate limiter, one instance shared across every call site
/// for a given provider (or one instance per provider, at the caller's
/// choice — the limiter itself is keyed internally by provider name so a
/// single shared instance works for all of them).
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<State>>,
    max_requests_per_minute: u32,
}

/// Monotonic second counter, matching spec §4.2's "system monotonic
/// seconds" clock source requirement — not wall-clock time, so it is
/// immune to clock adjustments. Bucket identity (`floor(now/60s)`) is
/// derived from this directly: buckets live only as long as the process,
/// and every caller shares the same `START` reference, so a process-relative
/// clock is sufficient to keep bucket boundaries consistent across callers.
fn now_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    let start = *START.get_or_init(std::time::Instant::now);
    start.elapsed().as_secs()
}

impl RateLimiter {
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                buckets: HashMap::new(),
            })),
            max_requests_per_minute,
        }
    }

    /// Increments the current minute bucket for `provider` and returns
    /// `false` once the bucket count exceeds `max_requests_per_minute`.
    pub fn check_and_consume(&self, provider: &str) -> bool {
        let now = now_secs();
        let minute = now / 60;
        let hour = now / 3600;
        let day = now / 86_400;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let bucket = state.buckets.entry(provider.to_string()).or_default();

        if bucket.minute != minute {
            bucket.minute = minute;
            bucket.count_this_minute = 0;
        }
        if bucket.hour != hour {
            bucket.hour = hour;
            bucket.count_this_hour = 0;
        }
        if bucket.day != day {
            bucket.day = day;
            bucket.count_this_day = 0;
        }

        bucket.count_this_minute += 1;
        bucket.count_this_hour += 1;
        bucket.count_this_day += 1;

        let allowed = bucket.count_this_minute <= self.max_requests_per_minute;

        #[cfg(feature = "metrics")]
        {
            let outcome = if allowed { "allowed" } else { "rejected" };
            counter!("ratelimiter_requests_total", "provider" => provider.to_string(), "outcome" => outcome)
                .increment(1);
        }
        #[cfg(feature = "tracing")]
        if !allowed {
            tracing::warn!(provider, count = bucket.count_this_minute, "rate limit exceeded");
        }

        allowed
    }

    /// Advisory hourly count, used by the LLM budget checker.
    pub fn hourly_count(&self, provider: &str) -> u32 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.buckets.get(provider).map(|b| b.count_this_hour).unwrap_or(0)
    }

    /// Advisory daily count, used by the LLM budget checker.
    pub fn daily_count(&self, provider: &str) -> u32 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.buckets.get(provider).map(|b| b.count_this_day).unwrap_or(0)
    }
}
