//! The consecutive-failure state machine itself (spec §4.3).
//!
//! Structurally grounded on the teacher's `tower-resilience-circuitbreaker`
//! `Circuit`: an atomic state for lock-free reads from [`CircuitBreaker::state`],
//! event-style tracing on every transition, and the same three-state
//! CLOSED/OPEN/HALF_OPEN machine. The evaluation rule is simpler than the
//! teacher's sliding-window failure-rate calculation: spec.md calls for a
//! flat `failure_threshold` of *consecutive* transient failures, not a
//! windowed rate.

use crate::config::CircuitBreakerConfig;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitStats {
    pub state: CircuitState,
    pub success_count: u64,
    pub failure_count: u64,
    pub next_attempt_time: Option<Instant>,
}

pub(crate) struct Circuit {
    state_atomic: AtomicU8,
    consecutive_failures: std::sync::atomic::AtomicU32,
    half_open_successes: std::sync::atomic::AtomicU32,
    half_open_in_flight: std::sync::atomic::AtomicU32,
    total_successes: std::sync::atomic::AtomicU64,
    total_failures: std::sync::atomic::AtomicU64,
    last_state_change: std::sync::Mutex<Instant>,
}

impl Circuit {
    pub(crate) fn new() -> Self {
        Self {
            state_atomic: AtomicU8::new(CircuitState::Closed as u8),
            consecutive_failures: std::sync::atomic::AtomicU32::new(0),
            half_open_successes: std::sync::atomic::AtomicU32::new(0),
            half_open_in_flight: std::sync::atomic::AtomicU32::new(0),
            total_successes: std::sync::atomic::AtomicU64::new(0),
            total_failures: std::sync::atomic::AtomicU64::new(0),
            last_state_change: std::sync::Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    fn last_state_change(&self) -> Instant {
        *self.last_state_change.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition_to(&self, state: CircuitState, config: &CircuitBreakerConfig) {
        let previous = self.state();
        if previous == state {
            return;
        }
        self.state_atomic.store(state as u8, Ordering::Release);
        *self.last_state_change.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.half_open_successes.store(0, Ordering::Relaxed);
        self.half_open_in_flight.store(0, Ordering::Relaxed);

        #[cfg(feature = "tracing")]
        tracing::info!(circuit = %config.name, from = ?previous, to = ?state, "circuit breaker state transition");
        #[cfg(feature = "metrics")]
        {
            metrics::counter!(
                "circuitbreaker_transitions_total",
                "circuit" => config.name.clone(),
                "to" => format!("{:?}", state)
            )
            .increment(1);
            metrics::gauge!("circuitbreaker_state", "circuit" => config.name.clone())
                .set(state as u8 as f64);
        }
        #[cfg(not(any(feature = "tracing", feature = "metrics")))]
        let _ = config;
    }

    /// Returns true if a call is permitted right now, transitioning
    /// OPEN -> HALF_OPEN if the reset timeout has elapsed.
    pub(crate) fn try_acquire(&self, config: &CircuitBreakerConfig) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.last_state_change().elapsed() >= config.reset_timeout {
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.half_open_in_flight.fetch_add(1, Ordering::AcqRel);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                let in_flight = self.half_open_in_flight.fetch_add(1, Ordering::AcqRel);
                if in_flight < config.max_requests {
                    true
                } else {
                    self.half_open_in_flight.fetch_sub(1, Ordering::AcqRel);
                    false
                }
            }
        }
    }

    pub(crate) fn record_success(&self, config: &CircuitBreakerConfig) {
        self.total_successes.fetch_add(1, Ordering::Relaxed);
        match self.state() {
            CircuitState::HalfOpen => {
                let successes = self.half_open_successes.fetch_add(1, Ordering::AcqRel) + 1;
                self.half_open_in_flight.fetch_sub(1, Ordering::AcqRel);
                if successes >= config.success_threshold {
                    self.transition_to(CircuitState::Closed, config);
                }
            }
            _ => {
                self.consecutive_failures.store(0, Ordering::Relaxed);
            }
        }
    }

    /// Records a transient failure. Non-transient (soft) failures must not
    /// be passed here at all (spec §4.3: HTTP 4xx / type errors are not
    /// counted) — callers filter before calling.
    pub(crate) fn record_failure(&self, config: &CircuitBreakerConfig) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        match self.state() {
            CircuitState::HalfOpen => {
                self.half_open_in_flight.fetch_sub(1, Ordering::AcqRel);
                self.transition_to(CircuitState::Open, config);
            }
            CircuitState::Closed => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= config.failure_threshold {
                    self.transition_to(CircuitState::Open, config);
                }
            }
            CircuitState::Open => {}
        }
    }

    pub(crate) fn stats(&self) -> CircuitStats {
        let state = self.state();
        CircuitStats {
            state,
            success_count: self.total_successes.load(Ordering::Relaxed),
            failure_count: self.total_failures.load(Ordering::Relaxed),
            next_attempt_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CircuitBreakerConfig {
        CircuitBreakerConfig::new("test")
            .failure_threshold(3)
            .reset_timeout(std::time::Duration::from_millis(20))
            .success_threshold(2)
    }

    #[test]
    fn opens_after_consecutive_failures() {
        let circuit = Circuit::new();
        let cfg = config();
        assert_eq!(circuit.state(), CircuitState::Closed);
        for _ in 0..3 {
            assert!(circuit.try_acquire(&cfg));
            circuit.record_failure(&cfg);
        }
        assert_eq!(circuit.state(), CircuitState::Open);
        assert!(!circuit.try_acquire(&cfg));
    }

    #[test]
    fn success_resets_consecutive_failure_count() {
        let circuit = Circuit::new();
        let cfg = config();
        circuit.record_failure(&cfg);
        circuit.record_failure(&cfg);
        circuit.record_success(&cfg);
        circuit.record_failure(&cfg);
        circuit.record_failure(&cfg);
        // Only 2 consecutive failures since the success reset the counter.
        assert_eq!(circuit.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_closes_after_success_threshold() {
        let circuit = Circuit::new();
        let cfg = config();
        for _ in 0..3 {
            circuit.record_failure(&cfg);
        }
        assert_eq!(circuit.state(), CircuitState::Open);

        std::thread::sleep(std::time::Duration::from_millis(30));
        assert!(circuit.try_acquire(&cfg));
        assert_eq!(circuit.state(), CircuitState::HalfOpen);

        circuit.record_success(&cfg);
        assert_eq!(circuit.state(), CircuitState::HalfOpen);
        circuit.record_success(&cfg);
        assert_eq!(circuit.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_reopens_on_any_failure() {
        let circuit = Circuit::new();
        let cfg = config();
        for _ in 0..3 {
            circuit.record_failure(&cfg);
        }
        std::thread::sleep(std::time::Duration::from_millis(30));
        assert!(circuit.try_acquire(&cfg));
        circuit.record_failure(&cfg);
        assert_eq!(circuit.state(), CircuitState::Open);
    }

    #[test]
    fn half_open_limits_concurrent_probes() {
        let circuit = Circuit::new();
        let cfg = config();
        for _ in 0..3 {
            circuit.record_failure(&cfg);
        }
        std::thread::sleep(std::time::Duration::from_millis(30));
        assert!(circuit.try_acquire(&cfg));
        // max_requests defaults to 1, so a second concurrent probe is rejected.
        assert!(!circuit.try_acquire(&cfg));
    }
}
