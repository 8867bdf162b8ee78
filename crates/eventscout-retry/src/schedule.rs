//! Per-attempt timeout schedules (spec §4.4: "adaptive schedule, e.g.
//! 8s/12s/18s for search").

use std::time::Duration;

/// The sequence of per-attempt timeouts for one retried operation.
///
/// When `attempt` runs past the end of the schedule, the last entry is
/// reused rather than panicking.
#[derive(Debug, Clone)]
pub struct TimeoutSchedule(Vec<Duration>);

impl TimeoutSchedule {
    pub fn new(steps: impl Into<Vec<Duration>>) -> Self {
        let steps = steps.into();
        assert!(!steps.is_empty(), "timeout schedule must have at least one step");
        Self(steps)
    }

    pub fn fixed(timeout: Duration) -> Self {
        Self(vec![timeout])
    }

    pub fn timeout_for(&self, attempt: usize) -> Duration {
        self.0[attempt.min(self.0.len() - 1)]
    }

    /// The search stage's default: 8s/12s/18s.
    pub fn search_default() -> Self {
        Self::new(vec![
            Duration::from_secs(8),
            Duration::from_secs(12),
            Duration::from_secs(18),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_default_has_three_steps() {
        let sched = TimeoutSchedule::search_default();
        assert_eq!(sched.timeout_for(0), Duration::from_secs(8));
        assert_eq!(sched.timeout_for(1), Duration::from_secs(12));
        assert_eq!(sched.timeout_for(2), Duration::from_secs(18));
    }

    #[test]
    fn attempt_past_end_reuses_last_step() {
        let sched = TimeoutSchedule::search_default();
        assert_eq!(sched.timeout_for(10), Duration::from_secs(18));
    }

    #[test]
    fn fixed_schedule_repeats_single_step() {
        let sched = TimeoutSchedule::fixed(Duration::from_secs(5));
        assert_eq!(sched.timeout_for(0), Duration::from_secs(5));
        assert_eq!(sched.timeout_for(3), Duration::from_secs(5));
    }
}
