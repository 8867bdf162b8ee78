//! Exponential backoff with jitter (spec §4.4: `base * 2^attempt` plus
//! jitter uniformly in `[0, 0.2] * current`).

use crate::config::RetryConfig;
use std::time::Duration;

pub fn next_delay(config: &RetryConfig, attempt: usize) -> Duration {
    let exp = 2u32.saturating_pow(attempt as u32);
    let current = config.base_delay.saturating_mul(exp);
    let jitter_span = current.mul_f64(config.jitter_factor.clamp(0.0, 1.0));
    let jitter = if jitter_span.is_zero() {
        Duration::ZERO
    } else {
        jitter_span.mul_f64(rand::random::<f64>())
    };
    current + jitter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_each_attempt_before_jitter() {
        let config = RetryConfig::new("t").base_delay(Duration::from_millis(100)).jitter_factor(0.0);
        assert_eq!(next_delay(&config, 0), Duration::from_millis(100));
        assert_eq!(next_delay(&config, 1), Duration::from_millis(200));
        assert_eq!(next_delay(&config, 2), Duration::from_millis(400));
    }

    #[test]
    fn jitter_stays_within_configured_span() {
        let config = RetryConfig::new("t").base_delay(Duration::from_millis(100)).jitter_factor(0.2);
        for _ in 0..50 {
            let delay = next_delay(&config, 0);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(120));
        }
    }
}
