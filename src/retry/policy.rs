//! Retry policy for transient upstream statuses.
//!
//! Pure exponential backoff: `initial_delay * multiplier^attempt`, capped at
//! `max_delay`. Jitter is available but off by default.

use rand::Rng;
use std::time::Duration;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Backoff multiplier (for exponential backoff)
    pub backoff_multiplier: f64,
    /// Jitter percentage (0.0 to 1.0); 0 disables jitter
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never retry.
    pub fn disabled() -> Self {
        Self::default().with_max_retries(0)
    }

    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// 429 and every 5xx are transient; everything else is final.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        status == 429 || (500..=599).contains(&status)
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(base_ms as u64).min(self.max_delay);

        if self.jitter_factor > 0.0 {
            self.add_jitter(delay)
        } else {
            delay
        }
    }

    fn add_jitter(&self, delay: Duration) -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_range = delay.as_millis() as f64 * self.jitter_factor;
        let jitter = rng.gen_range(-jitter_range..=jitter_range);

        let new_delay = delay.as_millis() as f64 + jitter;
        Duration::from_millis(new_delay.max(0.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_double_from_two_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.calculate_delay(0), Duration::from_millis(2000));
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(4000));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(8000));
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy::default().with_max_delay(Duration::from_secs(5));
        assert_eq!(policy.calculate_delay(2), Duration::from_secs(5));
    }

    #[test]
    fn jitter_stays_within_range() {
        let policy = RetryPolicy::default().with_jitter_factor(0.25);
        for _ in 0..50 {
            let d = policy.calculate_delay(0).as_millis();
            assert!((1500..=2500).contains(&d), "delay {d} out of range");
        }
    }

    #[test]
    fn retryable_statuses() {
        let policy = RetryPolicy::default();
        for status in [429, 500, 502, 503, 599] {
            assert!(policy.is_retryable_status(status), "{status}");
        }
        for status in [200, 400, 401, 403, 404, 499, 600] {
            assert!(!policy.is_retryable_status(status), "{status}");
        }
    }
}
