//! Retry policy for rate-limited inference calls.

use std::time::Duration;

/// Bounded retry with exponential backoff, applied only to rate-limit
/// failures. Any other failure is non-retryable.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first rate-limited attempt; doubles per attempt.
    pub backoff_base: Duration,
    /// Upper bound on a single provider call.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after `failed_attempts` rate-limited attempts.
    ///
    /// With the default 2s base this yields 2s after the first failure and
    /// 4s after the second.
    pub fn backoff_after(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        self.backoff_base * 2u32.pow(exponent)
    }
}
