//! Exponential backoff with jitter, used by the agent loop to
//! interpret [`crate::ProviderError::is_retryable`] /
//! [`crate::ProviderError::retry_delay`]. Adapters never retry
//! internally; this helper exists so every caller backs off the same
//! way.

use std::time::Duration;

use rand::Rng;

use crate::error::ProviderError;

/// Exponential backoff with jitter, bounded by a maximum attempt count
/// and a maximum delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the initial try.
    pub max_retries: u32,
    /// Base delay for the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a specific retry ceiling, keeping the
    /// default base/max delay.
    #[must_use]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Whether `attempt` (0-indexed) is still within the retry budget.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        error.is_retryable() && attempt < self.max_retries
    }

    /// The delay to wait before attempt `attempt` (0-indexed),
    /// honoring a server-provided delay on `error` when present and
    /// otherwise computing exponential backoff with jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        if let Some(server_delay) = error.retry_delay() {
            return server_delay;
        }
        let exp = self.base_delay.as_millis().saturating_mul(1u128 << attempt.min(20));
        let capped = exp.min(self.max_delay.as_millis());
        let jittered = rand::thread_rng().gen_range(capped / 2..=capped.max(1));
        Duration::from_millis(jittered as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn honors_server_provided_delay() {
        let policy = RetryPolicy::default();
        let err = ProviderError::RateLimited { retry_after: Some(Duration::from_secs(2)) };
        assert_eq!(policy.delay_for(0, &err), Duration::from_secs(2));
    }

    #[test]
    fn stops_retrying_past_budget() {
        let policy = RetryPolicy::with_max_retries(2);
        let err = ProviderError::Network("reset".into());
        assert!(policy.should_retry(1, &err));
        assert!(!policy.should_retry(2, &err));
    }

    #[test]
    fn never_retries_terminal_errors() {
        let policy = RetryPolicy::default();
        let err = ProviderError::CredentialInvalid("bad key".into());
        assert!(!policy.should_retry(0, &err));
    }

    #[test]
    fn computed_delay_is_bounded_by_max_delay() {
        let policy = RetryPolicy { max_retries: 20, base_delay: Duration::from_millis(100), max_delay: Duration::from_secs(1) };
        let err = ProviderError::Network("reset".into());
        let delay = policy.delay_for(15, &err);
        assert!(delay <= Duration::from_secs(1));
    }
}
