//! Provider error taxonomy.

use std::time::Duration;

/// Errors raised by a [`crate::Provider`] implementation.
///
/// Every variant is either retryable or terminal; see
/// [`ProviderError::is_retryable`]. Adapters never retry internally —
/// callers (the agent loop, via [`crate::RetryPolicy`]) decide whether
/// and how to retry.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network-level failure (connection reset, DNS failure, timeout
    /// before any byte was received).
    #[error("network error: {0}")]
    Network(String),
    /// Rate limited by the provider. `retry_after` carries the
    /// server-provided delay when present (e.g. a parsed `Retry-After`
    /// header).
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested retry delay, if the provider supplied one.
        retry_after: Option<Duration>,
    },
    /// The provider returned a 5xx or otherwise reported transient
    /// unavailability.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Credentials were rejected or missing. Never retryable.
    #[error("credential invalid: {0}")]
    CredentialInvalid(String),
    /// The request was malformed per the provider's own validation.
    /// Never retryable.
    #[error("api error: {0}")]
    ApiError(String),
    /// The request was cancelled by the caller. Never retryable.
    #[error("cancelled")]
    Cancelled,
    /// The response could not be parsed into the normalized shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Any other error.
    #[error("{0}")]
    Unknown(String),
}

impl ProviderError {
    /// Whether this error is likely transient and the request can be
    /// retried, per the failure-semantics table: rate limits and
    /// service unavailability are retryable; credential, request, and
    /// cancellation errors are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::ServiceUnavailable(_)
        )
    }

    /// The server-suggested retry delay, if this error carries one.
    #[must_use]
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::ServiceUnavailable(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}
