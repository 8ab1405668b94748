//! Maps Anthropic HTTP and transport errors into the normalized
//! [`ProviderError`] taxonomy.

use std::time::Duration;

use reqwest::header::HeaderMap;
use vellum_provider::ProviderError;

/// Map a non-2xx HTTP response into a [`ProviderError`].
///
/// Reference: <https://docs.anthropic.com/en/api/errors>
pub(crate) fn map_http_status(
    status: reqwest::StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::CredentialInvalid(body.to_string()),
        400 | 404 | 422 => ProviderError::ApiError(body.to_string()),
        429 => ProviderError::RateLimited { retry_after },
        // 529 is Anthropic's overloaded status.
        529 => ProviderError::ServiceUnavailable(body.to_string()),
        500..=528 | 530..=599 => ProviderError::ServiceUnavailable(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {status}: {body}")),
    }
}

/// Parse a `Retry-After` header (seconds) into a [`Duration`].
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Map a [`reqwest::Error`] to a [`ProviderError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Network(format!("timed out: {err}"))
    } else if err.is_connect() {
        ProviderError::Network(format!("connection failed: {err}"))
    } else {
        ProviderError::Network(err.to_string())
    }
}
