//! Maps OpenAI HTTP and transport errors into the normalized
//! [`ProviderError`] taxonomy.

use std::time::Duration;

use reqwest::header::HeaderMap;
use vellum_provider::ProviderError;

/// Map a non-2xx HTTP response into a [`ProviderError`].
///
/// Reference: <https://platform.openai.com/docs/guides/error-codes>
pub(crate) fn map_http_status(
    status: reqwest::StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::CredentialInvalid(body.to_string()),
        400 | 404 | 422 => ProviderError::ApiError(body.to_string()),
        429 => ProviderError::RateLimited {
            retry_after: retry_after.or_else(|| parse_retry_after_from_body(body)),
        },
        500 | 502 | 503 | 504 => ProviderError::ServiceUnavailable(body.to_string()),
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

/// OpenAI sometimes only states the retry delay in the error message body
/// (e.g. "Please retry after 20 seconds"), with no `Retry-After` header.
fn parse_retry_after_from_body(body: &str) -> Option<Duration> {
    let lower = body.to_lowercase();
    let idx = lower.find("retry after ")?;
    let after = &lower[idx + "retry after ".len()..];
    let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().ok().map(Duration::from_secs)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_credential_invalid() {
        assert!(matches!(
            map_http_status(reqwest::StatusCode::UNAUTHORIZED, "bad key", None),
            ProviderError::CredentialInvalid(_)
        ));
    }

    #[test]
    fn bad_request_maps_to_api_error() {
        assert!(matches!(
            map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad schema", None),
            ProviderError::ApiError(_)
        ));
    }

    #[test]
    fn rate_limit_without_header_falls_back_to_body_parse() {
        let err = map_http_status(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "Please retry after 20 seconds",
            None,
        );
        match err {
            ProviderError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(20)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn service_unavailable_statuses() {
        for code in [500, 502, 503, 504] {
            let status = reqwest::StatusCode::from_u16(code).unwrap();
            assert!(matches!(
                map_http_status(status, "down", None),
                ProviderError::ServiceUnavailable(_)
            ));
        }
    }

    #[test]
    fn unrecognized_status_maps_to_unknown() {
        assert!(matches!(
            map_http_status(reqwest::StatusCode::IM_A_TEAPOT, "?", None),
            ProviderError::Unknown(_)
        ));
    }
}
