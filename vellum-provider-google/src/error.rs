//! Maps Gemini HTTP and transport errors into the normalized
//! [`ProviderError`] taxonomy.

use vellum_provider::ProviderError;

/// Map a non-2xx HTTP response into a [`ProviderError`].
///
/// Reference: <https://ai.google.dev/gemini-api/docs/troubleshooting>
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::CredentialInvalid(body.to_string()),
        400 | 404 => ProviderError::ApiError(body.to_string()),
        429 => ProviderError::RateLimited { retry_after: None },
        500 | 503 => ProviderError::ServiceUnavailable(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to a [`ProviderError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Network(format!("timed out: {err}"))
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
            map_http_status(reqwest::StatusCode::UNAUTHORIZED, "bad key"),
            ProviderError::CredentialInvalid(_)
        ));
    }

    #[test]
    fn rate_limit_maps_to_rate_limited() {
        assert!(matches!(
            map_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ProviderError::RateLimited { .. }
        ));
    }

    #[test]
    fn server_error_maps_to_service_unavailable() {
        assert!(matches!(
            map_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            ProviderError::ServiceUnavailable(_)
        ));
    }
}
