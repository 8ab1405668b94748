//! Maps Bedrock HTTP and transport errors into the normalized
//! [`ProviderError`] taxonomy.

use vellum_provider::ProviderError;

/// Map a non-2xx HTTP response into a [`ProviderError`].
///
/// Bedrock's Converse API reports its error kind via the
/// `x-amzn-errortype` header rather than a JSON body field, so the header
/// is checked first and the status code is the fallback.
///
/// Reference: <https://docs.aws.amazon.com/bedrock/latest/APIReference/CommonErrors.html>
pub(crate) fn map_http_status(status: reqwest::StatusCode, error_type: Option<&str>, body: &str) -> ProviderError {
    match error_type {
        Some("ThrottlingException") => return ProviderError::RateLimited { retry_after: None },
        Some("ValidationException" | "ModelErrorException") => return ProviderError::ApiError(body.to_string()),
        Some("AccessDeniedException" | "UnrecognizedClientException") => {
            return ProviderError::CredentialInvalid(body.to_string());
        }
        Some("ModelNotReadyException" | "ServiceUnavailableException") => {
            return ProviderError::ServiceUnavailable(body.to_string());
        }
        _ => {}
    }

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
