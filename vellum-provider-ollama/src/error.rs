//! Maps Ollama HTTP and transport errors into the normalized
//! [`ProviderError`] taxonomy.

use vellum_provider::ProviderError;

/// Map a non-2xx HTTP response into a [`ProviderError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        404 => ProviderError::ApiError(format!("model not found: {body}")),
        400 | 422 => ProviderError::ApiError(body.to_string()),
        500..=599 => ProviderError::ServiceUnavailable(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to a [`ProviderError`].
///
/// Ollama is typically reached over `localhost`; a connection failure
/// almost always means the Ollama server isn't running, which is worth
/// distinguishing in the message from a generic network error.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_connect() {
        ProviderError::Network(format!("could not reach Ollama server: {err}"))
    } else if err.is_timeout() {
        ProviderError::Network(format!("timed out: {err}"))
    } else {
        ProviderError::Network(err.to_string())
    }
}
