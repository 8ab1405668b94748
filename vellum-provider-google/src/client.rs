//! The [`Google`] adapter: a builder-style client implementing
//! [`vellum_provider::Provider`] over Gemini's `generateContent` REST API.

use vellum_provider::{CompletionRequest, CompletionResponse, CompletionStream, Provider, ProviderError};

use crate::{error, mapping, streaming};

/// Default model used when a request does not specify one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default Generative Language API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` provider adapter. Authenticates via the `key`
/// query parameter, as the Generative Language API expects.
pub struct Google {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl Google {
    /// Create a new adapter for `api_key`, defaulting to [`DEFAULT_MODEL`]
    /// and [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the default model used when a request leaves `model`
    /// empty.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL, e.g. to point at Vertex AI's
    /// Gemini-compatible endpoint.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url.trim_end_matches('/'))
    }
}

impl Provider for Google {
    fn name(&self) -> &str {
        "google"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let model = if request.model.is_empty() { self.model.clone() } else { request.model.clone() };
        let body = mapping::to_api_request(&request);

        let response = self
            .client
            .post(self.endpoint(&model, "generateContent"))
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(error::map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(error::map_reqwest_error)?;
        if !status.is_success() {
            return Err(error::map_http_status(status, &text));
        }
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| ProviderError::InvalidResponse(format!("invalid JSON response: {err}")))?;
        mapping::from_api_response(&value)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, ProviderError> {
        let model = if request.model.is_empty() { self.model.clone() } else { request.model.clone() };
        let body = mapping::to_api_request(&request);

        let response = self
            .client
            .post(self.endpoint(&model, "streamGenerateContent"))
            .query(&[("key", self.api_key.as_str()), ("alt", "sse")])
            .json(&body)
            .send()
            .await
            .map_err(error::map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error::map_http_status(status, &text));
        }
        Ok(Box::pin(streaming::parse_sse_stream(response.bytes_stream())))
    }

    fn validate_credential_format(&self, credential: &str) -> bool {
        !credential.is_empty() && credential.len() > 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let provider = Google::new("key");
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn endpoint_includes_model_and_method() {
        let provider = Google::new("key").model("gemini-2.5-pro");
        assert_eq!(
            provider.endpoint("gemini-2.5-pro", "generateContent"),
            format!("{DEFAULT_BASE_URL}/models/gemini-2.5-pro:generateContent")
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let provider = Google::new("key").base_url("https://proxy.internal/v1beta/");
        assert_eq!(provider.endpoint("m", "generateContent"), "https://proxy.internal/v1beta/models/m:generateContent");
    }

    #[test]
    fn credential_format_rejects_short_keys() {
        let provider = Google::new("key");
        assert!(provider.validate_credential_format("AIzaSyabcdefghijklmnop"));
        assert!(!provider.validate_credential_format("short"));
    }

    #[test]
    fn name_is_google() {
        assert_eq!(Google::new("k").name(), "google");
    }
}
