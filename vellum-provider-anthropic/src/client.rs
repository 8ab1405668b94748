//! The [`Anthropic`] adapter: a builder-style client implementing
//! [`vellum_provider::Provider`] over the Messages API.

use vellum_provider::{CompletionRequest, CompletionResponse, CompletionStream, Provider, ProviderError};

use crate::{error, mapping, streaming};

/// Default model used when a request does not specify one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
/// Default Anthropic API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider adapter.
pub struct Anthropic {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl Anthropic {
    /// Create a new adapter for `api_key`, defaulting to
    /// [`DEFAULT_MODEL`] and [`DEFAULT_BASE_URL`].
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

    /// Override the API base URL, e.g. to point at a proxy.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, body: serde_json::Value) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(error::map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = error::parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(error::map_http_status(status, &text, retry_after));
        }
        Ok(response)
    }
}

impl Provider for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let mut body = mapping::to_api_request(&request, &self.model);
        body["stream"] = serde_json::Value::Bool(false);

        let response = self.send(body).await?;
        let value: serde_json::Value = response.json().await.map_err(error::map_reqwest_error)?;
        mapping::from_api_response(&value)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, ProviderError> {
        let mut body = mapping::to_api_request(&request, &self.model);
        body["stream"] = serde_json::Value::Bool(true);

        let response = self.send(body).await?;
        Ok(Box::pin(streaming::parse_sse_stream(response.bytes_stream())))
    }

    fn validate_credential_format(&self, credential: &str) -> bool {
        credential.starts_with("sk-ant-") && credential.len() > 20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_default_model_and_base_url() {
        let provider = Anthropic::new("sk-ant-test");
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn builder_overrides_model_and_base_url() {
        let provider = Anthropic::new("sk-ant-test").model("claude-haiku-4-5").base_url("https://proxy.internal");
        assert_eq!(provider.model, "claude-haiku-4-5");
        assert_eq!(provider.messages_url(), "https://proxy.internal/v1/messages");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let provider = Anthropic::new("sk-ant-test").base_url("https://proxy.internal/");
        assert_eq!(provider.messages_url(), "https://proxy.internal/v1/messages");
    }

    #[test]
    fn credential_format_requires_sk_ant_prefix() {
        let provider = Anthropic::new("sk-ant-test");
        assert!(provider.validate_credential_format("sk-ant-REDACTED"));
        assert!(!provider.validate_credential_format("sk-proj-abcdefghijklmnop"));
        assert!(!provider.validate_credential_format("sk-ant-short"));
    }

    #[test]
    fn name_is_anthropic() {
        assert_eq!(Anthropic::new("k").name(), "anthropic");
    }
}
