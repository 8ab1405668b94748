//! The [`OpenAI`] adapter: a builder-style client implementing
//! [`vellum_provider::Provider`] over the Chat Completions API.

use vellum_provider::{CompletionRequest, CompletionResponse, CompletionStream, Provider, ProviderError};

use crate::types::StreamOptions;
use crate::{error, mapping, streaming};

/// Default model used when a request does not specify one.
pub const DEFAULT_MODEL: &str = "gpt-4.1";
/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI Chat Completions provider adapter.
///
/// Also works against any OpenAI-compatible endpoint by overriding
/// `base_url` — see [`crate::compatible`] for ready-made constructors for
/// Azure OpenAI, Mistral, and DeepSeek.
pub struct OpenAI {
    api_key: String,
    model: String,
    base_url: String,
    organization: Option<String>,
    client: reqwest::Client,
}

impl OpenAI {
    /// Create a new adapter for `api_key`, defaulting to
    /// [`DEFAULT_MODEL`] and [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
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

    /// Override the API base URL, e.g. to target an OpenAI-compatible
    /// endpoint.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the `OpenAI-Organization` header sent with every request.
    #[must_use]
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, body: &crate::types::ChatRequest) -> Result<reqwest::Response, ProviderError> {
        let mut request = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await.map_err(error::map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = error::parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(error::map_http_status(status, &text, retry_after));
        }
        Ok(response)
    }
}

impl Provider for OpenAI {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let body = mapping::to_api_request(&request, &self.model);
        let response = self.send(&body).await?;
        let parsed: crate::types::ChatResponse = response.json().await.map_err(error::map_reqwest_error)?;
        mapping::from_api_response(parsed)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, ProviderError> {
        let mut body = mapping::to_api_request(&request, &self.model);
        body.stream = true;
        body.stream_options = Some(StreamOptions { include_usage: true });

        let response = self.send(&body).await?;
        Ok(Box::pin(streaming::parse_sse_stream(response.bytes_stream())))
    }

    fn validate_credential_format(&self, credential: &str) -> bool {
        credential.starts_with("sk-") && credential.len() > 20
    }
}
