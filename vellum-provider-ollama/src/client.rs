//! The [`Ollama`] adapter: a builder-style client implementing
//! [`vellum_provider::Provider`] over the local Ollama Chat API.

use vellum_provider::{CompletionRequest, CompletionResponse, CompletionStream, Provider, ProviderError};

use crate::{error, mapping, streaming};

/// Default model used when a request does not specify one.
pub const DEFAULT_MODEL: &str = "llama3.2";
/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama Chat API provider adapter. Ollama runs locally (or on a trusted
/// LAN host) and needs no API key.
pub struct Ollama {
    model: String,
    base_url: String,
    keep_alive: Option<String>,
    client: reqwest::Client,
}

impl Ollama {
    /// Create a new client with sensible defaults: [`DEFAULT_MODEL`] and
    /// [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            keep_alive: None,
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

    /// Override the API base URL, e.g. to reach a remote Ollama instance.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the `keep_alive` duration controlling how long the model stays
    /// resident in memory after the request (e.g. `"5m"`, `"0"`).
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

impl Default for Ollama {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let mut body = mapping::to_api_request(&request, &self.model, self.keep_alive.as_deref());
        body["stream"] = serde_json::Value::Bool(false);

        let response = self
            .client
            .post(self.chat_url())
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
        let mut body = mapping::to_api_request(&request, &self.model, self.keep_alive.as_deref());
        body["stream"] = serde_json::Value::Bool(true);

        let response = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(error::map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error::map_http_status(status, &text));
        }
        Ok(Box::pin(streaming::parse_ndjson_stream(response.bytes_stream())))
    }

    fn validate_credential_format(&self, _credential: &str) -> bool {
        // Ollama has no API key; any value (including an empty one) is
        // accepted so the runtime's uniform credential-check path still
        // works for local models.
        true
    }
}
