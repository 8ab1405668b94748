//! The [`Bedrock`] adapter: a builder-style client implementing
//! [`vellum_provider::Provider`] over the Bedrock Runtime Converse API.

use vellum_provider::{CompletionRequest, CompletionResponse, CompletionStream, Provider, ProviderError};

use crate::{error, mapping, streaming};

/// Default model id used when a request does not specify one.
pub const DEFAULT_MODEL: &str = "anthropic.claude-3-5-sonnet-20241022-v2:0";
/// Default AWS region for the Bedrock Runtime endpoint.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Bedrock Runtime Converse API provider adapter.
///
/// Authenticates with a long-lived Bedrock API key sent as a bearer
/// token, rather than signing each request with AWS SigV4 — the
/// corresponding credential chain (`aws-sigv4`, `aws-credential-types`)
/// is outside this workspace's dependency set, and Bedrock API keys cover
/// the same runtime surface this adapter needs.
pub struct Bedrock {
    api_key: String,
    model: String,
    region: String,
    client: reqwest::Client,
}

impl Bedrock {
    /// Create a new adapter for `api_key`, defaulting to [`DEFAULT_MODEL`]
    /// and [`DEFAULT_REGION`].
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            region: DEFAULT_REGION.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the default model id used when a request leaves `model`
    /// empty.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the AWS region the Bedrock Runtime endpoint resolves to.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    fn endpoint(&self, model: &str, operation: &str) -> String {
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/{operation}",
            self.region,
            urlencode_model_id(model),
        )
    }

    fn error_type(response: &reqwest::Response) -> Option<String> {
        response.headers().get("x-amzn-errortype").and_then(|v| v.to_str().ok()).map(|v| {
            v.split(':').next().unwrap_or(v).to_string()
        })
    }
}

/// Bedrock model ids contain `:` and `.`, neither of which are valid in a
/// URL path segment without encoding.
fn urlencode_model_id(model: &str) -> String {
    model.replace(':', "%3A")
}

impl Provider for Bedrock {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let model = if request.model.is_empty() { self.model.clone() } else { request.model.clone() };
        let body = mapping::to_api_request(&request);

        let response = self
            .client
            .post(self.endpoint(&model, "converse"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(error::map_reqwest_error)?;
        let status = response.status();
        let error_type = Self::error_type(&response);
        let text = response.text().await.map_err(error::map_reqwest_error)?;
        if !status.is_success() {
            return Err(error::map_http_status(status, error_type.as_deref(), &text));
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
            .post(self.endpoint(&model, "converse-stream"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(error::map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let error_type = Self::error_type(&response);
            let text = response.text().await.unwrap_or_default();
            return Err(error::map_http_status(status, error_type.as_deref(), &text));
        }
        Ok(Box::pin(streaming::parse_event_stream(response.bytes_stream())))
    }

    fn validate_credential_format(&self, credential: &str) -> bool {
        !credential.is_empty() && credential.len() > 20
    }
}
