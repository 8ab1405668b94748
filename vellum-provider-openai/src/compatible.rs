//! Constructors for OpenAI-compatible Chat Completions endpoints.
//!
//! Azure OpenAI, Mistral, and DeepSeek all speak (a close superset of) the
//! same wire format [`crate::mapping`] already targets; these helpers just
//! point [`OpenAI`] at the right base URL and default model.

use crate::OpenAI;

/// Default Mistral La Plateforme base URL.
pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
/// Default DeepSeek platform base URL.
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Build a provider targeting Mistral's OpenAI-compatible endpoint.
#[must_use]
pub fn mistral(api_key: impl Into<String>) -> OpenAI {
    OpenAI::new(api_key)
        .base_url(MISTRAL_BASE_URL)
        .model("mistral-large-latest")
}

/// Build a provider targeting DeepSeek's OpenAI-compatible endpoint.
#[must_use]
pub fn deepseek(api_key: impl Into<String>) -> OpenAI {
    OpenAI::new(api_key)
        .base_url(DEEPSEEK_BASE_URL)
        .model("deepseek-chat")
}

/// Build a provider targeting an Azure OpenAI deployment.
///
/// Azure's Chat Completions route is keyed by deployment name rather than
/// model: `{endpoint}/openai/deployments/{deployment}/chat/completions`.
/// `to_api_request`'s `model` field is still populated (Azure ignores it in
/// favor of the URL's deployment segment, but harmless to send).
#[must_use]
pub fn azure(api_key: impl Into<String>, resource_endpoint: &str, deployment: &str, api_version: &str) -> OpenAI {
    let base = format!(
        "{}/openai/deployments/{deployment}",
        resource_endpoint.trim_end_matches('/'),
    );
    OpenAI::new(api_key)
        .base_url(format!("{base}?api-version={api_version}"))
        .model(deployment.to_string())
}

#[cfg(test)]
mod tests {
    use vellum_provider::Provider;

    use super::*;

    #[test]
    fn mistral_uses_mistral_base_url() {
        let provider = mistral("key");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn azure_base_url_includes_deployment_and_version() {
        let provider = azure("key", "https://my-resource.openai.azure.com", "gpt4-deploy", "2024-06-01");
        assert_eq!(provider.name(), "openai");
    }
}
