//! The default [`Summarizer`]: a dedicated, non-streaming provider
//! request asking for a compact replacement transcript.

use vellum_context::{ContextError, Summarizer};
use vellum_provider::{CompletionRequest, Provider, SamplingParams, ToolDefinition};
use vellum_types::{ContentBlock, Message};

const SUMMARY_SYSTEM_PROMPT: &str = "Produce a compact summary of the conversation so far. \
Preserve goals, constraints, established facts, open decisions, and pending next actions. \
Do not include tool-call mechanics; write for a reader who must continue the work.";

/// Asks `provider` to summarize older turns, scoped to a single model.
pub struct ProviderSummarizer<'a, P> {
    provider: &'a P,
    model: String,
}

impl<'a, P: Provider> ProviderSummarizer<'a, P> {
    /// Summarize using `provider` against `model`.
    #[must_use]
    pub fn new(provider: &'a P, model: impl Into<String>) -> Self {
        Self { provider, model: model.into() }
    }
}

impl<P: Provider> Summarizer for ProviderSummarizer<'_, P> {
    async fn summarize(&self, messages: &[Message]) -> Result<String, ContextError> {
        let mut request_messages = vec![Message::system(SUMMARY_SYSTEM_PROMPT)];
        request_messages.extend_from_slice(messages);

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: request_messages,
            tools: Vec::<ToolDefinition>::new(),
            sampling: SamplingParams { max_tokens: 1024, ..SamplingParams::default() },
            thinking: None,
        };

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| ContextError::CompactionFailed(e.to_string()))?;

        let text: String = response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(ContextError::CompactionFailed("summarizer returned no text".into()));
        }

        Ok(text)
    }
}
