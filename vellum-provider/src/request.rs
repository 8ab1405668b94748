//! The normalized request/response shapes every provider adapter
//! translates to and from its own wire format.

use serde::{Deserialize, Serialize};
use vellum_types::{ContentBlock, Message, StopReason, TokenUsage};

/// How hard the model should think before answering, for providers that
/// support extended reasoning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningEffort {
    /// No extended reasoning.
    None,
    /// Minimal extended reasoning.
    Minimal,
    /// Low extended reasoning.
    Low,
    /// Medium extended reasoning.
    Medium,
    /// High extended reasoning.
    High,
    /// Maximum extended reasoning.
    Xhigh,
}

/// Extended-reasoning configuration. If the target provider does not
/// support reasoning, adapters silently ignore this rather than error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingConfig {
    /// Whether extended reasoning is requested.
    pub enabled: bool,
    /// Token budget for reasoning, if the provider supports a budget
    /// rather than a qualitative effort level.
    pub budget_tokens: Option<u32>,
    /// Qualitative reasoning effort, if the provider uses that axis
    /// instead of a token budget.
    pub reasoning_effort: Option<ReasoningEffort>,
}

/// Sampling parameters common across providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold.
    pub top_p: Option<f32>,
    /// Sequences that stop generation when emitted.
    pub stop_sequences: Vec<String>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: None,
            top_p: None,
            stop_sequences: Vec::new(),
        }
    }
}

/// A tool the model may call, declared with a JSON-schema-shaped input
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool's name, as the model will reference it in tool calls.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema describing valid arguments.
    pub input_schema: serde_json::Value,
}

/// A request to a provider's `complete` or `stream` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The provider-specific model identifier.
    pub model: String,
    /// Ordered conversation messages. System-role messages are
    /// extracted into a dedicated system prompt by adapters that
    /// require it.
    pub messages: Vec<Message>,
    /// Tools the model may invoke.
    pub tools: Vec<ToolDefinition>,
    /// Sampling parameters.
    pub sampling: SamplingParams,
    /// Extended-reasoning configuration, if requested.
    pub thinking: Option<ThinkingConfig>,
}

/// The aggregated result of a non-streaming `complete` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Assistant content blocks (text, thinking, tool calls) in
    /// emission order.
    pub content: Vec<ContentBlock>,
    /// Token usage for the exchange.
    pub usage: TokenUsage,
    /// Why the response ended.
    pub stop_reason: StopReason,
}
