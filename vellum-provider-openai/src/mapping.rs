//! Request/response mapping between Vellum's provider-agnostic types and the
//! OpenAI Chat Completions wire format.
//!
//! Reference: <https://platform.openai.com/docs/api-reference/chat>

use vellum_provider::{CompletionRequest, CompletionResponse, ProviderError, ReasoningEffort};
use vellum_types::{ContentBlock, Message, Role, StopReason, TokenUsage};

use crate::types::{
    ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall,
};

/// Build an OpenAI Chat Completions request body. `stream`/`stream_options`
/// are set by the caller, since they depend on whether this is a streaming
/// call.
#[must_use]
pub(crate) fn to_api_request(req: &CompletionRequest, default_model: &str) -> ChatRequest {
    let model = if req.model.is_empty() {
        default_model.to_string()
    } else {
        req.model.clone()
    };

    let mut messages = Vec::new();
    let system = system_prompt(&req.messages);
    if !system.is_empty() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: Some(system),
            tool_calls: None,
            tool_call_id: None,
        });
    }
    for message in &req.messages {
        if message.role == Role::System {
            continue;
        }
        messages.extend(map_message(message));
    }

    ChatRequest {
        model,
        messages,
        max_completion_tokens: Some(req.sampling.max_tokens),
        temperature: req.sampling.temperature,
        top_p: req.sampling.top_p,
        stop: req.sampling.stop_sequences.clone(),
        tools: req.tools.iter().map(map_tool_definition).collect(),
        reasoning_effort: req
            .thinking
            .as_ref()
            .filter(|t| t.enabled)
            .map(|t| map_reasoning_effort(t.reasoning_effort)),
        stream: false,
        stream_options: None,
    }
}

fn system_prompt(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.role == Role::System)
        .flat_map(|m| &m.content)
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A Vellum [`Message`] may expand into more than one OpenAI message: a
/// tool-result message carries exactly one `ToolResult` block per Vellum's
/// [`Message::tool_result`], mapping onto one `role: "tool"` message.
fn map_message(message: &Message) -> Vec<ChatMessage> {
    match message.role {
        Role::Tool => message
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => Some(ChatMessage {
                    role: "tool".to_string(),
                    content: Some(content.clone()),
                    tool_calls: None,
                    tool_call_id: Some(tool_use_id.clone()),
                }),
                _ => None,
            })
            .collect(),
        Role::Assistant => {
            let text = join_text(&message.content);
            let tool_calls: Vec<ChatToolCall> = message
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => Some(ChatToolCall {
                        id: id.clone(),
                        call_type: "function",
                        function: ChatFunctionCall {
                            name: name.clone(),
                            arguments: serde_json::to_string(input).unwrap_or_default(),
                        },
                    }),
                    _ => None,
                })
                .collect();
            vec![ChatMessage {
                role: "assistant".to_string(),
                content: if text.is_empty() { None } else { Some(text) },
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
            }]
        }
        Role::User | Role::System => vec![ChatMessage {
            role: "user".to_string(),
            content: Some(join_text(&message.content)),
            tool_calls: None,
            tool_call_id: None,
        }],
    }
}

fn join_text(content: &[ContentBlock]) -> String {
    content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

fn map_tool_definition(tool: &vellum_provider::ToolDefinition) -> ChatTool {
    ChatTool {
        tool_type: "function",
        function: ChatFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        },
    }
}

/// OpenAI's `reasoning_effort` does not have an `xhigh` tier; it is clamped
/// to `high`.
fn map_reasoning_effort(effort: Option<ReasoningEffort>) -> String {
    match effort {
        Some(ReasoningEffort::Low) => "low",
        Some(ReasoningEffort::Medium) | None => "medium",
        Some(ReasoningEffort::High) | Some(ReasoningEffort::Xhigh) => "high",
        Some(ReasoningEffort::None) | Some(ReasoningEffort::Minimal) => "minimal",
    }
    .to_string()
}

/// Parse a non-streaming Chat Completions response.
pub(crate) fn from_api_response(response: ChatResponse) -> Result<CompletionResponse, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))?;

    let mut content = Vec::new();
    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        content.push(ContentBlock::Text { text });
    }
    for call in choice.message.tool_calls {
        let input = serde_json::from_str(&call.function.arguments).unwrap_or_default();
        content.push(ContentBlock::ToolUse {
            id: call.id,
            name: call.function.name,
            input,
        });
    }

    let stop_reason = map_finish_reason(choice.finish_reason.as_deref());
    let usage = TokenUsage {
        input_tokens: response.usage.prompt_tokens,
        output_tokens: response.usage.completion_tokens,
        cached_input_tokens: response
            .usage
            .prompt_tokens_details
            .map(|d| d.cached_tokens)
            .unwrap_or(0),
        cache_write_tokens: 0,
    };

    Ok(CompletionResponse {
        content,
        usage,
        stop_reason,
    })
}

/// Map an OpenAI `finish_reason` to [`StopReason`].
///
/// OpenAI's `"content_filter"` reason has no dedicated equivalent in
/// [`StopReason`]; it is treated as a normal end of turn since the model did
/// stop generating rather than exhausting a resource budget.
pub(crate) fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        Some("stop") | Some("content_filter") | None => StopReason::EndTurn,
        Some(_) => StopReason::EndTurn,
    }
}
