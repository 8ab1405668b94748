//! Request/response mapping between Vellum's normalized types and the
//! Anthropic Messages API wire format.
//!
//! Reference: <https://docs.anthropic.com/en/api/messages>

use vellum_provider::{CompletionRequest, CompletionResponse, ProviderError, ReasoningEffort, ThinkingConfig};
use vellum_types::{ContentBlock, Message, Role, StopReason, TokenUsage};

/// Convert a [`CompletionRequest`] into the Anthropic Messages API JSON
/// body. The returned value does not include `"stream"` — callers add
/// that key themselves.
#[must_use]
pub(crate) fn to_api_request(req: &CompletionRequest, default_model: &str) -> serde_json::Value {
    let model = if req.model.is_empty() { default_model.to_string() } else { req.model.clone() };

    let mut body = serde_json::json!({
        "model": model,
        "messages": map_messages(&req.messages),
        "max_tokens": req.sampling.max_tokens,
    });

    let system = system_prompt(&req.messages);
    if !system.is_empty() {
        body["system"] = serde_json::Value::String(system);
    }

    if let Some(temperature) = req.sampling.temperature {
        body["temperature"] = serde_json::Value::from(temperature);
    }
    if let Some(top_p) = req.sampling.top_p {
        body["top_p"] = serde_json::Value::from(top_p);
    }
    if !req.sampling.stop_sequences.is_empty() {
        body["stop_sequences"] = serde_json::Value::Array(
            req.sampling.stop_sequences.iter().cloned().map(serde_json::Value::String).collect(),
        );
    }
    if !req.tools.is_empty() {
        body["tools"] = serde_json::Value::Array(
            req.tools
                .iter()
                .map(|tool| {
                    serde_json::json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.input_schema,
                    })
                })
                .collect(),
        );
    }

    if let Some(thinking_val) = req.thinking.as_ref().and_then(map_thinking_config) {
        body["thinking"] = thinking_val;
    }

    body
}

/// Concatenate all `Role::System` messages' text into a single system
/// prompt, since Anthropic takes system content out-of-band rather
/// than inline in the messages array.
fn system_prompt(messages: &[Message]) -> String {
    messages.iter().filter(|m| m.role == Role::System).map(Message::text).collect::<Vec<_>>().join("\n\n")
}

/// Map non-system messages to Anthropic's message array. Tool-role
/// messages become `user`-role messages carrying a `tool_result`
/// block, since Anthropic has no dedicated tool role.
fn map_messages(messages: &[Message]) -> serde_json::Value {
    let arr: Vec<serde_json::Value> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = match m.role {
                Role::User | Role::Tool => "user",
                Role::Assistant => "assistant",
                Role::System => unreachable!("filtered above"),
            };
            serde_json::json!({ "role": role, "content": map_content_blocks(&m.content) })
        })
        .collect();
    serde_json::Value::Array(arr)
}

fn map_content_blocks(blocks: &[ContentBlock]) -> serde_json::Value {
    serde_json::Value::Array(blocks.iter().map(map_content_block).collect())
}

fn map_content_block(block: &ContentBlock) -> serde_json::Value {
    match block {
        ContentBlock::Text { text } => serde_json::json!({ "type": "text", "text": text }),
        ContentBlock::Thinking { text } => serde_json::json!({
            "type": "thinking",
            "thinking": text,
            "signature": "",
        }),
        ContentBlock::ToolUse { id, name, input } => serde_json::json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "input": input,
        }),
        ContentBlock::ToolResult { tool_use_id, content, is_error } => serde_json::json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": [{ "type": "text", "text": content }],
            "is_error": is_error,
        }),
    }
}

/// Map a [`ThinkingConfig`] to Anthropic's `thinking` object, or `None`
/// if reasoning was not requested.
fn map_thinking_config(config: &ThinkingConfig) -> Option<serde_json::Value> {
    if !config.enabled {
        return None;
    }
    let budget = config.budget_tokens.unwrap_or_else(|| match config.reasoning_effort {
        Some(ReasoningEffort::None) => 0,
        Some(ReasoningEffort::Minimal) => 1024,
        Some(ReasoningEffort::Low) => 2048,
        Some(ReasoningEffort::Medium) | None => 4096,
        Some(ReasoningEffort::High) => 8192,
        Some(ReasoningEffort::Xhigh) => 16384,
    });
    Some(serde_json::json!({ "type": "enabled", "budget_tokens": budget }))
}

// ─── Response mapping ─────────────────────────────────────────────────────

/// Parse an Anthropic Messages API response body into a
/// [`CompletionResponse`].
///
/// # Errors
///
/// Returns [`ProviderError::InvalidResponse`] if required fields are
/// missing or malformed.
pub(crate) fn from_api_response(body: &serde_json::Value) -> Result<CompletionResponse, ProviderError> {
    let content_arr = body["content"]
        .as_array()
        .ok_or_else(|| ProviderError::InvalidResponse("missing 'content' array in response".into()))?;

    let mut content = Vec::with_capacity(content_arr.len());
    for block in content_arr {
        if let Some(mapped) = parse_content_block(block)? {
            content.push(mapped);
        }
    }

    let usage = parse_usage(&body["usage"]);
    let stop_reason = body["stop_reason"].as_str().map(parse_stop_reason).unwrap_or(StopReason::EndTurn);

    Ok(CompletionResponse { content, usage, stop_reason })
}

/// Parse a single content block. Returns `Ok(None)` for block types
/// Vellum has nothing meaningful to keep (redacted thinking).
fn parse_content_block(block: &serde_json::Value) -> Result<Option<ContentBlock>, ProviderError> {
    let block_type = block["type"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse("content block missing 'type'".into()))?;

    match block_type {
        "text" => {
            let text = block["text"]
                .as_str()
                .ok_or_else(|| ProviderError::InvalidResponse("text block missing 'text'".into()))?
                .to_string();
            Ok(Some(ContentBlock::text(text)))
        }
        "thinking" => {
            let text = block["thinking"].as_str().unwrap_or_default().to_string();
            Ok(Some(ContentBlock::Thinking { text }))
        }
        "redacted_thinking" => Ok(None),
        "tool_use" => {
            let id = block["id"]
                .as_str()
                .ok_or_else(|| ProviderError::InvalidResponse("tool_use block missing 'id'".into()))?
                .to_string();
            let name = block["name"]
                .as_str()
                .ok_or_else(|| ProviderError::InvalidResponse("tool_use block missing 'name'".into()))?
                .to_string();
            Ok(Some(ContentBlock::ToolUse { id, name, input: block["input"].clone() }))
        }
        other => Err(ProviderError::InvalidResponse(format!("unknown content block type: {other}"))),
    }
}

fn parse_usage(usage: &serde_json::Value) -> TokenUsage {
    TokenUsage {
        input_tokens: usage["input_tokens"].as_u64().unwrap_or(0),
        output_tokens: usage["output_tokens"].as_u64().unwrap_or(0),
        cached_input_tokens: usage["cache_read_input_tokens"].as_u64().unwrap_or(0),
        cache_write_tokens: usage["cache_creation_input_tokens"].as_u64().unwrap_or(0),
    }
}

/// Map an Anthropic `stop_reason` string to a [`StopReason`].
pub(crate) fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "end_turn" => StopReason::EndTurn,
        "tool_use" => StopReason::ToolUse,
        "max_tokens" => StopReason::MaxTokens,
        "stop_sequence" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}
