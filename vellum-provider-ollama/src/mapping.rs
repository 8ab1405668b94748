//! Request/response mapping between Vellum's provider-agnostic types and the
//! Ollama Chat API format.
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-chat-completion>

use vellum_provider::{CompletionRequest, CompletionResponse, ProviderError, ToolDefinition};
use vellum_types::{ContentBlock, Message, Role, StopReason, TokenUsage};

/// Convert a [`CompletionRequest`] into the Ollama Chat API JSON body.
///
/// The returned value does **not** include `"stream"` — callers add that
/// key.
#[must_use]
pub(crate) fn to_api_request(req: &CompletionRequest, default_model: &str, keep_alive: Option<&str>) -> serde_json::Value {
    let model = if req.model.is_empty() {
        default_model.to_string()
    } else {
        req.model.clone()
    };

    let messages = map_messages(&req.messages);
    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
    });

    let mut options = serde_json::Map::new();
    options.insert("num_predict".into(), serde_json::Value::from(req.sampling.max_tokens));
    if let Some(temp) = req.sampling.temperature {
        options.insert("temperature".into(), serde_json::Value::from(temp));
    }
    if let Some(top_p) = req.sampling.top_p {
        options.insert("top_p".into(), serde_json::Value::from(top_p));
    }
    if !req.sampling.stop_sequences.is_empty() {
        options.insert(
            "stop".into(),
            serde_json::Value::Array(req.sampling.stop_sequences.iter().cloned().map(serde_json::Value::String).collect()),
        );
    }
    body["options"] = serde_json::Value::Object(options);

    if !req.tools.is_empty() {
        body["tools"] = serde_json::Value::Array(req.tools.iter().map(map_tool_definition).collect());
    }

    if let Some(ka) = keep_alive {
        body["keep_alive"] = serde_json::Value::String(ka.to_string());
    }

    body
}

/// Map a list of [`Message`]s to Ollama's message array format. Ollama's
/// chat API has no dedicated tool-result role; Vellum's `Role::Tool`
/// messages are mapped onto `"tool"`, which recent Ollama releases accept.
fn map_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages.iter().map(map_message).collect()
}

fn map_message(message: &Message) -> serde_json::Value {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
        Role::Tool => "tool",
    };
    let mut out = serde_json::json!({ "role": role });

    let text = join_text(&message.content);
    if !text.is_empty() {
        out["content"] = serde_json::Value::String(text);
    }

    let tool_calls: Vec<serde_json::Value> = message
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { name, input, .. } => Some(serde_json::json!({
                "function": { "name": name, "arguments": input }
            })),
            _ => None,
        })
        .collect();
    if !tool_calls.is_empty() {
        out["tool_calls"] = serde_json::Value::Array(tool_calls);
    }

    out
}

fn join_text(content: &[ContentBlock]) -> String {
    content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::ToolResult { content, is_error, .. } => {
                Some(if *is_error { format!("Error: {content}") } else { content.clone() })
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn map_tool_definition(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

/// Parse a non-streaming Ollama Chat API response.
pub(crate) fn from_api_response(body: &serde_json::Value) -> Result<CompletionResponse, ProviderError> {
    let message = &body["message"];
    let mut content = Vec::new();

    if let Some(text) = message["content"].as_str().filter(|t| !t.is_empty()) {
        content.push(ContentBlock::Text { text: text.to_string() });
    }

    if let Some(tool_calls) = message["tool_calls"].as_array() {
        for call in tool_calls {
            let name = call["function"]["name"].as_str().unwrap_or_default().to_string();
            let input = call["function"]["arguments"].clone();
            // Ollama does not assign tool call ids; synthesize a stable one.
            content.push(ContentBlock::ToolUse { id: format!("ollama_{}", uuid::Uuid::new_v4()), name, input });
        }
    }

    Ok(CompletionResponse {
        content,
        usage: parse_usage(body),
        stop_reason: parse_stop_reason(body),
    })
}

fn parse_usage(body: &serde_json::Value) -> TokenUsage {
    TokenUsage {
        input_tokens: body["prompt_eval_count"].as_u64().unwrap_or(0),
        output_tokens: body["eval_count"].as_u64().unwrap_or(0),
        cached_input_tokens: 0,
        cache_write_tokens: 0,
    }
}

/// Parse the stop reason from Ollama's `done_reason` field, falling back to
/// inspecting whether the message carries tool calls when the field is
/// absent or unrecognized.
pub(crate) fn parse_stop_reason(body: &serde_json::Value) -> StopReason {
    match body["done_reason"].as_str() {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls") => StopReason::ToolUse,
        _ => {
            let has_tool_calls = body["message"]["tool_calls"]
                .as_array()
                .is_some_and(|a| !a.is_empty());
            if has_tool_calls { StopReason::ToolUse } else { StopReason::EndTurn }
        }
    }
}
