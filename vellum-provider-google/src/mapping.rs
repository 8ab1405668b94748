//! Request/response mapping between Vellum's provider-agnostic types and the
//! Gemini `generateContent` wire format.
//!
//! Gemini has no notion of a tool-call id: a `functionCall` part is
//! identified only by its function `name`, and the matching
//! `functionResponse` must repeat that same name. Vellum's
//! [`ContentBlock::ToolUse`] carries an `id` rather than relying on the
//! name for correlation, so this adapter synthesizes the id *as* the
//! function name on the way in from a response, and sends the
//! `tool_use_id` back out as the `functionResponse` name — which only
//! round-trips correctly when a turn has at most one call per tool name.
//!
//! Reference: <https://ai.google.dev/api/generate-content>

use vellum_provider::{CompletionRequest, CompletionResponse, ProviderError, ToolDefinition};
use vellum_types::{ContentBlock, Message, Role, StopReason, TokenUsage};

/// Build a Gemini `generateContent`/`streamGenerateContent` request body.
#[must_use]
pub(crate) fn to_api_request(req: &CompletionRequest) -> serde_json::Value {
    let contents = map_messages(&req.messages);
    let mut body = serde_json::json!({ "contents": contents });

    let system = system_instruction(&req.messages);
    if !system.is_empty() {
        body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": system }] });
    }

    let mut generation_config = serde_json::Map::new();
    generation_config.insert("maxOutputTokens".into(), serde_json::Value::from(req.sampling.max_tokens));
    if let Some(temp) = req.sampling.temperature {
        generation_config.insert("temperature".into(), serde_json::Value::from(temp));
    }
    if let Some(top_p) = req.sampling.top_p {
        generation_config.insert("topP".into(), serde_json::Value::from(top_p));
    }
    if !req.sampling.stop_sequences.is_empty() {
        generation_config.insert(
            "stopSequences".into(),
            serde_json::Value::Array(req.sampling.stop_sequences.iter().cloned().map(serde_json::Value::String).collect()),
        );
    }
    body["generationConfig"] = serde_json::Value::Object(generation_config);

    if !req.tools.is_empty() {
        body["tools"] = serde_json::json!([{
            "functionDeclarations": req.tools.iter().map(map_tool_definition).collect::<Vec<_>>(),
        }]);
    }

    body
}

fn system_instruction(messages: &[Message]) -> String {
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

fn map_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(map_message)
        .collect()
}

fn map_message(message: &Message) -> serde_json::Value {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "model",
        Role::Tool => "function",
        Role::System => unreachable!("system messages are filtered before mapping"),
    };

    let parts: Vec<serde_json::Value> = message.content.iter().filter_map(map_content_block).collect();
    serde_json::json!({ "role": role, "parts": parts })
}

fn map_content_block(block: &ContentBlock) -> Option<serde_json::Value> {
    match block {
        ContentBlock::Text { text } => Some(serde_json::json!({ "text": text })),
        // Gemini has no request-side analog for replaying a prior
        // reasoning trace; thinking content is dropped on the way out.
        ContentBlock::Thinking { .. } => None,
        ContentBlock::ToolUse { name, input, .. } => Some(serde_json::json!({
            "functionCall": { "name": name, "args": input }
        })),
        ContentBlock::ToolResult { tool_use_id, content, .. } => Some(serde_json::json!({
            "functionResponse": { "name": tool_use_id, "response": { "result": content } }
        })),
    }
}

fn map_tool_definition(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.input_schema,
    })
}

/// Parse a non-streaming `generateContent` response.
pub(crate) fn from_api_response(body: &serde_json::Value) -> Result<CompletionResponse, ProviderError> {
    let candidate = body["candidates"]
        .get(0)
        .ok_or_else(|| ProviderError::InvalidResponse("response has no candidates".to_string()))?;

    let mut content = Vec::new();
    if let Some(parts) = candidate["content"]["parts"].as_array() {
        for part in parts {
            if let Some(text) = part["text"].as_str() {
                content.push(ContentBlock::Text { text: text.to_string() });
            } else if let Some(call) = part.get("functionCall") {
                let name = call["name"].as_str().unwrap_or_default().to_string();
                content.push(ContentBlock::ToolUse { id: name.clone(), name, input: call["args"].clone() });
            }
        }
    }

    let stop_reason = if has_tool_call(&content) {
        StopReason::ToolUse
    } else {
        map_finish_reason(candidate["finishReason"].as_str())
    };
    let usage = &body["usageMetadata"];
    Ok(CompletionResponse {
        content,
        usage: TokenUsage {
            input_tokens: usage["promptTokenCount"].as_u64().unwrap_or(0),
            output_tokens: usage["candidatesTokenCount"].as_u64().unwrap_or(0),
            cached_input_tokens: usage["cachedContentTokenCount"].as_u64().unwrap_or(0),
            cache_write_tokens: 0,
        },
        stop_reason,
    })
}

/// Map Gemini's `finishReason` to [`StopReason`].
///
/// `SAFETY`, `RECITATION`, and other content-moderation reasons have no
/// dedicated [`StopReason`] variant; they are treated as a normal end of
/// turn, same as the content-filter fallback used for other providers.
pub(crate) fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("STOP") | None => StopReason::EndTurn,
        Some(_) => StopReason::EndTurn,
    }
}

/// A candidate carrying a `functionCall` part implies [`StopReason::ToolUse`]
/// even though Gemini's own `finishReason` for that turn is still `"STOP"`.
pub(crate) fn has_tool_call(content: &[ContentBlock]) -> bool {
    content.iter().any(|block| matches!(block, ContentBlock::ToolUse { .. }))
}

#[cfg(test)]
mod tests {
    use vellum_provider::SamplingParams;

    use super::*;

    fn minimal_request() -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![Message::user("hi")],
            tools: vec![],
            sampling: SamplingParams::default(),
            thinking: None,
        }
    }

    #[test]
    fn user_message_maps_to_user_role() {
        let body = to_api_request(&minimal_request());
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn system_message_becomes_system_instruction_and_is_excluded_from_contents() {
        let mut request = minimal_request();
        request.messages.insert(0, Message::system("be terse"));
        let body = to_api_request(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn assistant_role_maps_to_model() {
        let request = CompletionRequest { messages: vec![Message::assistant("ok")], ..minimal_request() };
        let body = to_api_request(&request);
        assert_eq!(body["contents"][0]["role"], "model");
    }

    #[test]
    fn tool_result_maps_to_function_role_with_response() {
        let request = CompletionRequest { messages: vec![Message::tool_result("search", "42", false)], ..minimal_request() };
        let body = to_api_request(&request);
        assert_eq!(body["contents"][0]["role"], "function");
        assert_eq!(body["contents"][0]["parts"][0]["functionResponse"]["name"], "search");
        assert_eq!(body["contents"][0]["parts"][0]["functionResponse"]["response"]["result"], "42");
    }

    #[test]
    fn max_output_tokens_defaults() {
        let body = to_api_request(&minimal_request());
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn tool_definitions_are_flattened_into_one_declarations_array() {
        let request = CompletionRequest {
            tools: vec![ToolDefinition { name: "search".to_string(), description: "d".to_string(), input_schema: serde_json::json!({}) }],
            ..minimal_request()
        };
        let body = to_api_request(&request);
        assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], "search");
    }

    #[test]
    fn parses_text_response() {
        let response = serde_json::json!({
            "candidates": [{ "content": { "parts": [{"text": "hi"}] }, "finishReason": "STOP" }],
            "usageMetadata": { "promptTokenCount": 5, "candidatesTokenCount": 2 },
        });
        let parsed = from_api_response(&response).unwrap();
        assert_eq!(parsed.stop_reason, StopReason::EndTurn);
        assert!(matches!(&parsed.content[0], ContentBlock::Text { text } if text == "hi"));
    }

    #[test]
    fn parses_function_call_response_using_name_as_id() {
        let response = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{"functionCall": {"name": "search", "args": {"q": "rust"}}}] },
                "finishReason": "STOP",
            }],
            "usageMetadata": {},
        });
        let parsed = from_api_response(&response).unwrap();
        match &parsed.content[0] {
            ContentBlock::ToolUse { id, name, .. } => assert_eq!(id, name),
            other => panic!("expected ToolUse, got {other:?}"),
        }
        assert!(has_tool_call(&parsed.content));
        assert_eq!(parsed.stop_reason, StopReason::ToolUse);
    }

    #[test]
    fn missing_candidates_is_invalid_response() {
        let response = serde_json::json!({ "candidates": [] });
        assert!(matches!(from_api_response(&response), Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn max_tokens_finish_reason_maps_correctly() {
        assert_eq!(map_finish_reason(Some("MAX_TOKENS")), StopReason::MaxTokens);
    }

    #[test]
    fn safety_finish_reason_falls_back_to_end_turn() {
        assert_eq!(map_finish_reason(Some("SAFETY")), StopReason::EndTurn);
    }
}
