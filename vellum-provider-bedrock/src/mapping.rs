//! Request/response mapping between Vellum's provider-agnostic types and
//! the Bedrock Converse API wire format.
//!
//! Reference: <https://docs.aws.amazon.com/bedrock/latest/APIReference/API_runtime_Converse.html>

use vellum_provider::{CompletionRequest, CompletionResponse, ProviderError, ToolDefinition};
use vellum_types::{ContentBlock, Message, Role, StopReason, TokenUsage};

/// Build a Bedrock Converse request body.
#[must_use]
pub(crate) fn to_api_request(req: &CompletionRequest) -> serde_json::Value {
    let mut body = serde_json::json!({ "messages": map_messages(&req.messages) });

    let system = system_prompt(&req.messages);
    if !system.is_empty() {
        body["system"] = serde_json::json!([{ "text": system }]);
    }

    let mut inference_config = serde_json::Map::new();
    inference_config.insert("maxTokens".into(), serde_json::Value::from(req.sampling.max_tokens));
    if let Some(temp) = req.sampling.temperature {
        inference_config.insert("temperature".into(), serde_json::Value::from(temp));
    }
    if let Some(top_p) = req.sampling.top_p {
        inference_config.insert("topP".into(), serde_json::Value::from(top_p));
    }
    if !req.sampling.stop_sequences.is_empty() {
        inference_config.insert(
            "stopSequences".into(),
            serde_json::Value::Array(req.sampling.stop_sequences.iter().cloned().map(serde_json::Value::String).collect()),
        );
    }
    body["inferenceConfig"] = serde_json::Value::Object(inference_config);

    if !req.tools.is_empty() {
        body["toolConfig"] = serde_json::json!({
            "tools": req.tools.iter().map(map_tool_definition).collect::<Vec<_>>(),
        });
    }

    body
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

fn map_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(map_message)
        .collect()
}

/// Bedrock has no dedicated tool-result role; like Anthropic, a tool result
/// is carried in a `"user"`-role message as a `toolResult` content block.
fn map_message(message: &Message) -> serde_json::Value {
    let role = match message.role {
        Role::User | Role::Tool => "user",
        Role::Assistant => "assistant",
        Role::System => unreachable!("system messages are filtered before mapping"),
    };
    let content: Vec<serde_json::Value> = message.content.iter().map(map_content_block).collect();
    serde_json::json!({ "role": role, "content": content })
}

fn map_content_block(block: &ContentBlock) -> serde_json::Value {
    match block {
        ContentBlock::Text { text } => serde_json::json!({ "text": text }),
        ContentBlock::Thinking { text } => serde_json::json!({ "reasoningContent": { "reasoningText": { "text": text } } }),
        ContentBlock::ToolUse { id, name, input } => {
            serde_json::json!({ "toolUse": { "toolUseId": id, "name": name, "input": input } })
        }
        ContentBlock::ToolResult { tool_use_id, content, is_error } => serde_json::json!({
            "toolResult": {
                "toolUseId": tool_use_id,
                "content": [{ "text": content }],
                "status": if *is_error { "error" } else { "success" },
            }
        }),
    }
}

fn map_tool_definition(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "toolSpec": {
            "name": tool.name,
            "description": tool.description,
            "inputSchema": { "json": tool.input_schema },
        }
    })
}

/// Parse a non-streaming Converse response.
pub(crate) fn from_api_response(body: &serde_json::Value) -> Result<CompletionResponse, ProviderError> {
    let blocks = body["output"]["message"]["content"]
        .as_array()
        .ok_or_else(|| ProviderError::InvalidResponse("response has no output message content".to_string()))?;

    let mut content = Vec::new();
    for block in blocks {
        if let Some(mapped) = parse_content_block(block)? {
            content.push(mapped);
        }
    }

    let usage = &body["usage"];
    Ok(CompletionResponse {
        content,
        usage: TokenUsage {
            input_tokens: usage["inputTokens"].as_u64().unwrap_or(0),
            output_tokens: usage["outputTokens"].as_u64().unwrap_or(0),
            cached_input_tokens: usage["cacheReadInputTokens"].as_u64().unwrap_or(0),
            cache_write_tokens: usage["cacheWriteInputTokens"].as_u64().unwrap_or(0),
        },
        stop_reason: parse_stop_reason(body["stopReason"].as_str()),
    })
}

fn parse_content_block(block: &serde_json::Value) -> Result<Option<ContentBlock>, ProviderError> {
    if let Some(text) = block["text"].as_str() {
        return Ok(Some(ContentBlock::Text { text: text.to_string() }));
    }
    if let Some(reasoning) = block["reasoningContent"]["reasoningText"]["text"].as_str() {
        return Ok(Some(ContentBlock::Thinking { text: reasoning.to_string() }));
    }
    if let Some(tool_use) = block.get("toolUse") {
        let id = tool_use["toolUseId"]
            .as_str()
            .ok_or_else(|| ProviderError::InvalidResponse("toolUse missing toolUseId".to_string()))?
            .to_string();
        let name = tool_use["name"].as_str().unwrap_or_default().to_string();
        return Ok(Some(ContentBlock::ToolUse { id, name, input: tool_use["input"].clone() }));
    }
    Ok(None)
}

/// Map Bedrock's `stopReason` to [`StopReason`].
///
/// `content_filtered` and `guardrail_intervened` have no dedicated
/// [`StopReason`] variant and are treated as a normal end of turn.
pub(crate) fn parse_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
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
    fn system_messages_become_top_level_system_array() {
        let mut request = minimal_request();
        request.messages.insert(0, Message::system("be terse"));
        let body = to_api_request(&request);
        assert_eq!(body["system"][0]["text"], "be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn tool_role_maps_to_user_with_tool_result() {
        let request = CompletionRequest { messages: vec![Message::tool_result("call_1", "42", false)], ..minimal_request() };
        let body = to_api_request(&request);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["toolResult"]["toolUseId"], "call_1");
        assert_eq!(body["messages"][0]["content"][0]["toolResult"]["status"], "success");
    }

    #[test]
    fn failed_tool_result_sets_error_status() {
        let request = CompletionRequest { messages: vec![Message::tool_result("call_1", "boom", true)], ..minimal_request() };
        let body = to_api_request(&request);
        assert_eq!(body["messages"][0]["content"][0]["toolResult"]["status"], "error");
    }

    #[test]
    fn max_tokens_defaults() {
        let body = to_api_request(&minimal_request());
        assert_eq!(body["inferenceConfig"]["maxTokens"], 4096);
    }

    #[test]
    fn tool_definitions_wrap_in_tool_spec() {
        let request = CompletionRequest {
            tools: vec![ToolDefinition { name: "search".to_string(), description: "d".to_string(), input_schema: serde_json::json!({}) }],
            ..minimal_request()
        };
        let body = to_api_request(&request);
        assert_eq!(body["toolConfig"]["tools"][0]["toolSpec"]["name"], "search");
    }

    #[test]
    fn parses_text_response() {
        let response = serde_json::json!({
            "output": { "message": { "role": "assistant", "content": [{"text": "hi"}] } },
            "stopReason": "end_turn",
            "usage": { "inputTokens": 5, "outputTokens": 2 },
        });
        let parsed = from_api_response(&response).unwrap();
        assert_eq!(parsed.stop_reason, StopReason::EndTurn);
        assert!(matches!(&parsed.content[0], ContentBlock::Text { text } if text == "hi"));
    }

    #[test]
    fn parses_tool_use_response() {
        let response = serde_json::json!({
            "output": { "message": { "content": [{"toolUse": {"toolUseId": "call_1", "name": "search", "input": {"q": "rust"}}}] } },
            "stopReason": "tool_use",
            "usage": {},
        });
        let parsed = from_api_response(&response).unwrap();
        assert_eq!(parsed.stop_reason, StopReason::ToolUse);
        assert!(matches!(&parsed.content[0], ContentBlock::ToolUse { id, .. } if id == "call_1"));
    }

    #[test]
    fn missing_content_is_invalid_response() {
        let response = serde_json::json!({ "output": { "message": {} } });
        assert!(matches!(from_api_response(&response), Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn content_filtered_falls_back_to_end_turn() {
        assert_eq!(parse_stop_reason(Some("content_filtered")), StopReason::EndTurn);
    }
}
