//! Hand-rolled SSE parsing for the Anthropic Messages streaming API.
//!
//! Reference: <https://docs.anthropic.com/en/docs/build-with-claude/streaming>

use std::collections::HashMap;

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use vellum_provider::ProviderError;
use vellum_types::{StopReason, StreamEvent, TokenUsage};

use crate::{error, mapping};

/// Running state carried across one turn's worth of SSE messages.
#[derive(Debug)]
struct ParserState {
    /// Maps a content-block index to the tool-use id opened at that
    /// index, so `content_block_delta`/`content_block_stop` (which only
    /// carry an index) can be attributed to the right call.
    tool_ids: HashMap<u64, String>,
    /// Stop reason learned from `message_delta`, surfaced when
    /// `message_stop` arrives.
    stop_reason: StopReason,
}

impl Default for ParserState {
    fn default() -> Self {
        Self {
            tool_ids: HashMap::new(),
            stop_reason: StopReason::EndTurn,
        }
    }
}

/// Turn a raw byte stream (as returned by `reqwest::Response::bytes_stream`)
/// into a stream of normalized [`StreamEvent`]s.
pub(crate) fn parse_sse_stream(
    mut bytes: impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
) -> impl Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'static {
    stream! {
        let mut line_buf = String::new();
        let mut event_name = String::new();
        let mut data_buf = String::new();
        let mut state = ParserState::default();

        'outer: loop {
            let chunk = match bytes.next().await {
                None => break,
                Some(Err(err)) => {
                    yield Err(error::map_reqwest_error(err));
                    return;
                }
                Some(Ok(chunk)) => chunk,
            };
            line_buf.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = line_buf.find('\n') {
                let line: String = line_buf.drain(..=pos).collect();
                let line = line.trim_end_matches(['\r', '\n']);

                if line.is_empty() {
                    if !data_buf.is_empty() {
                        match dispatch_event(&event_name, &data_buf, &mut state) {
                            Ok(Some(event)) => yield Ok(event),
                            Ok(None) => {}
                            Err(err) => {
                                yield Err(err);
                                break 'outer;
                            }
                        }
                    }
                    event_name.clear();
                    data_buf.clear();
                } else if let Some(rest) = line.strip_prefix("event:") {
                    event_name = rest.trim_start().to_string();
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data_buf.push_str(rest.trim_start());
                }
                // Other fields (id:, retry:, `:` comments) are ignored.
            }
        }
    }
}

/// Dispatch one complete SSE message. Returns at most one [`StreamEvent`];
/// events with nothing meaningful to surface (`ping`, `message_start`
/// text/thinking block opens, `signature_delta`) return `Ok(None)`.
fn dispatch_event(
    event_name: &str,
    data: &str,
    state: &mut ParserState,
) -> Result<Option<StreamEvent>, ProviderError> {
    if event_name == "ping" {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|err| ProviderError::InvalidResponse(format!("invalid SSE payload: {err}")))?;

    match event_name {
        "message_start" => {
            let usage = &value["message"]["usage"];
            Ok(Some(StreamEvent::Usage {
                usage: TokenUsage {
                    input_tokens: usage["input_tokens"].as_u64().unwrap_or(0),
                    output_tokens: 0,
                    cached_input_tokens: usage["cache_read_input_tokens"].as_u64().unwrap_or(0),
                    cache_write_tokens: usage["cache_creation_input_tokens"].as_u64().unwrap_or(0),
                },
            }))
        }
        "content_block_start" => {
            let index = value["index"].as_u64().unwrap_or(0);
            let block = &value["content_block"];
            if block["type"].as_str() == Some("tool_use") {
                let id = block["id"].as_str().unwrap_or_default().to_string();
                let name = block["name"].as_str().unwrap_or_default().to_string();
                state.tool_ids.insert(index, id.clone());
                Ok(Some(StreamEvent::ToolCallStart { id, name }))
            } else {
                Ok(None)
            }
        }
        "content_block_delta" => {
            let index = value["index"].as_u64().unwrap_or(0);
            let delta = &value["delta"];
            match delta["type"].as_str() {
                Some("text_delta") => {
                    Ok(Some(StreamEvent::Text { delta: delta["text"].as_str().unwrap_or_default().to_string() }))
                }
                Some("thinking_delta") => Ok(Some(StreamEvent::Reasoning {
                    delta: delta["thinking"].as_str().unwrap_or_default().to_string(),
                })),
                Some("input_json_delta") => {
                    let id = state.tool_ids.get(&index).cloned().unwrap_or_default();
                    Ok(Some(StreamEvent::ToolCallDelta {
                        id,
                        delta: delta["partial_json"].as_str().unwrap_or_default().to_string(),
                    }))
                }
                // signature_delta and anything future: nothing to surface.
                _ => Ok(None),
            }
        }
        "content_block_stop" => {
            let index = value["index"].as_u64().unwrap_or(0);
            Ok(state.tool_ids.remove(&index).map(|id| StreamEvent::ToolCallEnd { id }))
        }
        "message_delta" => {
            if let Some(reason) = value["delta"]["stop_reason"].as_str() {
                state.stop_reason = mapping::parse_stop_reason(reason);
            }
            Ok(Some(StreamEvent::Usage {
                usage: TokenUsage {
                    input_tokens: 0,
                    output_tokens: value["usage"]["output_tokens"].as_u64().unwrap_or(0),
                    cached_input_tokens: 0,
                    cache_write_tokens: 0,
                },
            }))
        }
        "message_stop" => Ok(Some(StreamEvent::End { reason: state.stop_reason })),
        "error" => {
            let error_type = value["error"]["type"].as_str().unwrap_or("unknown");
            let message = value["error"]["message"].as_str().unwrap_or_default().to_string();
            Err(match error_type {
                "overloaded_error" => ProviderError::ServiceUnavailable(message),
                "rate_limit_error" => ProviderError::RateLimited { retry_after: None },
                "authentication_error" | "permission_error" => ProviderError::CredentialInvalid(message),
                "invalid_request_error" => ProviderError::ApiError(message),
                _ => ProviderError::Unknown(message),
            })
        }
        _ => Ok(None),
    }
}
