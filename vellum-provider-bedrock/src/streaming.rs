//! Parses Bedrock's `ConverseStream` response body.
//!
//! Unlike every other adapter in this workspace, Bedrock does not speak
//! SSE or NDJSON: the body is AWS's binary `application/vnd.amazon.eventstream`
//! framing. Each frame carries a small header section (name/value pairs,
//! the interesting one being `:event-type`) and a JSON payload that is the
//! Converse event itself (`messageStart`, `contentBlockDelta`, ...).
//!
//! Reference: <https://docs.aws.amazon.com/IoT/latest/developerguide/iot-message-protocol.html>
//! (general frame layout) and
//! <https://docs.aws.amazon.com/bedrock/latest/APIReference/API_runtime_ConverseStream.html>
//! (event payload shapes).

use bytes::{Buf, Bytes};
use futures::{Stream, StreamExt};
use vellum_provider::ProviderError;
use vellum_types::{StopReason, StreamEvent, TokenUsage};

use crate::mapping;

const PRELUDE_LEN: usize = 8;
const CRC_LEN: usize = 4;

/// One decoded event-stream frame: its `:event-type` header value and raw
/// JSON payload.
struct Frame {
    event_type: String,
    payload: serde_json::Value,
}

/// Turn a raw byte stream into [`StreamEvent`]s.
pub(crate) fn parse_event_stream(
    mut bytes: impl Stream<Item = reqwest::Result<Bytes>> + Unpin + Send + 'static,
) -> impl Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'static {
    async_stream::stream! {
        let mut buf = Vec::new();
        let mut open_tool: Option<(String, String)> = None;
        let mut stop_reason = StopReason::EndTurn;

        loop {
            match bytes.next().await {
                Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    yield Err(crate::error::map_reqwest_error(err));
                    return;
                }
                None => break,
            }

            while let Some((frame, consumed)) = take_frame(&buf) {
                buf.drain(..consumed);
                match dispatch_frame(frame, &mut open_tool, &mut stop_reason) {
                    Ok(events) => {
                        for event in events {
                            yield Ok(event);
                        }
                    }
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        }

        yield Ok(StreamEvent::End { reason: stop_reason });
    }
}

/// Extract one complete frame from the front of `buf`, if enough bytes
/// have arrived. Returns the frame and the number of bytes it occupied.
fn take_frame(buf: &[u8]) -> Option<(Frame, usize)> {
    if buf.len() < PRELUDE_LEN + CRC_LEN {
        return None;
    }
    let mut prelude = &buf[..PRELUDE_LEN];
    let total_len = prelude.get_u32() as usize;
    let headers_len = prelude.get_u32() as usize;

    if buf.len() < total_len {
        return None;
    }

    let headers_start = PRELUDE_LEN;
    let headers_end = headers_start + headers_len;
    let payload_end = total_len - CRC_LEN;

    let event_type = parse_headers(&buf[headers_start..headers_end]).unwrap_or_else(|| "unknown".to_string());
    let payload_bytes = &buf[headers_end..payload_end];
    let payload = serde_json::from_slice(payload_bytes).unwrap_or(serde_json::Value::Null);

    Some((Frame { event_type, payload }, total_len))
}

/// Walk the header section looking for the `:event-type` header (type byte
/// 7 = a length-prefixed UTF-8 string value).
fn parse_headers(mut headers: &[u8]) -> Option<String> {
    let mut event_type = None;
    while !headers.is_empty() {
        if headers.len() < 1 {
            break;
        }
        let name_len = headers[0] as usize;
        headers = &headers[1..];
        if headers.len() < name_len + 1 {
            break;
        }
        let name = String::from_utf8_lossy(&headers[..name_len]).into_owned();
        headers = &headers[name_len..];
        let value_type = headers[0];
        headers = &headers[1..];

        match value_type {
            7 => {
                if headers.len() < 2 {
                    break;
                }
                let value_len = u16::from_be_bytes([headers[0], headers[1]]) as usize;
                headers = &headers[2..];
                if headers.len() < value_len {
                    break;
                }
                let value = String::from_utf8_lossy(&headers[..value_len]).into_owned();
                headers = &headers[value_len..];
                if name == ":event-type" {
                    event_type = Some(value);
                }
            }
            _ => break,
        }
    }
    event_type
}

fn dispatch_frame(
    frame: Frame,
    open_tool: &mut Option<(String, String)>,
    stop_reason: &mut StopReason,
) -> Result<Vec<StreamEvent>, ProviderError> {
    let mut events = Vec::new();
    let payload = &frame.payload;

    match frame.event_type.as_str() {
        "contentBlockStart" => {
            if let Some(tool_use) = payload["start"]["toolUse"].as_object() {
                let id = tool_use.get("toolUseId").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let name = tool_use.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                events.push(StreamEvent::ToolCallStart { id: id.clone(), name });
                *open_tool = Some((id, String::new()));
            }
        }
        "contentBlockDelta" => {
            if let Some(text) = payload["delta"]["text"].as_str() {
                events.push(StreamEvent::Text { delta: text.to_string() });
            } else if let Some(reasoning) = payload["delta"]["reasoningContent"]["text"].as_str() {
                events.push(StreamEvent::Reasoning { delta: reasoning.to_string() });
            } else if let Some(partial) = payload["delta"]["toolUse"]["input"].as_str() {
                if let Some((id, _)) = open_tool.as_mut() {
                    events.push(StreamEvent::ToolCallDelta { id: id.clone(), delta: partial.to_string() });
                }
            }
        }
        "contentBlockStop" => {
            if let Some((id, _)) = open_tool.take() {
                events.push(StreamEvent::ToolCallEnd { id });
            }
        }
        "messageStop" => {
            *stop_reason = mapping::parse_stop_reason(payload["stopReason"].as_str());
        }
        "metadata" => {
            let usage = &payload["usage"];
            if !usage.is_null() {
                events.push(StreamEvent::Usage {
                    usage: TokenUsage {
                        input_tokens: usage["inputTokens"].as_u64().unwrap_or(0),
                        output_tokens: usage["outputTokens"].as_u64().unwrap_or(0),
                        cached_input_tokens: usage["cacheReadInputTokens"].as_u64().unwrap_or(0),
                        cache_write_tokens: usage["cacheWriteInputTokens"].as_u64().unwrap_or(0),
                    },
                });
            }
        }
        "messageStart" | "ping" => {}
        "internalServerException" | "modelStreamErrorException" | "validationException" | "throttlingException" => {
            let message = payload["message"].as_str().unwrap_or("bedrock stream error").to_string();
            return Err(ProviderError::ApiError(message));
        }
        _ => {}
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_frame(event_type: &str, payload: &serde_json::Value) -> Vec<u8> {
        let payload_bytes = serde_json::to_vec(payload).unwrap();

        let mut headers = Vec::new();
        headers.push(b":event-type".len() as u8);
        headers.extend_from_slice(b":event-type");
        headers.push(7);
        headers.extend_from_slice(&(event_type.len() as u16).to_be_bytes());
        headers.extend_from_slice(event_type.as_bytes());

        let total_len = PRELUDE_LEN + headers.len() + payload_bytes.len() + CRC_LEN;
        let mut frame = Vec::new();
        frame.extend_from_slice(&(total_len as u32).to_be_bytes());
        frame.extend_from_slice(&(headers.len() as u32).to_be_bytes());
        frame.extend_from_slice(&headers);
        frame.extend_from_slice(&payload_bytes);
        frame.extend_from_slice(&[0u8; CRC_LEN]);
        frame
    }

    #[test]
    fn parses_single_text_delta_frame() {
        let frame_bytes = encode_frame("contentBlockDelta", &serde_json::json!({ "delta": { "text": "hi" } }));
        let (frame, consumed) = take_frame(&frame_bytes).expect("frame should parse");
        assert_eq!(consumed, frame_bytes.len());
        assert_eq!(frame.event_type, "contentBlockDelta");
        assert_eq!(frame.payload["delta"]["text"], "hi");
    }

    #[test]
    fn incomplete_frame_returns_none() {
        let frame_bytes = encode_frame("contentBlockDelta", &serde_json::json!({ "delta": { "text": "hi" } }));
        assert!(take_frame(&frame_bytes[..frame_bytes.len() - 5]).is_none());
    }

    #[test]
    fn dispatch_text_delta() {
        let frame = Frame { event_type: "contentBlockDelta".to_string(), payload: serde_json::json!({ "delta": { "text": "hi" } }) };
        let mut open_tool = None;
        let mut stop_reason = StopReason::EndTurn;
        let events = dispatch_frame(frame, &mut open_tool, &mut stop_reason).unwrap();
        assert!(matches!(&events[0], StreamEvent::Text { delta } if delta == "hi"));
    }

    #[test]
    fn dispatch_tool_use_triple() {
        let mut open_tool = None;
        let mut stop_reason = StopReason::EndTurn;

        let start = Frame {
            event_type: "contentBlockStart".to_string(),
            payload: serde_json::json!({ "start": { "toolUse": { "toolUseId": "call_1", "name": "search" } } }),
        };
        let start_events = dispatch_frame(start, &mut open_tool, &mut stop_reason).unwrap();
        assert!(matches!(&start_events[0], StreamEvent::ToolCallStart { id, name } if id == "call_1" && name == "search"));

        let delta = Frame {
            event_type: "contentBlockDelta".to_string(),
            payload: serde_json::json!({ "delta": { "toolUse": { "input": "{\"q\":1}" } } }),
        };
        let delta_events = dispatch_frame(delta, &mut open_tool, &mut stop_reason).unwrap();
        assert!(matches!(&delta_events[0], StreamEvent::ToolCallDelta { id, .. } if id == "call_1"));

        let stop = Frame { event_type: "contentBlockStop".to_string(), payload: serde_json::Value::Null };
        let stop_events = dispatch_frame(stop, &mut open_tool, &mut stop_reason).unwrap();
        assert!(matches!(&stop_events[0], StreamEvent::ToolCallEnd { id } if id == "call_1"));
    }

    #[test]
    fn dispatch_message_stop_sets_stop_reason() {
        let frame = Frame { event_type: "messageStop".to_string(), payload: serde_json::json!({ "stopReason": "max_tokens" }) };
        let mut open_tool = None;
        let mut stop_reason = StopReason::EndTurn;
        dispatch_frame(frame, &mut open_tool, &mut stop_reason).unwrap();
        assert_eq!(stop_reason, StopReason::MaxTokens);
    }

    #[test]
    fn dispatch_throttling_exception_is_error() {
        let frame = Frame {
            event_type: "throttlingException".to_string(),
            payload: serde_json::json!({ "message": "too many requests" }),
        };
        let mut open_tool = None;
        let mut stop_reason = StopReason::EndTurn;
        assert!(dispatch_frame(frame, &mut open_tool, &mut stop_reason).is_err());
    }

    #[test]
    fn dispatch_metadata_emits_usage() {
        let frame = Frame {
            event_type: "metadata".to_string(),
            payload: serde_json::json!({ "usage": { "inputTokens": 3, "outputTokens": 7 } }),
        };
        let mut open_tool = None;
        let mut stop_reason = StopReason::EndTurn;
        let events = dispatch_frame(frame, &mut open_tool, &mut stop_reason).unwrap();
        assert!(matches!(&events[0], StreamEvent::Usage { usage } if usage.input_tokens == 3 && usage.output_tokens == 7));
    }
}
