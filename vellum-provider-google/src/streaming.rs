//! SSE parsing for Gemini's `streamGenerateContent?alt=sse` endpoint.
//!
//! Each SSE message is a complete (partial) `GenerateContentResponse`: text
//! parts arrive as incremental deltas, but a `functionCall` part arrives
//! whole in a single chunk — Gemini does not stream a call's arguments
//! incrementally the way Anthropic/OpenAI do. There is no `[DONE]`
//! sentinel; the stream simply ends.

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use vellum_provider::ProviderError;
use vellum_types::{StopReason, StreamEvent, TokenUsage};

use crate::{error, mapping};

/// Turn a raw byte stream into a stream of normalized [`StreamEvent`]s.
pub(crate) fn parse_sse_stream(
    mut bytes: impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
) -> impl Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'static {
    stream! {
        let mut line_buf = String::new();
        let mut data_buf = String::new();
        let mut stop_reason = StopReason::EndTurn;

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
                        match dispatch_chunk(&data_buf, &mut stop_reason) {
                            Ok(events) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            Err(err) => {
                                yield Err(err);
                                break 'outer;
                            }
                        }
                    }
                    data_buf.clear();
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data_buf.push_str(rest.trim_start());
                }
            }
        }

        yield Ok(StreamEvent::End { reason: stop_reason });
    }
}

fn dispatch_chunk(data: &str, stop_reason: &mut StopReason) -> Result<Vec<StreamEvent>, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|err| ProviderError::InvalidResponse(format!("invalid SSE payload: {err}")))?;

    let mut events = Vec::new();
    let Some(candidate) = value["candidates"].get(0) else {
        return Ok(events);
    };

    if let Some(parts) = candidate["content"]["parts"].as_array() {
        for part in parts {
            if let Some(text) = part["text"].as_str().filter(|t| !t.is_empty()) {
                events.push(StreamEvent::Text { delta: text.to_string() });
            } else if let Some(call) = part.get("functionCall") {
                let name = call["name"].as_str().unwrap_or_default().to_string();
                let args = call["args"].clone();
                events.push(StreamEvent::ToolCallStart { id: name.clone(), name });
                events.push(StreamEvent::ToolCallDelta {
                    id: call["name"].as_str().unwrap_or_default().to_string(),
                    delta: args.to_string(),
                });
                events.push(StreamEvent::ToolCallEnd { id: call["name"].as_str().unwrap_or_default().to_string() });
                *stop_reason = StopReason::ToolUse;
            }
        }
    }

    if let Some(reason) = candidate["finishReason"].as_str() {
        if *stop_reason != StopReason::ToolUse {
            *stop_reason = mapping::map_finish_reason(Some(reason));
        }
    }

    if let Some(usage) = value.get("usageMetadata").filter(|u| !u.is_null()) {
        events.push(StreamEvent::Usage {
            usage: TokenUsage {
                input_tokens: usage["promptTokenCount"].as_u64().unwrap_or(0),
                output_tokens: usage["candidatesTokenCount"].as_u64().unwrap_or(0),
                cached_input_tokens: usage["cachedContentTokenCount"].as_u64().unwrap_or(0),
                cache_write_tokens: 0,
            },
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use futures::{pin_mut, stream};

    use super::*;

    fn chunk(s: &str) -> Result<Bytes, reqwest::Error> {
        Ok(Bytes::from(s.to_string()))
    }

    async fn collect(raw: Vec<&str>) -> Vec<Result<StreamEvent, ProviderError>> {
        let source = stream::iter(raw.into_iter().map(chunk));
        let parsed = parse_sse_stream(source);
        pin_mut!(parsed);
        let mut out = Vec::new();
        while let Some(item) = parsed.next().await {
            out.push(item);
        }
        out
    }

    #[tokio::test]
    async fn text_deltas_then_end() {
        let events = collect(vec![
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"promptTokenCount\":3,\"candidatesTokenCount\":2}}\n\n",
        ])
        .await;
        let texts: Vec<_> = events
            .iter()
            .filter_map(|e| match e.as_ref().unwrap() {
                StreamEvent::Text { delta } => Some(delta.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Hel".to_string(), "lo".to_string()]);
        assert!(matches!(events.last().unwrap().as_ref().unwrap(), StreamEvent::End { reason } if *reason == StopReason::EndTurn));
    }

    #[tokio::test]
    async fn function_call_chunk_emits_start_delta_end_and_sets_tool_use_stop_reason() {
        let events = collect(vec![
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"functionCall\":{\"name\":\"search\",\"args\":{\"q\":\"rust\"}}}]},\"finishReason\":\"STOP\"}]}\n\n",
        ])
        .await;
        assert!(matches!(events[0].as_ref().unwrap(), StreamEvent::ToolCallStart { name, .. } if name == "search"));
        assert!(matches!(events.last().unwrap().as_ref().unwrap(), StreamEvent::End { reason } if *reason == StopReason::ToolUse));
    }

    #[tokio::test]
    async fn stream_ending_without_candidates_still_emits_end() {
        let events = collect(vec!["data: {\"candidates\":[]}\n\n"]).await;
        assert!(matches!(events.last().unwrap().as_ref().unwrap(), StreamEvent::End { .. }));
    }

    #[tokio::test]
    async fn invalid_json_surfaces_invalid_response_error() {
        let events = collect(vec!["data: {not json\n\n"]).await;
        assert!(matches!(events[0].as_ref().unwrap_err(), ProviderError::InvalidResponse(_)));
    }
}
