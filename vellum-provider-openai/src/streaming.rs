//! Hand-rolled SSE parsing for the Chat Completions streaming API.
//!
//! OpenAI's stream is plain SSE (`data: {...}\n\n`, no `event:` line)
//! terminated by a literal `data: [DONE]` message. Each chunk carries a
//! `delta` for `choices[0]` keyed by a stable per-call `index`, so tool
//! call arguments must be reassembled across several chunks before the
//! call is considered complete.
//!
//! Reference: <https://platform.openai.com/docs/api-reference/chat-streaming>

use std::collections::HashMap;

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use vellum_provider::ProviderError;
use vellum_types::{StopReason, StreamEvent, TokenUsage};

use crate::{error, mapping};

/// Tracks in-progress tool calls across chunks, keyed by the `index` OpenAI
/// assigns each call within `choices[0].delta.tool_calls`.
#[derive(Debug)]
struct ParserState {
    open_calls: HashMap<u64, String>,
    stop_reason: StopReason,
}

impl Default for ParserState {
    fn default() -> Self {
        Self {
            open_calls: HashMap::new(),
            stop_reason: StopReason::EndTurn,
        }
    }
}

/// Turn a raw byte stream into a stream of normalized [`StreamEvent`]s.
pub(crate) fn parse_sse_stream(
    mut bytes: impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
) -> impl Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'static {
    stream! {
        let mut line_buf = String::new();
        let mut data_buf = String::new();
        let mut state = ParserState::default();
        let mut ended = false;

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
                        if data_buf.trim() == "[DONE]" {
                            for event in flush_open_calls(&mut state) {
                                yield Ok(event);
                            }
                            yield Ok(StreamEvent::End { reason: state.stop_reason });
                            ended = true;
                            data_buf.clear();
                            break 'outer;
                        }
                        match dispatch_chunk(&data_buf, &mut state) {
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

        if !ended {
            yield Ok(StreamEvent::End { reason: state.stop_reason });
        }
    }
}

/// Dispatch one `data:` payload, returning zero or more [`StreamEvent`]s.
fn dispatch_chunk(data: &str, state: &mut ParserState) -> Result<Vec<StreamEvent>, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|err| ProviderError::InvalidResponse(format!("invalid SSE payload: {err}")))?;

    let mut events = Vec::new();

    if let Some(usage) = value.get("usage").filter(|u| !u.is_null()) {
        events.push(StreamEvent::Usage {
            usage: TokenUsage {
                input_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0),
                output_tokens: usage["completion_tokens"].as_u64().unwrap_or(0),
                cached_input_tokens: usage["prompt_tokens_details"]["cached_tokens"]
                    .as_u64()
                    .unwrap_or(0),
                cache_write_tokens: 0,
            },
        });
    }

    let Some(choice) = value["choices"].get(0) else {
        return Ok(events);
    };
    let delta = &choice["delta"];

    if let Some(text) = delta["content"].as_str().filter(|t| !t.is_empty()) {
        events.push(StreamEvent::Text { delta: text.to_string() });
    }
    if let Some(reasoning) = delta["reasoning_content"].as_str().filter(|t| !t.is_empty()) {
        events.push(StreamEvent::Reasoning { delta: reasoning.to_string() });
    }

    if let Some(calls) = delta["tool_calls"].as_array() {
        for call in calls {
            let index = call["index"].as_u64().unwrap_or(0);
            if let Some(id) = call["id"].as_str() {
                let name = call["function"]["name"].as_str().unwrap_or_default().to_string();
                state.open_calls.insert(index, id.to_string());
                events.push(StreamEvent::ToolCallStart { id: id.to_string(), name });
            }
            if let Some(args) = call["function"]["arguments"].as_str().filter(|a| !a.is_empty()) {
                if let Some(id) = state.open_calls.get(&index).cloned() {
                    events.push(StreamEvent::ToolCallDelta { id, delta: args.to_string() });
                }
            }
        }
    }

    if let Some(reason) = choice["finish_reason"].as_str() {
        state.stop_reason = mapping::map_finish_reason(Some(reason));
    }

    Ok(events)
}

/// OpenAI never signals a tool call's end explicitly; a call is implicitly
/// closed once `[DONE]` arrives or the stream ends.
fn flush_open_calls(state: &mut ParserState) -> Vec<StreamEvent> {
    state
        .open_calls
        .drain()
        .map(|(_, id)| StreamEvent::ToolCallEnd { id })
        .collect()
}

#[cfg(test)]
mod tests {
    use futures::{pin_mut, stream};

    use super::*;

    fn chunk(sse: &str) -> Result<Bytes, reqwest::Error> {
        Ok(Bytes::from(sse.to_string()))
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
    async fn text_deltas_accumulate_in_order() {
        let events = collect(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
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
    }

    #[tokio::test]
    async fn done_sentinel_emits_end_event() {
        let events = collect(vec!["data: [DONE]\n\n"]).await;
        assert!(matches!(events.last().unwrap().as_ref().unwrap(), StreamEvent::End { .. }));
    }

    #[tokio::test]
    async fn tool_call_start_and_delta_then_flushed_on_done() {
        let events = collect(vec![
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"search\",\"arguments\":\"\"}}]}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{\\\"q\\\":1}\"}}]}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n",
            "data: [DONE]\n\n",
        ])
        .await;
        assert!(matches!(
            events[0].as_ref().unwrap(),
            StreamEvent::ToolCallStart { id, name } if id == "call_1" && name == "search"
        ));
        assert!(matches!(
            events[1].as_ref().unwrap(),
            StreamEvent::ToolCallDelta { id, .. } if id == "call_1"
        ));
        let has_end_call = events
            .iter()
            .any(|e| matches!(e.as_ref().unwrap(), StreamEvent::ToolCallEnd { id } if id == "call_1"));
        assert!(has_end_call, "expected ToolCallEnd for call_1");
        let last = events.last().unwrap().as_ref().unwrap();
        assert!(matches!(last, StreamEvent::End { reason } if *reason == StopReason::ToolUse));
    }

    #[tokio::test]
    async fn usage_chunk_emits_usage_event() {
        let events = collect(vec![
            "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":5}}\n\n",
            "data: [DONE]\n\n",
        ])
        .await;
        assert!(matches!(
            events[0].as_ref().unwrap(),
            StreamEvent::Usage { usage } if usage.input_tokens == 10 && usage.output_tokens == 5
        ));
    }

    #[tokio::test]
    async fn stream_ending_without_done_still_emits_end() {
        let events = collect(vec!["data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\n"]).await;
        assert!(matches!(events.last().unwrap().as_ref().unwrap(), StreamEvent::End { .. }));
    }

    #[tokio::test]
    async fn invalid_json_surfaces_invalid_response_error() {
        let events = collect(vec!["data: {not json\n\n"]).await;
        assert!(matches!(events[0].as_ref().unwrap_err(), ProviderError::InvalidResponse(_)));
    }
}
