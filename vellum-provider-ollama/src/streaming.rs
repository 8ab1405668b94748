//! NDJSON streaming support for the Ollama Chat API.
//!
//! Unlike Anthropic/OpenAI's SSE, Ollama emits one JSON object per line,
//! with no framing beyond the newline itself:
//! ```text
//! {"model":"llama3.2","message":{"role":"assistant","content":"Hello"},"done":false}
//! {"model":"llama3.2","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop","eval_count":10,"prompt_eval_count":20}
//! ```

use std::collections::HashMap;

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use vellum_provider::ProviderError;
use vellum_types::{StopReason, StreamEvent, TokenUsage};

use crate::mapping;

/// Tracks tool-call ids synthesized for the current line, so a
/// `ToolCallStart`/`ToolCallDelta`/`ToolCallEnd` triple can be emitted for
/// each call even though Ollama reports a call's full arguments in one shot.
#[derive(Debug, Default)]
struct ParserState {
    stop_reason: StopReasonHolder,
}

#[derive(Debug)]
struct StopReasonHolder(StopReason);

impl Default for StopReasonHolder {
    fn default() -> Self {
        Self(StopReason::EndTurn)
    }
}

/// Turn a raw byte stream into a stream of normalized [`StreamEvent`]s.
pub(crate) fn parse_ndjson_stream(
    mut bytes: impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
) -> impl Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'static {
    stream! {
        let mut line_buf = String::new();
        let mut state = ParserState::default();

        loop {
            let chunk = match bytes.next().await {
                None => break,
                Some(Err(err)) => {
                    yield Err(crate::error::map_reqwest_error(err));
                    return;
                }
                Some(Ok(chunk)) => chunk,
            };
            line_buf.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = line_buf.find('\n') {
                let line: String = line_buf.drain(..=pos).collect();
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match process_line(line, &mut state) {
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

        let remaining = line_buf.trim().to_string();
        if !remaining.is_empty() {
            match process_line(&remaining, &mut state) {
                Ok(events) => {
                    for event in events {
                        yield Ok(event);
                    }
                }
                Err(err) => yield Err(err),
            }
        }
    }
}

fn process_line(line: &str, state: &mut ParserState) -> Result<Vec<StreamEvent>, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|err| ProviderError::InvalidResponse(format!("invalid NDJSON line: {err}")))?;

    let mut events = Vec::new();
    let done = value["done"].as_bool().unwrap_or(false);

    if let Some(text) = value["message"]["content"].as_str().filter(|t| !t.is_empty()) {
        events.push(StreamEvent::Text { delta: text.to_string() });
    }

    if let Some(tool_calls) = value["message"]["tool_calls"].as_array() {
        let mut tool_ids = HashMap::new();
        for (index, call) in tool_calls.iter().enumerate() {
            let name = call["function"]["name"].as_str().unwrap_or_default().to_string();
            let arguments = call["function"]["arguments"].clone();
            let id = format!("ollama_{index}_{}", uuid::Uuid::new_v4());
            tool_ids.insert(index, id.clone());
            events.push(StreamEvent::ToolCallStart { id: id.clone(), name });
            events.push(StreamEvent::ToolCallDelta { id: id.clone(), delta: arguments.to_string() });
            events.push(StreamEvent::ToolCallEnd { id });
        }
    }

    if done {
        state.stop_reason.0 = mapping::parse_stop_reason(&value);
        events.push(StreamEvent::Usage {
            usage: TokenUsage {
                input_tokens: value["prompt_eval_count"].as_u64().unwrap_or(0),
                output_tokens: value["eval_count"].as_u64().unwrap_or(0),
                cached_input_tokens: 0,
                cache_write_tokens: 0,
            },
        });
        events.push(StreamEvent::End { reason: state.stop_reason.0 });
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
        let parsed = parse_ndjson_stream(source);
        pin_mut!(parsed);
        let mut out = Vec::new();
        while let Some(item) = parsed.next().await {
            out.push(item);
        }
        out
    }

    #[tokio::test]
    async fn text_deltas_accumulate_across_lines() {
        let events = collect(vec![
            "{\"message\":{\"content\":\"Hel\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"lo\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"\"},\"done\":true,\"done_reason\":\"stop\"}\n",
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
    async fn done_emits_usage_then_end() {
        let events = collect(vec![
            "{\"message\":{\"content\":\"\"},\"done\":true,\"done_reason\":\"stop\",\"eval_count\":5,\"prompt_eval_count\":7}\n",
        ])
        .await;
        assert!(matches!(events[0].as_ref().unwrap(), StreamEvent::Usage { usage } if usage.output_tokens == 5 && usage.input_tokens == 7));
        assert!(matches!(events[1].as_ref().unwrap(), StreamEvent::End { reason } if *reason == StopReason::EndTurn));
    }

    #[tokio::test]
    async fn tool_call_triple_emitted_for_each_call() {
        let events = collect(vec![
            "{\"message\":{\"content\":\"\",\"tool_calls\":[{\"function\":{\"name\":\"search\",\"arguments\":{\"q\":\"rust\"}}}]},\"done\":true,\"done_reason\":\"tool_calls\"}\n",
        ])
        .await;
        assert!(matches!(events[0].as_ref().unwrap(), StreamEvent::ToolCallStart { name, .. } if name == "search"));
        assert!(matches!(events[1].as_ref().unwrap(), StreamEvent::ToolCallDelta { .. }));
        assert!(matches!(events[2].as_ref().unwrap(), StreamEvent::ToolCallEnd { .. }));
    }

    #[tokio::test]
    async fn line_split_across_chunks_is_reassembled() {
        let events = collect(vec![
            "{\"message\":{\"content\":\"ok",
            "ay\"},\"done\":false}\n",
        ])
        .await;
        assert!(matches!(events[0].as_ref().unwrap(), StreamEvent::Text { delta } if delta == "okay"));
    }

    #[tokio::test]
    async fn invalid_json_line_surfaces_invalid_response_error() {
        let events = collect(vec!["not json\n"]).await;
        assert!(matches!(events[0].as_ref().unwrap_err(), ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn empty_lines_are_skipped() {
        let events = collect(vec!["\n", "{\"message\":{\"content\":\"hi\"},\"done\":false}\n"]).await;
        assert_eq!(events.len(), 1);
    }
}
