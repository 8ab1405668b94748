//! Composition integration tests.
//!
//! These exercise the `vellum` facade end to end against a fake
//! provider, without any live API keys: building a [`RuntimeContext`]
//! from a [`RuntimeConfig`], registering a tool, and driving a full
//! turn cycle through [`AgentLoop::run`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use vellum::prelude::*;
use vellum_context::ContextError;
use vellum_provider::CompletionStream;

struct FakeProvider {
    turns: Mutex<VecDeque<Vec<Result<StreamEvent, ProviderError>>>>,
}

impl FakeProvider {
    fn new(turns: Vec<Vec<Result<StreamEvent, ProviderError>>>) -> Self {
        Self { turns: Mutex::new(turns.into()) }
    }
}

impl Provider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        unimplemented!("composition tests only exercise the streaming path")
    }

    async fn stream(&self, _request: CompletionRequest) -> Result<CompletionStream, ProviderError> {
        let events = self.turns.lock().unwrap().pop_front().expect("no more queued turns");
        Ok(Box::pin(futures::stream::iter(events)))
    }

    fn validate_credential_format(&self, _credential: &str) -> bool {
        true
    }
}

struct AlwaysApprove;
impl ApprovalResponder for AlwaysApprove {
    async fn request_approval(&self, _call_id: &str, _tool_name: &str, _risk: vellum_types::RiskLevel) -> vellum_permission::ApprovalResponse {
        vellum_permission::ApprovalResponse { decision: ApprovalDecision::Approved, remember: false }
    }
}

struct NoopSummarizer;
impl Summarizer for NoopSummarizer {
    async fn summarize(&self, _messages: &[Message]) -> Result<String, ContextError> {
        Ok("summary".into())
    }
}

struct EchoTool;
impl ToolDyn for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo text back"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "required": ["text"], "properties": {"text": {"type": "string"}}})
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations { side_effect_free: true, idempotent: true }
    }

    fn call(&self, input: Value) -> Pin<Box<dyn Future<Output = Result<vellum_types::ToolResult, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let text = input["text"].as_str().unwrap_or_default().to_string();
            Ok(vellum_types::ToolResult::ok(json!({ "echoed": text })))
        })
    }
}

fn full_trust_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.llm.provider = "fake".into();
    config.llm.model = "fake-model".into();
    config.permissions.mode = TrustMode::Full;
    config
}

#[tokio::test]
async fn minimal_agent_text_response() {
    let provider = FakeProvider::new(vec![vec![
        Ok(StreamEvent::Text { delta: "Paris".into() }),
        Ok(StreamEvent::End { reason: StopReason::EndTurn }),
    ]]);
    let config = full_trust_config();
    let mut context = RuntimeContext::new(&config, provider, ToolRegistry::new(), "/workspace", 100_000);
    let cancel = tokio_util::sync::CancellationToken::new();

    let outcome = context
        .agent_loop
        .run("What is the capital of France?", &AlwaysApprove, &NoopSummarizer, &cancel)
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::EndTurn);
    assert_eq!(outcome.turns, 1);
    assert_eq!(outcome.tool_calls_executed, 0);
}

#[tokio::test]
async fn agent_with_tool_call_resubmits_and_completes() {
    let provider = FakeProvider::new(vec![
        vec![
            Ok(StreamEvent::ToolCallStart { id: "call-1".into(), name: "echo".into() }),
            Ok(StreamEvent::ToolCallDelta { id: "call-1".into(), delta: r#"{"text":"hello"}"#.into() }),
            Ok(StreamEvent::ToolCallEnd { id: "call-1".into() }),
            Ok(StreamEvent::End { reason: StopReason::ToolUse }),
        ],
        vec![Ok(StreamEvent::Text { delta: "I echoed: hello".into() }), Ok(StreamEvent::End { reason: StopReason::EndTurn })],
    ]);
    let config = full_trust_config();
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool));
    let mut context = RuntimeContext::new(&config, provider, tools, "/workspace", 100_000);
    let cancel = tokio_util::sync::CancellationToken::new();

    let outcome = context.agent_loop.run("Echo hello", &AlwaysApprove, &NoopSummarizer, &cancel).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::EndTurn);
    assert_eq!(outcome.turns, 2);
    assert_eq!(outcome.tool_calls_executed, 1);
}

#[tokio::test]
async fn permission_override_blocks_shell_category_without_prompting() {
    let provider = FakeProvider::new(vec![vec![
        Ok(StreamEvent::Text { delta: "no tools needed".into() }),
        Ok(StreamEvent::End { reason: StopReason::EndTurn }),
    ]]);
    let mut config = full_trust_config();
    config.permissions.shell_execute = Some(CategoryOverride::Never);
    let mut context = RuntimeContext::new(&config, provider, ToolRegistry::new(), "/workspace", 100_000);
    let cancel = tokio_util::sync::CancellationToken::new();

    let outcome = context.agent_loop.run("hello", &AlwaysApprove, &NoopSummarizer, &cancel).await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::EndTurn);
    drop(context.lifecycle);
}
