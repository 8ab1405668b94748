//! The agent loop: drives the request/response/tool cycle over a
//! single [`Provider`] for the lifetime of a session.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use vellum_context::{compact, derive_state, effective_history, Summarizer, ThresholdTable};
use vellum_hooks::{HookAction, HookContext, HookPoint, HookRegistry, LifecycleEvent, LifecycleSender};
use vellum_permission::{ApprovalDecision, ApprovalResponder, PermissionEngine};
use vellum_provider::{CompletionRequest, Provider, ToolDefinition};
use vellum_tool::ToolRegistry;
use vellum_types::{
    ContentBlock, ContextLevel, ContextState, Message, RiskLevel, Session, StopReason, StreamAccumulator,
    StreamEvent, TokenUsage, ToolResult,
};

use crate::config::LoopConfig;
use crate::error::LoopError;
use crate::responder::LifecycleResponder;

/// The outcome of a completed [`AgentLoop::run`] call.
#[derive(Debug)]
pub struct LoopOutcome {
    /// Why the final turn stopped.
    pub stop_reason: StopReason,
    /// Number of request/response turns consumed (tool-use resubmissions
    /// count as additional turns).
    pub turns: u32,
    /// Total tool calls executed across every turn.
    pub tool_calls_executed: u32,
    /// Token usage accumulated across every turn.
    pub usage: TokenUsage,
}

/// Drives the turn-by-turn cycle between a provider, the tool
/// registry, and the permission engine for one session.
///
/// Generic over `P: Provider` only; the summarizer and approval
/// responder are supplied per call to [`AgentLoop::run`] rather than
/// stored, since neither needs to outlive a single turn.
pub struct AgentLoop<P: Provider> {
    provider: P,
    model: String,
    tools: ToolRegistry,
    base_risks: HashMap<String, RiskLevel>,
    permission_engine: PermissionEngine,
    hooks: HookRegistry,
    lifecycle: LifecycleSender,
    thresholds: ThresholdTable,
    estimator: vellum_context::TokenEstimator,
    config: LoopConfig,
    session: Session,
}

impl<P: Provider> AgentLoop<P> {
    /// Create a loop with a fresh session.
    #[must_use]
    pub fn new(
        provider: P,
        model: impl Into<String>,
        tools: ToolRegistry,
        permission_engine: PermissionEngine,
        lifecycle: LifecycleSender,
        config: LoopConfig,
    ) -> Self {
        let context = ContextState { estimated_tokens: 0, window_tokens: config.window_tokens, level: ContextLevel::Healthy };
        Self {
            provider,
            model: model.into(),
            tools,
            base_risks: HashMap::new(),
            permission_engine,
            hooks: HookRegistry::new(),
            lifecycle,
            thresholds: ThresholdTable::with_builtins(),
            estimator: vellum_context::TokenEstimator::new(),
            config,
            session: Session::new(context),
        }
    }

    /// Resume driving an already-loaded session (e.g. from
    /// `vellum_persistence::SessionStorage::load`) instead of starting
    /// fresh.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Declare a tool's baseline risk, consulted by the permission
    /// engine before argument-based escalation.
    pub fn set_base_risk(&mut self, tool_name: impl Into<String>, risk: RiskLevel) {
        self.base_risks.insert(tool_name.into(), risk);
    }

    /// Append an observation/intervention hook to the pipeline.
    pub fn add_hook(&mut self, hook: Arc<dyn vellum_hooks::Hook>) {
        self.hooks.add(hook);
    }

    /// Register a custom context-window threshold pattern, taking
    /// precedence over the built-in table.
    ///
    /// # Errors
    ///
    /// Returns a [`vellum_context::ContextError`] if `profile` or
    /// `pattern` is invalid.
    pub fn register_threshold(
        &mut self,
        pattern: impl Into<String>,
        profile: vellum_context::ThresholdProfile,
    ) -> Result<(), vellum_context::ContextError> {
        self.thresholds.register(pattern, profile)
    }

    /// The current session, including absorbed (compacted) originals.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access to the tool registry.
    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    fn base_risk_for(&self, tool_name: &str) -> RiskLevel {
        self.base_risks.get(tool_name).copied().unwrap_or(RiskLevel::Medium)
    }

    async fn dispatch_hook(&self, point: HookPoint, turns_completed: u32, tokens_used: u64) -> HookAction {
        let mut ctx = HookContext::new(point);
        ctx.turns_completed = turns_completed;
        ctx.tokens_used = tokens_used;
        self.hooks.dispatch(&ctx).await
    }

    async fn emit_complete(&self, reason: StopReason) {
        let _ = self.lifecycle.send(LifecycleEvent::Complete { reason }).await;
    }

    /// Submit `input` as a user turn and drive the loop until
    /// `end_turn` (or an equivalent terminal stop reason), a
    /// cancellation, or a configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError`] on provider failure, context overflow,
    /// cancellation, a hook halt, or a `maxTurns`/`maxToolCalls` limit.
    pub async fn run(
        &mut self,
        input: impl Into<String>,
        responder: &impl ApprovalResponder,
        summarizer: &impl Summarizer,
        cancel: &CancellationToken,
    ) -> Result<LoopOutcome, LoopError> {
        self.session.push(Message::user(input));

        let mut total_usage = TokenUsage::default();
        let mut turns: u32 = 0;
        let mut tool_calls_executed: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                self.emit_complete(StopReason::Cancelled).await;
                return Err(LoopError::Cancelled);
            }

            if let Some(max) = self.config.max_turns {
                if turns >= max {
                    return Err(LoopError::MaxTurns(max));
                }
            }

            if let HookAction::Halt { reason } = self.dispatch_hook(HookPoint::ExitCheck, turns, total_usage.total()).await {
                return Err(LoopError::HookHalted(reason));
            }

            if self.config.context_management_enabled {
                let profile = self.thresholds.resolve(&self.model);
                compact(&mut self.session.messages, self.config.window_tokens, &profile, &self.estimator, summarizer).await?;
                self.session.context = derive_state(&self.session.messages, self.config.window_tokens, &profile, &self.estimator);
            }

            if let HookAction::Halt { reason } = self.dispatch_hook(HookPoint::PreInference, turns, total_usage.total()).await {
                return Err(LoopError::HookHalted(reason));
            }

            let effective: Vec<Message> =
                effective_history(&self.session.messages, self.config.include_summaries).into_iter().cloned().collect();
            let request = CompletionRequest {
                model: self.model.clone(),
                messages: effective,
                tools: self
                    .tools
                    .iter()
                    .map(|tool| ToolDefinition {
                        name: tool.name().to_string(),
                        description: tool.description().to_string(),
                        input_schema: tool.input_schema(),
                    })
                    .collect(),
                sampling: self.config.sampling.clone(),
                thinking: self.config.thinking.clone(),
            };

            let (content, usage, stop_reason) = self.stream_turn(request, cancel).await?;
            total_usage.accumulate(&usage);
            turns += 1;

            let tool_calls: Vec<(String, String, serde_json::Value)> = content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => Some((id.clone(), name.clone(), input.clone())),
                    _ => None,
                })
                .collect();

            self.session.push(Message::assistant_blocks(content));

            if let HookAction::Halt { reason } = self.dispatch_hook(HookPoint::PostInference, turns, total_usage.total()).await {
                return Err(LoopError::HookHalted(reason));
            }

            if stop_reason == StopReason::Compaction {
                continue;
            }

            if tool_calls.is_empty() || stop_reason != StopReason::ToolUse {
                self.emit_complete(stop_reason).await;
                return Ok(LoopOutcome { stop_reason, turns, tool_calls_executed, usage: total_usage });
            }

            if let Some(max) = self.config.max_tool_calls {
                if tool_calls_executed.saturating_add(tool_calls.len() as u32) > max {
                    return Err(LoopError::MaxToolCalls(max));
                }
            }

            if cancel.is_cancelled() {
                self.emit_complete(StopReason::Cancelled).await;
                return Err(LoopError::Cancelled);
            }

            let (messages, cancelled) = self.run_tool_calls(&tool_calls, responder, cancel).await?;
            tool_calls_executed += tool_calls.len() as u32;
            for message in messages {
                self.session.push(message);
            }

            if cancelled {
                self.emit_complete(StopReason::Cancelled).await;
                return Err(LoopError::Cancelled);
            }
        }
    }

    /// Consume a single provider stream, retrying on retryable errors
    /// per [`vellum_provider::RetryPolicy`] as long as no content has
    /// been delivered yet for this attempt — retrying after partial
    /// output would duplicate text.
    async fn stream_turn(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<(Vec<ContentBlock>, TokenUsage, StopReason), LoopError> {
        let mut attempt = 0u32;
        'retry: loop {
            let mut stream = match self.provider.stream(request.clone()).await {
                Ok(stream) => stream,
                Err(err) => {
                    if self.config.retry.should_retry(attempt, &err) {
                        let delay = self.config.retry.delay_for(attempt, &err);
                        attempt += 1;
                        tokio::time::sleep(delay).await;
                        continue 'retry;
                    }
                    return Err(LoopError::Provider(err));
                }
            };

            let mut accumulator = StreamAccumulator::new();
            let mut emitted_any_content = false;

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        return Err(LoopError::Cancelled);
                    }
                    next = stream.next() => {
                        match next {
                            Some(Ok(event)) => {
                                match &event {
                                    StreamEvent::Text { delta } => {
                                        emitted_any_content = true;
                                        let _ = self.lifecycle.send(LifecycleEvent::Text { delta: delta.clone() }).await;
                                    }
                                    StreamEvent::Reasoning { delta } => {
                                        emitted_any_content = true;
                                        let _ = self.lifecycle.send(LifecycleEvent::Reasoning { delta: delta.clone() }).await;
                                    }
                                    _ => {}
                                }
                                accumulator.push(event);
                            }
                            Some(Err(err)) => {
                                if !emitted_any_content && self.config.retry.should_retry(attempt, &err) {
                                    let delay = self.config.retry.delay_for(attempt, &err);
                                    attempt += 1;
                                    tokio::time::sleep(delay).await;
                                    continue 'retry;
                                }
                                return Err(LoopError::Provider(err));
                            }
                            None => return Ok(accumulator.finish()),
                        }
                    }
                }
            }
        }
    }

    /// Run a turn's tool calls, in parallel if every one of them is
    /// declared side-effect-free, else serially in emission order.
    async fn run_tool_calls(
        &self,
        calls: &[(String, String, serde_json::Value)],
        responder: &impl ApprovalResponder,
        cancel: &CancellationToken,
    ) -> Result<(Vec<Message>, bool), LoopError> {
        let all_side_effect_free = calls.len() > 1
            && calls
                .iter()
                .all(|(_, name, _)| self.tools.get(name).is_some_and(|tool| tool.annotations().side_effect_free));

        if all_side_effect_free {
            let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_tools.max(1)));
            let futures = calls.iter().map(|(id, name, input)| {
                let semaphore = semaphore.clone();
                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore is never closed");
                    self.execute_one(id, name, input, responder, cancel).await
                }
            });
            let outcomes = futures::future::join_all(futures).await;
            let mut messages = Vec::with_capacity(outcomes.len());
            let mut cancelled = false;
            for outcome in outcomes {
                let (message, was_cancelled) = outcome?;
                messages.push(message);
                cancelled |= was_cancelled;
            }
            Ok((messages, cancelled))
        } else {
            let mut messages = Vec::with_capacity(calls.len());
            for (id, name, input) in calls {
                let (message, cancelled) = self.execute_one(id, name, input, responder, cancel).await?;
                messages.push(message);
                if cancelled {
                    return Ok((messages, true));
                }
            }
            Ok((messages, false))
        }
    }

    /// Run the permission/hook/execution pipeline for one tool call,
    /// returning the `tool`-role message to append and whether
    /// cancellation interrupted it mid-flight.
    async fn execute_one(
        &self,
        call_id: &str,
        tool_name: &str,
        input: &serde_json::Value,
        responder: &impl ApprovalResponder,
        cancel: &CancellationToken,
    ) -> Result<(Message, bool), LoopError> {
        let mut pre_ctx = HookContext::new(HookPoint::PreToolUse);
        pre_ctx.tool_name = Some(tool_name.to_string());
        pre_ctx.tool_input = Some(input.clone());

        let mut effective_input = input.clone();
        match self.hooks.dispatch(&pre_ctx).await {
            HookAction::Halt { reason } => return Err(LoopError::HookHalted(reason)),
            HookAction::SkipTool { reason } => {
                return Ok((Message::tool_result(call_id, format!("skipped by policy: {reason}"), true), false));
            }
            HookAction::ModifyToolInput { new_input } => effective_input = new_input,
            HookAction::Continue | HookAction::ModifyToolOutput { .. } => {}
        }

        let base_risk = self.base_risk_for(tool_name);
        let lifecycle_responder = LifecycleResponder::new(responder, &self.lifecycle);
        let decision = self
            .permission_engine
            .decide(call_id, tool_name, base_risk, &effective_input, &lifecycle_responder)
            .await;

        if decision == ApprovalDecision::Denied {
            return Ok((Message::tool_result(call_id, "permission denied", true), false));
        }

        let _ = self
            .lifecycle
            .send(LifecycleEvent::ToolStart {
                call_id: call_id.to_string(),
                name: tool_name.to_string(),
                input: effective_input.clone(),
            })
            .await;

        let invoke = self.tools.invoke(tool_name, effective_input.clone());
        tokio::pin!(invoke);

        let (result, cancelled) = tokio::select! {
            () = cancel.cancelled() => (ToolResult::err("canceled"), true),
            outcome = &mut invoke => {
                match outcome {
                    Ok(result) => (result, false),
                    Err(err) => (ToolResult::err(err.to_string()), false),
                }
            }
        };

        let mut post_ctx = HookContext::new(HookPoint::PostToolUse);
        post_ctx.tool_name = Some(tool_name.to_string());
        post_ctx.tool_result = serde_json::to_value(&result).ok();

        let final_result = match self.hooks.dispatch(&post_ctx).await {
            HookAction::Halt { reason } => return Err(LoopError::HookHalted(reason)),
            HookAction::ModifyToolOutput { new_output } => ToolResult { success: result.success, output: Some(new_output), error: result.error },
            HookAction::Continue | HookAction::SkipTool { .. } | HookAction::ModifyToolInput { .. } => result,
        };

        let _ = self
            .lifecycle
            .send(LifecycleEvent::ToolEnd { call_id: call_id.to_string(), name: tool_name.to_string(), result: final_result.clone() })
            .await;

        let content = if final_result.success {
            final_result.output.as_ref().map(ToString::to_string).unwrap_or_default()
        } else {
            final_result.error.clone().unwrap_or_default()
        };
        Ok((Message::tool_result(call_id, content, !final_result.success), cancelled))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::{json, Value};

    use vellum_hooks::lifecycle_channel;
    use vellum_permission::TrustMode;
    use vellum_provider::{CompletionResponse, ProviderError};
    use vellum_tool::{ToolAnnotations, ToolDyn, ToolError};

    use super::*;

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
            unimplemented!("tests only exercise the streaming path")
        }

        async fn stream(&self, _request: CompletionRequest) -> Result<vellum_provider::CompletionStream, ProviderError> {
            let events = self.turns.lock().unwrap().pop_front().expect("no more queued turns");
            Ok(Box::pin(futures::stream::iter(events)))
        }

        fn validate_credential_format(&self, _credential: &str) -> bool {
            true
        }
    }

    struct AlwaysApprove;
    impl ApprovalResponder for AlwaysApprove {
        async fn request_approval(&self, _call_id: &str, _tool_name: &str, _risk: RiskLevel) -> vellum_permission::ApprovalResponse {
            vellum_permission::ApprovalResponse { decision: ApprovalDecision::Approved, remember: false }
        }
    }

    struct NoopSummarizer;
    impl Summarizer for NoopSummarizer {
        async fn summarize(&self, _messages: &[Message]) -> Result<String, vellum_context::ContextError> {
            Ok("summary".into())
        }
    }

    struct ReadFileTool;
    impl ToolDyn for ReadFileTool {
        fn name(&self) -> &str {
            "read_file"
        }
        fn description(&self) -> &str {
            "Reads a file"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object", "required": ["path"], "properties": {"path": {"type": "string"}}})
        }
        fn annotations(&self) -> ToolAnnotations {
            ToolAnnotations { side_effect_free: true, idempotent: true }
        }
        fn call(&self, _input: Value) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + '_>> {
            Box::pin(async { Ok(ToolResult::ok(json!({"contents": "127.0.0.1 localhost"}))) })
        }
    }

    struct PendingTool;
    impl ToolDyn for PendingTool {
        fn name(&self) -> &str {
            "wait"
        }
        fn description(&self) -> &str {
            "Never returns on its own"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
        fn call(&self, _input: Value) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + '_>> {
            Box::pin(async {
                std::future::pending::<()>().await;
                unreachable!("cancellation should win the race before this resolves")
            })
        }
    }

    fn no_compaction_config() -> LoopConfig {
        LoopConfig { context_management_enabled: false, ..LoopConfig::default() }
    }

    fn event_kind(event: &LifecycleEvent) -> &'static str {
        match event {
            LifecycleEvent::Text { .. } => "text",
            LifecycleEvent::Reasoning { .. } => "reasoning",
            LifecycleEvent::ToolStart { .. } => "tool_start",
            LifecycleEvent::ToolEnd { .. } => "tool_end",
            LifecycleEvent::PermissionRequired { .. } => "permission_required",
            LifecycleEvent::PermissionGranted { .. } => "permission_granted",
            LifecycleEvent::PermissionDenied { .. } => "permission_denied",
            LifecycleEvent::Complete { .. } => "complete",
        }
    }

    #[tokio::test]
    async fn happy_path_turn_emits_text_then_completes() {
        let provider = FakeProvider::new(vec![vec![
            Ok(StreamEvent::Text { delta: "hi".into() }),
            Ok(StreamEvent::End { reason: StopReason::EndTurn }),
        ]]);
        let engine = PermissionEngine::new(TrustMode::Full, "/workspace");
        let (tx, mut rx) = lifecycle_channel(16);
        let mut agent_loop = AgentLoop::new(provider, "claude-sonnet-4", ToolRegistry::new(), engine, tx, no_compaction_config());
        let cancel = CancellationToken::new();

        let outcome = agent_loop.run("hello", &AlwaysApprove, &NoopSummarizer, &cancel).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::EndTurn);
        assert_eq!(outcome.turns, 1);
        assert_eq!(agent_loop.session().messages.last().unwrap().text(), "hi");

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let kinds: Vec<_> = events.iter().map(event_kind).collect();
        assert_eq!(kinds, vec!["text", "complete"]);
    }

    #[tokio::test]
    async fn tool_use_with_approval_resubmits_and_completes() {
        let provider = FakeProvider::new(vec![
            vec![
                Ok(StreamEvent::ToolCallStart { id: "t1".into(), name: "read_file".into() }),
                Ok(StreamEvent::ToolCallDelta { id: "t1".into(), delta: r#"{"path":"/etc/hosts"}"#.into() }),
                Ok(StreamEvent::ToolCallEnd { id: "t1".into() }),
                Ok(StreamEvent::End { reason: StopReason::ToolUse }),
            ],
            vec![Ok(StreamEvent::Text { delta: "done".into() }), Ok(StreamEvent::End { reason: StopReason::EndTurn })],
        ]);
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(ReadFileTool));
        let engine = PermissionEngine::new(TrustMode::Ask, "/workspace");
        let (tx, mut rx) = lifecycle_channel(32);
        let mut agent_loop = AgentLoop::new(provider, "claude-sonnet-4", tools, engine, tx, no_compaction_config());
        let cancel = CancellationToken::new();

        let outcome = agent_loop.run("read /etc/hosts", &AlwaysApprove, &NoopSummarizer, &cancel).await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::EndTurn);
        assert_eq!(outcome.turns, 2);
        assert_eq!(outcome.tool_calls_executed, 1);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let kinds: Vec<_> = events.iter().map(event_kind).collect();
        assert_eq!(
            kinds,
            vec!["permission_required", "permission_granted", "tool_start", "tool_end", "text", "complete"]
        );
    }

    #[tokio::test]
    async fn rate_limited_stream_retries_then_completes() {
        let provider = FakeProvider::new(vec![
            vec![Err(ProviderError::RateLimited { retry_after: Some(Duration::from_millis(5)) })],
            vec![Ok(StreamEvent::Text { delta: "recovered".into() }), Ok(StreamEvent::End { reason: StopReason::EndTurn })],
        ]);
        let engine = PermissionEngine::new(TrustMode::Full, "/workspace");
        let (tx, _rx) = lifecycle_channel(16);
        let mut agent_loop = AgentLoop::new(provider, "claude-sonnet-4", ToolRegistry::new(), engine, tx, no_compaction_config());
        let cancel = CancellationToken::new();

        let outcome = agent_loop.run("hello", &AlwaysApprove, &NoopSummarizer, &cancel).await.unwrap();
        assert_eq!(outcome.stop_reason, StopReason::EndTurn);
        assert_eq!(agent_loop.session().messages.last().unwrap().text(), "recovered");
    }

    #[tokio::test]
    async fn cancellation_mid_tool_reports_failure_without_resubmission() {
        let provider = FakeProvider::new(vec![vec![
            Ok(StreamEvent::ToolCallStart { id: "t1".into(), name: "wait".into() }),
            Ok(StreamEvent::ToolCallEnd { id: "t1".into() }),
            Ok(StreamEvent::End { reason: StopReason::ToolUse }),
        ]]);
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(PendingTool));
        let engine = PermissionEngine::new(TrustMode::Full, "/workspace");
        let (tx, mut rx) = lifecycle_channel(32);
        let mut agent_loop = AgentLoop::new(provider, "claude-sonnet-4", tools, engine, tx, no_compaction_config());
        let cancel = CancellationToken::new();

        let cancel_after_start = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel_after_start.cancel();
        });

        let result = agent_loop.run("wait forever", &AlwaysApprove, &NoopSummarizer, &cancel).await;
        assert!(matches!(result, Err(LoopError::Cancelled)));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let kinds: Vec<_> = events.iter().map(event_kind).collect();
        assert!(kinds.contains(&"tool_start"));
        assert!(kinds.contains(&"tool_end"));
        assert_eq!(kinds.last(), Some(&"complete"));
        assert!(!agent_loop.session().messages.iter().any(|m| m.text() == "recovered"));
    }

    #[tokio::test]
    async fn zero_tool_calls_on_tool_use_stop_reason_terminates_without_looping() {
        let provider = FakeProvider::new(vec![vec![
            Ok(StreamEvent::Text { delta: "nothing to call".into() }),
            Ok(StreamEvent::End { reason: StopReason::ToolUse }),
        ]]);
        let engine = PermissionEngine::new(TrustMode::Full, "/workspace");
        let (tx, _rx) = lifecycle_channel(16);
        let mut agent_loop = AgentLoop::new(provider, "claude-sonnet-4", ToolRegistry::new(), engine, tx, no_compaction_config());
        let cancel = CancellationToken::new();

        let outcome = agent_loop.run("hello", &AlwaysApprove, &NoopSummarizer, &cancel).await.unwrap();
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.tool_calls_executed, 0);
    }
}
