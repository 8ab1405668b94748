//! Composable middleware for the tool execution pipeline, in the same
//! `from_fn`/`Next` shape web frameworks use for request middleware.
//! The permission engine is implemented as one such middleware rather
//! than a bespoke call site, so permission gating composes with
//! logging, redaction, or rate limiting the same way.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use vellum_types::ToolResult;

use crate::error::ToolError;
use crate::registry::ToolDyn;

/// A tool call in flight through the middleware pipeline.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// The id the model assigned to this call.
    pub id: String,
    /// The tool name.
    pub name: String,
    /// JSON input arguments.
    pub input: serde_json::Value,
}

/// Ambient context threaded alongside a [`ToolCall`] — currently just
/// the session id, extended by downstream crates (permission,
/// plugin) via their own lookups keyed on it.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// The session this call belongs to.
    pub session_id: String,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single stage of the tool execution pipeline.
///
/// Implementations can inspect or modify the call before delegating to
/// `next`, short-circuit by returning without calling it, or inspect
/// and modify the result after the tool runs.
pub trait ToolMiddleware: Send + Sync {
    /// Process a call, optionally delegating to the rest of the chain.
    fn process<'a>(
        &'a self,
        call: &'a ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<ToolResult, ToolError>>;
}

/// The remaining middleware chain plus the underlying tool. Consumed
/// on `run` to prevent double invocation.
pub struct Next<'a> {
    tool: &'a dyn ToolDyn,
    middleware: &'a [Arc<dyn ToolMiddleware>],
}

impl<'a> Next<'a> {
    /// Construct a chain over `middleware` terminating at `tool`.
    #[must_use]
    pub fn new(tool: &'a dyn ToolDyn, middleware: &'a [Arc<dyn ToolMiddleware>]) -> Self {
        Self { tool, middleware }
    }

    /// Continue the chain: run the next middleware, or the tool itself
    /// if the chain is exhausted.
    pub async fn run(self, call: &'a ToolCall, ctx: &'a ToolContext) -> Result<ToolResult, ToolError> {
        if let Some((head, tail)) = self.middleware.split_first() {
            head.process(call, ctx, Next::new(self.tool, tail)).await
        } else {
            self.tool.call(call.input.clone()).await
        }
    }
}

struct MiddlewareFn<F> {
    f: F,
}

impl<F> ToolMiddleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a ToolCall, &'a ToolContext, Next<'a>) -> BoxFuture<'a, Result<ToolResult, ToolError>>
        + Send
        + Sync,
{
    fn process<'a>(
        &'a self,
        call: &'a ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<ToolResult, ToolError>> {
        (self.f)(call, ctx, next)
    }
}

/// Build middleware from a closure, in the style of axum's `from_fn`.
pub fn tool_middleware_fn<F>(f: F) -> impl ToolMiddleware
where
    F: for<'a> Fn(&'a ToolCall, &'a ToolContext, Next<'a>) -> BoxFuture<'a, Result<ToolResult, ToolError>>
        + Send
        + Sync,
{
    MiddlewareFn { f }
}
