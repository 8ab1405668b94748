//! The permission engine wired up as [`vellum_tool::ToolMiddleware`],
//! so gating composes with any other tool-pipeline middleware instead
//! of living at a bespoke call site.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use vellum_types::{RiskLevel, ToolResult};
use vellum_tool::{Next, ToolCall, ToolContext, ToolError, ToolMiddleware};

use crate::engine::{ApprovalDecision, ApprovalResponder, PermissionEngine};

/// Wraps a [`PermissionEngine`] and an [`ApprovalResponder`] as tool
/// middleware. Declared base risks default to [`RiskLevel::Medium`]
/// for any tool not explicitly registered via
/// [`PermissionMiddleware::set_base_risk`].
pub struct PermissionMiddleware<R> {
    engine: PermissionEngine,
    responder: R,
    base_risks: HashMap<String, RiskLevel>,
}

impl<R: ApprovalResponder> PermissionMiddleware<R> {
    /// Wrap an engine and responder.
    #[must_use]
    pub fn new(engine: PermissionEngine, responder: R) -> Self {
        Self { engine, responder, base_risks: HashMap::new() }
    }

    /// Declare a tool's baseline risk, consulted before argument-based
    /// escalation.
    pub fn set_base_risk(&mut self, tool_name: impl Into<String>, risk: RiskLevel) {
        self.base_risks.insert(tool_name.into(), risk);
    }

    fn base_risk_for(&self, tool_name: &str) -> RiskLevel {
        self.base_risks.get(tool_name).copied().unwrap_or(RiskLevel::Medium)
    }
}

impl<R: ApprovalResponder> ToolMiddleware for PermissionMiddleware<R> {
    fn process<'a>(
        &'a self,
        call: &'a ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + 'a>> {
        Box::pin(async move {
            let base_risk = self.base_risk_for(&call.name);
            let decision = self
                .engine
                .decide(&call.id, &call.name, base_risk, &call.input, &self.responder)
                .await;
            match decision {
                ApprovalDecision::Denied => {
                    Err(ToolError::PermissionDenied(format!("{} was not approved", call.name)))
                }
                ApprovalDecision::Approved => next.run(call, ctx).await,
            }
        })
    }
}
