//! The permission engine: risk classification plus trust-mode gating.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use serde_json::Value;
use vellum_types::RiskLevel;

use crate::risk::{classify, BaseRisk};
use crate::trust::{CategoryOverride, ToolCategory, TrustMode};

/// The outcome of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// The call may proceed.
    Approved,
    /// The call must not proceed; terminal for this execution.
    Denied,
}

/// A resolved approval response: the decision, plus whether the
/// responder asked to remember it for `(toolName, riskLevel)` for the
/// rest of the session.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalResponse {
    /// The decision itself.
    pub decision: ApprovalDecision,
    /// Whether to scope this decision to `(toolName, riskLevel)` for
    /// the remainder of the session ("always allow").
    pub remember: bool,
}

/// Resolves an interactive approval prompt. Implemented by whatever
/// external responder is wired up (TUI, or a non-interactive policy
/// for headless runs).
pub trait ApprovalResponder: Send + Sync {
    /// Ask whether `tool_name` may run at `risk`.
    fn request_approval(
        &self,
        call_id: &str,
        tool_name: &str,
        risk: RiskLevel,
    ) -> impl Future<Output = ApprovalResponse> + Send;
}

/// A responder that denies everything, suitable for cancellation
/// fan-out: any awaited permission prompt resolves to `rejected`.
pub struct AlwaysDeny;

impl ApprovalResponder for AlwaysDeny {
    async fn request_approval(&self, _call_id: &str, _tool_name: &str, _risk: RiskLevel) -> ApprovalResponse {
        ApprovalResponse { decision: ApprovalDecision::Denied, remember: false }
    }
}

/// Decides which tool calls require approval and gates their
/// execution.
pub struct PermissionEngine {
    trust_mode: TrustMode,
    category_overrides: HashMap<ToolCategory, CategoryOverride>,
    tool_categories: HashMap<String, ToolCategory>,
    workspace_root: String,
    always_allow: Mutex<HashSet<(String, RiskLevel)>>,
}

impl PermissionEngine {
    /// Create an engine with a global trust mode and workspace root
    /// (used for path-escalation checks).
    #[must_use]
    pub fn new(trust_mode: TrustMode, workspace_root: impl Into<String>) -> Self {
        Self {
            trust_mode,
            category_overrides: HashMap::new(),
            tool_categories: HashMap::new(),
            workspace_root: workspace_root.into(),
            always_allow: Mutex::new(HashSet::new()),
        }
    }

    /// Declare which category a tool belongs to, for override lookup.
    pub fn set_tool_category(&mut self, tool_name: impl Into<String>, category: ToolCategory) {
        self.tool_categories.insert(tool_name.into(), category);
    }

    /// Set a per-category override, taking precedence over the global
    /// trust mode.
    pub fn set_category_override(&mut self, category: ToolCategory, mode: CategoryOverride) {
        self.category_overrides.insert(category, mode);
    }

    /// Decide whether `tool_name` called with `input` and declared
    /// `base_risk` may run, prompting via `responder` if needed.
    ///
    /// A category override of `Never` denies without prompting. An
    /// override of `Ask` always prompts. An override of `Auto`, or no
    /// override at all, falls back to the global trust mode's
    /// threshold — unless a prior "always allow" was recorded for this
    /// exact `(toolName, riskLevel)` pair this session.
    pub async fn decide(
        &self,
        call_id: &str,
        tool_name: &str,
        base_risk: RiskLevel,
        input: &Value,
        responder: &impl ApprovalResponder,
    ) -> ApprovalDecision {
        let risk = classify(BaseRisk(base_risk), input, &self.workspace_root);

        if self.always_allow.lock().unwrap().contains(&(tool_name.to_string(), risk)) {
            return ApprovalDecision::Approved;
        }

        let category = self.tool_categories.get(tool_name).copied();
        let override_mode = category.and_then(|c| self.category_overrides.get(&c).copied());

        let needs_prompt = match override_mode {
            Some(CategoryOverride::Never) => return ApprovalDecision::Denied,
            Some(CategoryOverride::Auto) => false,
            Some(CategoryOverride::Ask) => true,
            None => self.trust_mode.requires_prompt(risk),
        };

        if !needs_prompt {
            return ApprovalDecision::Approved;
        }

        let response = responder.request_approval(call_id, tool_name, risk).await;
        if response.remember && response.decision == ApprovalDecision::Approved {
            self.always_allow.lock().unwrap().insert((tool_name.to_string(), risk));
        }
        response.decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct AlwaysApprove { remember: bool }

    impl ApprovalResponder for AlwaysApprove {
        async fn request_approval(&self, _call_id: &str, _tool_name: &str, _risk: RiskLevel) -> ApprovalResponse {
            ApprovalResponse { decision: ApprovalDecision::Approved, remember: self.remember }
        }
    }

    #[tokio::test]
    async fn full_mode_auto_approves_non_critical() {
        let engine = PermissionEngine::new(TrustMode::Full, "/workspace");
        let decision = engine
            .decide("t1", "read_file", RiskLevel::High, &json!({"path": "/workspace/x"}), &AlwaysDeny)
            .await;
        assert_eq!(decision, ApprovalDecision::Approved);
    }

    #[tokio::test]
    async fn ask_mode_defers_to_responder() {
        let engine = PermissionEngine::new(TrustMode::Ask, "/workspace");
        let decision = engine
            .decide("t1", "read_file", RiskLevel::Low, &json!({}), &AlwaysDeny)
            .await;
        assert_eq!(decision, ApprovalDecision::Denied);
    }

    #[tokio::test]
    async fn never_override_denies_without_prompting() {
        let mut engine = PermissionEngine::new(TrustMode::Full, "/workspace");
        engine.set_tool_category("shell", ToolCategory::ShellExecute);
        engine.set_category_override(ToolCategory::ShellExecute, CategoryOverride::Never);
        let decision = engine.decide("t1", "shell", RiskLevel::Low, &json!({}), &AlwaysDeny).await;
        assert_eq!(decision, ApprovalDecision::Denied);
    }

    #[tokio::test]
    async fn always_allow_is_remembered_per_tool_and_risk() {
        let engine = PermissionEngine::new(TrustMode::Ask, "/workspace");
        let responder = AlwaysApprove { remember: true };
        let first = engine.decide("t1", "read_file", RiskLevel::Low, &json!({}), &responder).await;
        assert_eq!(first, ApprovalDecision::Approved);
        // Second call at the same (tool, risk) should short-circuit via
        // the always-allow set without consulting the responder again —
        // verified indirectly by swapping in a responder that denies.
        let second = engine.decide("t1", "read_file", RiskLevel::Low, &json!({}), &AlwaysDeny).await;
        assert_eq!(second, ApprovalDecision::Approved);
    }

    #[tokio::test]
    async fn path_escalation_changes_which_threshold_applies() {
        let engine = PermissionEngine::new(TrustMode::Auto, "/workspace");
        // Base risk Low, but an escaping path escalates to High, which
        // Auto mode prompts for; AlwaysDeny then denies it.
        let decision = engine
            .decide("t1", "read_file", RiskLevel::Low, &json!({"path": "/etc/passwd"}), &AlwaysDeny)
            .await;
        assert_eq!(decision, ApprovalDecision::Denied);
    }
}
