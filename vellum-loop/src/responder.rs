//! Wraps an [`ApprovalResponder`] so every prompt it resolves also
//! announces itself on the lifecycle channel, in
//! `permissionRequired -> permission{Granted,Denied}` order.

use vellum_hooks::{LifecycleEvent, LifecycleSender};
use vellum_permission::{ApprovalDecision, ApprovalResponder, ApprovalResponse};
use vellum_types::RiskLevel;

/// Bridges a caller-supplied [`ApprovalResponder`] into the lifecycle
/// channel. [`vellum_permission::PermissionEngine::decide`] only calls
/// `request_approval` when it actually needs to prompt, so
/// `permissionRequired` is emitted exactly when a prompt would be
/// shown — never for silently auto-approved calls.
pub struct LifecycleResponder<'a, R> {
    inner: &'a R,
    lifecycle: &'a LifecycleSender,
}

impl<'a, R: ApprovalResponder> LifecycleResponder<'a, R> {
    /// Wrap `inner`, announcing its decisions on `lifecycle`.
    #[must_use]
    pub fn new(inner: &'a R, lifecycle: &'a LifecycleSender) -> Self {
        Self { inner, lifecycle }
    }
}

impl<R: ApprovalResponder> ApprovalResponder for LifecycleResponder<'_, R> {
    async fn request_approval(&self, call_id: &str, tool_name: &str, risk: RiskLevel) -> ApprovalResponse {
        let _ = self
            .lifecycle
            .send(LifecycleEvent::PermissionRequired { call_id: call_id.to_string(), risk })
            .await;

        let response = self.inner.request_approval(call_id, tool_name, risk).await;

        let event = match response.decision {
            ApprovalDecision::Approved => LifecycleEvent::PermissionGranted { call_id: call_id.to_string() },
            ApprovalDecision::Denied => LifecycleEvent::PermissionDenied { call_id: call_id.to_string() },
        };
        let _ = self.lifecycle.send(event).await;

        response
    }
}
