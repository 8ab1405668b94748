//! Ordered dispatch of [`Hook`]s.

use std::sync::Arc;

use tracing::warn;

use crate::hook::{Hook, HookAction, HookContext};

/// Collects multiple [`Hook`]s into an ordered pipeline.
///
/// At each point, hooks fire in registration order. The pipeline
/// short-circuits on the first non-`Continue` action; a hook error is
/// logged and treated as `Continue` so one misbehaving hook can't wedge
/// the loop.
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook to the pipeline.
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// Dispatch `ctx` through every hook registered for its point,
    /// returning the first non-`Continue` action, or `Continue` if
    /// none intervened.
    pub async fn dispatch(&self, ctx: &HookContext) -> HookAction {
        for hook in &self.hooks {
            if !hook.points().contains(&ctx.point) {
                continue;
            }
            match hook.on_event(ctx).await {
                Ok(HookAction::Continue) => continue,
                Ok(action) => return action,
                Err(err) => {
                    warn!(error = %err, point = ?ctx.point, "hook failed, continuing");
                    continue;
                }
            }
        }
        HookAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use crate::hook::HookPoint;
    use async_trait::async_trait;

    struct AlwaysContinue;
    #[async_trait]
    impl Hook for AlwaysContinue {
        fn points(&self) -> &[HookPoint] {
            &[HookPoint::PreToolUse]
        }
        async fn on_event(&self, _ctx: &HookContext) -> Result<HookAction, HookError> {
            Ok(HookAction::Continue)
        }
    }

    struct AlwaysHalt;
    #[async_trait]
    impl Hook for AlwaysHalt {
        fn points(&self) -> &[HookPoint] {
            &[HookPoint::PreToolUse]
        }
        async fn on_event(&self, _ctx: &HookContext) -> Result<HookAction, HookError> {
            Ok(HookAction::Halt { reason: "budget exceeded".into() })
        }
    }

    struct AlwaysErrors;
    #[async_trait]
    impl Hook for AlwaysErrors {
        fn points(&self) -> &[HookPoint] {
            &[HookPoint::PreToolUse]
        }
        async fn on_event(&self, _ctx: &HookContext) -> Result<HookAction, HookError> {
            Err(HookError::Failed("boom".into()))
        }
    }

    #[tokio::test]
    async fn all_continue_yields_continue() {
        let mut registry = HookRegistry::new();
        registry.add(Arc::new(AlwaysContinue));
        let ctx = HookContext::new(HookPoint::PreToolUse);
        assert!(matches!(registry.dispatch(&ctx).await, HookAction::Continue));
    }

    #[tokio::test]
    async fn short_circuits_on_non_continue() {
        let mut registry = HookRegistry::new();
        registry.add(Arc::new(AlwaysContinue));
        registry.add(Arc::new(AlwaysHalt));
        registry.add(Arc::new(AlwaysContinue));
        let ctx = HookContext::new(HookPoint::PreToolUse);
        assert!(matches!(registry.dispatch(&ctx).await, HookAction::Halt { .. }));
    }

    #[tokio::test]
    async fn errors_are_treated_as_continue() {
        let mut registry = HookRegistry::new();
        registry.add(Arc::new(AlwaysErrors));
        let ctx = HookContext::new(HookPoint::PreToolUse);
        assert!(matches!(registry.dispatch(&ctx).await, HookAction::Continue));
    }

    #[tokio::test]
    async fn ignores_hooks_not_registered_for_this_point() {
        let mut registry = HookRegistry::new();
        registry.add(Arc::new(AlwaysHalt));
        let ctx = HookContext::new(HookPoint::PostToolUse);
        assert!(matches!(registry.dispatch(&ctx).await, HookAction::Continue));
    }
}
