//! Hook errors.

/// Errors raised by a [`crate::Hook`] implementation.
///
/// A hook error never halts the turn — [`crate::HookRegistry::dispatch`]
/// logs it and treats it as `Continue`. Use
/// [`crate::HookAction::Halt`] when a hook wants to stop the loop.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The hook failed to evaluate.
    #[error("hook failed: {0}")]
    Failed(String),
}
