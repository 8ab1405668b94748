//! Tool execution errors.

/// Errors raised while registering or executing a tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool is registered under this name.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Arguments did not validate against the tool's declared input
    /// schema.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The tool ran but reported failure.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// Permission was denied for this call.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Execution was cancelled.
    #[error("cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_distinct_from_machine_code() {
        let err = ToolError::InvalidArgument("missing field `path`".into());
        assert_eq!(err.to_string(), "invalid argument: missing field `path`");
    }
}
