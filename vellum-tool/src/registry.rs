//! Object-safe tool trait and the registry that holds them.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use vellum_types::ToolResult;

use crate::error::ToolError;
use crate::schema::validate_against_schema;

/// Behavioral hints a tool declares about itself, used by the
/// concurrency model to decide whether calls from the same turn may
/// run in parallel and by the permission engine as one input to risk
/// classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolAnnotations {
    /// The tool only reads data; never mutates state.
    pub side_effect_free: bool,
    /// Repeated calls with identical arguments produce the same
    /// result (and, combined with `side_effect_free`, no caller-visible
    /// effect).
    pub idempotent: bool,
}

/// Object-safe trait every tool implementation satisfies. Tools are
/// stored as `Arc<dyn ToolDyn>` so heterogeneous tool sources (local
/// functions, plugin-supplied handlers, remote capability servers) sit
/// in one registry.
pub trait ToolDyn: Send + Sync {
    /// The tool's unique name.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing valid arguments.
    fn input_schema(&self) -> Value;

    /// Behavioral hints for scheduling and risk classification.
    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::default()
    }

    /// Execute the tool. Callers are expected to have already
    /// validated `input` against [`ToolDyn::input_schema`] (the
    /// registry does this).
    fn call(
        &self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + '_>>;
}

/// Holds registered tools keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDyn>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, overwriting any existing tool with the same
    /// name.
    pub fn register(&mut self, tool: Arc<dyn ToolDyn>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Remove a tool by name, returning it if present.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn ToolDyn>> {
        self.tools.remove(name)
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolDyn>> {
        self.tools.get(name)
    }

    /// Iterate over all registered tools.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ToolDyn>> {
        self.tools.values()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate `input` against the named tool's schema and invoke it.
    /// Validation failures surface as `ToolError::InvalidArgument`
    /// without ever reaching the tool's `call` method.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::NotFound` if no tool is registered under
    /// `name`, or `ToolError::InvalidArgument` if `input` fails schema
    /// validation.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<ToolResult, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        validate_against_schema(&tool.input_schema(), &input)
            .map_err(ToolError::InvalidArgument)?;
        tool.call(input).await
    }
}
