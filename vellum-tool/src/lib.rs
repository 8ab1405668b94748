//! Tool execution for the Vellum agent runtime: an object-safe tool
//! trait, a name-keyed registry, boundary schema validation, and a
//! composable middleware pipeline used to implement permission
//! gating.

#![deny(missing_docs)]

mod error;
mod middleware;
mod registry;
mod schema;

pub use error::ToolError;
pub use middleware::{tool_middleware_fn, Next, ToolCall, ToolContext, ToolMiddleware};
pub use registry::{ToolAnnotations, ToolDyn, ToolRegistry};
pub use schema::validate_against_schema;
