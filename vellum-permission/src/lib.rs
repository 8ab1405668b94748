//! Risk classification and trust-mode gating for tool calls.

#![deny(missing_docs)]

mod engine;
mod middleware;
mod risk;
mod trust;

pub use engine::{AlwaysDeny, ApprovalDecision, ApprovalResponder, ApprovalResponse, PermissionEngine};
pub use middleware::PermissionMiddleware;
pub use risk::{classify, BaseRisk};
pub use trust::{CategoryOverride, ToolCategory, TrustMode};
