//! The agent loop: the request/response/tool cycle, built on
//! [`vellum_provider::Provider`], [`vellum_tool::ToolRegistry`], and
//! [`vellum_permission::PermissionEngine`].

#![deny(missing_docs)]

mod config;
mod error;
mod loop_impl;
mod responder;
mod summarizer;

pub use config::LoopConfig;
pub use error::LoopError;
pub use loop_impl::{AgentLoop, LoopOutcome};
pub use responder::LifecycleResponder;
pub use summarizer::ProviderSummarizer;
