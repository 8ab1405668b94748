#![deny(missing_docs)]
//! # vellum — agent runtime core
//!
//! A single import surface over the crates that make up Vellum's agent
//! runtime: streaming provider adapters, the agent loop, tool
//! execution, permission gating, context-window management,
//! persistence, and the trusted-plugin gate. Re-exports each
//! component behind a feature flag, plus a [`prelude`] for the happy
//! path.
//!
//! This crate owns no terminal rendering, slash-command parsing, or
//! configuration-file loading — [`RuntimeConfig`] is a plain
//! `serde`-deserializable struct the embedder populates from whatever
//! loader it already uses.

#[cfg(feature = "core")]
mod config;
#[cfg(feature = "core")]
mod runtime;

#[cfg(feature = "core")]
pub use config::{AgentConfig, ContextManagementConfig, LlmConfig, PermissionConfig, RuntimeConfig, ThinkingSection, ThresholdConfig};
#[cfg(feature = "core")]
pub use runtime::RuntimeContext;

#[cfg(feature = "core")]
pub use vellum_context;
#[cfg(feature = "core")]
pub use vellum_hooks;
#[cfg(feature = "core")]
pub use vellum_loop;
#[cfg(feature = "core")]
pub use vellum_permission;
#[cfg(feature = "core")]
pub use vellum_provider;
#[cfg(feature = "core")]
pub use vellum_tool;
#[cfg(feature = "core")]
pub use vellum_types;
#[cfg(feature = "persistence")]
pub use vellum_persistence;
#[cfg(feature = "plugin")]
pub use vellum_plugin;
#[cfg(feature = "provider-anthropic")]
pub use vellum_provider_anthropic;
#[cfg(feature = "provider-bedrock")]
pub use vellum_provider_bedrock;
#[cfg(feature = "provider-google")]
pub use vellum_provider_google;
#[cfg(feature = "provider-ollama")]
pub use vellum_provider_ollama;
#[cfg(feature = "provider-openai")]
pub use vellum_provider_openai;

/// Happy-path imports for composing a Vellum agent runtime.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use vellum_context::{compact, derive_state, effective_history, Summarizer, ThresholdProfile, ThresholdTable, TokenEstimator};
    #[cfg(feature = "core")]
    pub use vellum_hooks::{Hook, HookAction, HookContext, HookPoint, HookRegistry, LifecycleEvent};
    #[cfg(feature = "core")]
    pub use vellum_loop::{AgentLoop, LoopConfig, LoopOutcome};
    #[cfg(feature = "core")]
    pub use vellum_permission::{ApprovalDecision, ApprovalResponder, CategoryOverride, PermissionEngine, ToolCategory, TrustMode};
    #[cfg(feature = "core")]
    pub use vellum_provider::{CompletionRequest, CompletionResponse, Provider, ProviderError, RetryPolicy, SamplingParams, ThinkingConfig};
    #[cfg(feature = "core")]
    pub use vellum_tool::{ToolAnnotations, ToolContext, ToolDyn, ToolError, ToolRegistry};
    #[cfg(feature = "core")]
    pub use vellum_types::{ContentBlock, Message, Role, Session, StopReason, StreamEvent};

    #[cfg(feature = "core")]
    pub use crate::{RuntimeConfig, RuntimeContext};

    #[cfg(feature = "plugin")]
    pub use vellum_plugin::TrustStore;

    #[cfg(feature = "persistence")]
    pub use vellum_persistence::{FileSessionStorage, InMemorySessionStorage, SessionStorage};

    #[cfg(feature = "provider-anthropic")]
    pub use vellum_provider_anthropic::Anthropic;
    #[cfg(feature = "provider-bedrock")]
    pub use vellum_provider_bedrock::Bedrock;
    #[cfg(feature = "provider-google")]
    pub use vellum_provider_google::Google;
    #[cfg(feature = "provider-ollama")]
    pub use vellum_provider_ollama::Ollama;
    #[cfg(feature = "provider-openai")]
    pub use vellum_provider_openai::OpenAI;
}
