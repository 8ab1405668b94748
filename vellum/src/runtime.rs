//! [`RuntimeContext`]: wires a [`RuntimeConfig`] together with a
//! concrete provider, tool registry, and workspace root into a ready
//! [`AgentLoop`].

use vellum_hooks::{lifecycle_channel, LifecycleReceiver};
use vellum_loop::{AgentLoop, LoopConfig};
use vellum_permission::PermissionEngine;
use vellum_provider::Provider;
use vellum_tool::ToolRegistry;

use crate::config::RuntimeConfig;

/// Default capacity of the lifecycle event channel an embedder drains
/// to render session progress.
const DEFAULT_LIFECYCLE_CAPACITY: usize = 64;

/// A fully wired agent runtime: an [`AgentLoop`] plus the
/// [`LifecycleReceiver`] an embedder drains to render session
/// progress, built from a [`RuntimeConfig`] the embedder populated
/// from its own configuration source.
pub struct RuntimeContext<P: Provider> {
    /// The wired agent loop, ready to run turns.
    pub agent_loop: AgentLoop<P>,
    /// Lifecycle events (compaction, checkpoints, trust changes) to
    /// drain alongside `agent_loop.run`.
    pub lifecycle: LifecycleReceiver,
}

impl<P: Provider> RuntimeContext<P> {
    /// Build a [`RuntimeContext`] from a populated [`RuntimeConfig`],
    /// a constructed provider adapter, a tool registry, and a
    /// workspace root used for permission path-escalation checks.
    ///
    /// `window_tokens` is the target model's usable context window;
    /// it is not part of [`RuntimeConfig`] because it is a property of
    /// the model, not a tunable the embedder sets independently of
    /// `llm.model`.
    #[must_use]
    pub fn new(config: &RuntimeConfig, provider: P, tools: ToolRegistry, workspace_root: impl Into<String>, window_tokens: u64) -> Self {
        let mut permission_engine = PermissionEngine::new(config.permissions.mode, workspace_root);
        if let Some(over) = config.permissions.file_read {
            permission_engine.set_category_override(vellum_permission::ToolCategory::FileRead, over);
        }
        if let Some(over) = config.permissions.file_write {
            permission_engine.set_category_override(vellum_permission::ToolCategory::FileWrite, over);
        }
        if let Some(over) = config.permissions.shell_execute {
            permission_engine.set_category_override(vellum_permission::ToolCategory::ShellExecute, over);
        }
        if let Some(over) = config.permissions.network_access {
            permission_engine.set_category_override(vellum_permission::ToolCategory::NetworkAccess, over);
        }

        let (lifecycle_tx, lifecycle_rx) = lifecycle_channel(DEFAULT_LIFECYCLE_CAPACITY);

        let loop_config = LoopConfig {
            max_turns: config.agent.max_turns,
            max_tool_calls: config.agent.max_tool_calls,
            window_tokens,
            sampling: config.llm.sampling(),
            thinking: config.thinking.to_thinking_config(),
            context_management_enabled: config.context_management.enabled,
            retry: config.agent.retry_policy(),
            ..LoopConfig::default()
        };

        let agent_loop = AgentLoop::new(provider, config.llm.model.clone(), tools, permission_engine, lifecycle_tx, loop_config);

        Self { agent_loop, lifecycle: lifecycle_rx }
    }
}
