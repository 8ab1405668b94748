//! [`RuntimeConfig`]: the single `serde`-deserializable struct an
//! embedding application populates (from TOML, JSON, environment
//! variables, or wherever it keeps configuration) to build a
//! [`crate::RuntimeContext`].
//!
//! Nothing in this crate reads a file or an environment variable
//! itself — that is the embedder's job.

use serde::{Deserialize, Serialize};
use vellum_context::ThresholdProfile;
use vellum_permission::{CategoryOverride, TrustMode};
use vellum_provider::{ReasoningEffort, RetryPolicy, SamplingParams, ThinkingConfig};

/// Top-level runtime configuration, one section per configuration knob
/// group an embedder sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Provider and model selection.
    pub llm: LlmConfig,
    /// Agent loop limits.
    pub agent: AgentConfig,
    /// Per-category tool permission overrides.
    pub permissions: PermissionConfig,
    /// Context-window tracking and compaction.
    pub context_management: ContextManagementConfig,
    /// Extended-reasoning configuration.
    pub thinking: ThinkingSection,
}

/// `llm.*` — provider and model selection, and default sampling
/// parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// The provider adapter to construct (`"anthropic"`, `"openai"`,
    /// `"ollama"`, `"google"`, `"bedrock"`, or a custom name the
    /// embedder resolves itself).
    pub provider: String,
    /// The model id to request, e.g. `"claude-sonnet-4-5"`.
    pub model: String,
    /// Maximum tokens to generate per completion.
    pub max_tokens: u32,
    /// Sampling temperature, if overridden from the provider default.
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self { provider: String::new(), model: String::new(), max_tokens: 4096, temperature: None }
    }
}

impl LlmConfig {
    /// Build the [`SamplingParams`] this section describes.
    #[must_use]
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams { max_tokens: self.max_tokens, temperature: self.temperature, top_p: None, stop_sequences: vec![] }
    }
}

/// `agent.*` — loop limits and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum tool calls across a run. `None` (the default) means no
    /// limit.
    pub max_tool_calls: Option<u32>,
    /// Maximum resubmission turns before the loop gives up. `None`
    /// (the default) means no limit.
    pub max_turns: Option<u32>,
    /// Maximum retry attempts for a retryable provider error.
    pub max_retries: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_tool_calls: None, max_turns: None, max_retries: RetryPolicy::default().max_retries }
    }
}

impl AgentConfig {
    /// Build the [`RetryPolicy`] this section describes, keeping the
    /// default base/max delay.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_retries(self.max_retries)
    }
}

/// `permissions.*` — per-category trust overrides, each
/// `ask`/`auto`/`never`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    /// Global trust mode applied where no category override is set.
    pub mode: TrustMode,
    /// Override for file-read calls.
    pub file_read: Option<CategoryOverride>,
    /// Override for file-write calls.
    pub file_write: Option<CategoryOverride>,
    /// Override for shell-execution calls.
    pub shell_execute: Option<CategoryOverride>,
    /// Override for network-access calls.
    pub network_access: Option<CategoryOverride>,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self { mode: TrustMode::Ask, file_read: None, file_write: None, shell_execute: None, network_access: None }
    }
}

/// `contextManagement.*` — whether compaction runs, and at which
/// thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextManagementConfig {
    /// Whether the context manager is consulted before each
    /// submission.
    pub enabled: bool,
    /// The usage fractions that classify
    /// [`vellum_types::ContextLevel`].
    pub thresholds: ThresholdConfig,
}

impl Default for ContextManagementConfig {
    fn default() -> Self {
        Self { enabled: true, thresholds: ThresholdConfig::default() }
    }
}

/// The `warning`/`critical`/`overflow` crossing points, mirroring
/// [`ThresholdProfile`] in a serde-friendly shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fraction of the window at which the level becomes `Warning`.
    pub warning: f64,
    /// Fraction at which the level becomes `Critical`.
    pub critical: f64,
    /// Fraction at which the level becomes `Overflow`.
    pub overflow: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let balanced = ThresholdProfile::balanced();
        Self { warning: balanced.warning, critical: balanced.critical, overflow: balanced.overflow }
    }
}

impl From<ThresholdConfig> for ThresholdProfile {
    fn from(value: ThresholdConfig) -> Self {
        ThresholdProfile { warning: value.warning, critical: value.critical, overflow: value.overflow }
    }
}

/// `thinking.*` — extended-reasoning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkingSection {
    /// Whether extended reasoning is requested.
    pub enabled: bool,
    /// Token budget for reasoning, for providers that use that axis.
    pub budget_tokens: Option<u32>,
    /// Qualitative reasoning effort, for providers that use that axis
    /// instead of a token budget.
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl Default for ThinkingSection {
    fn default() -> Self {
        Self { enabled: false, budget_tokens: None, reasoning_effort: None }
    }
}

impl ThinkingSection {
    /// Build the [`ThinkingConfig`] this section describes, or `None`
    /// if extended reasoning is disabled.
    #[must_use]
    pub fn to_thinking_config(&self) -> Option<ThinkingConfig> {
        if !self.enabled {
            return None;
        }
        Some(ThinkingConfig { enabled: true, budget_tokens: self.budget_tokens, reasoning_effort: self.reasoning_effort })
    }
}
