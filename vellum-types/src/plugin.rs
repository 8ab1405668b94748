//! Trusted-plugin record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A capability a plugin may be granted. Capabilities are additive and
/// must be explicitly listed; a plugin with no capabilities can still
/// be loaded but can invoke nothing privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Run plugin-registered hooks around the agent loop.
    ExecuteHooks,
    /// Spawn a subagent.
    SpawnSubagent,
    /// Read or write files within the workspace.
    AccessFilesystem,
    /// Make outbound network requests.
    NetworkAccess,
    /// Reach a remote MCP-style tool server.
    McpServers,
}

/// How much a plugin is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Not verified; must not be loaded.
    None,
    /// Hash-verified against a known manifest entry; capabilities granted.
    Limited,
    /// Explicitly elevated by the user beyond hash verification.
    Full,
}

/// A plugin entry in the trust store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustedPluginRecord {
    /// Stable plugin identifier (e.g. its package name).
    pub id: String,
    /// The plugin version this record was trusted for.
    pub version: String,
    /// Lowercase hex-encoded SHA-256 of the plugin's bytes at the time
    /// it was last verified.
    pub content_hash: String,
    /// Current trust level.
    pub trust: TrustLevel,
    /// Capabilities granted to this plugin.
    pub capabilities: Vec<Capability>,
    /// When this record was last verified or re-trusted.
    pub verified_at: DateTime<Utc>,
}

impl TrustedPluginRecord {
    /// Whether `capability` is granted.
    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.trust != TrustLevel::None && self.capabilities.contains(&capability)
    }
}
