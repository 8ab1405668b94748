//! Plugin trust and verification errors.

/// Errors raised while verifying or gating a plugin.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// `SHA-256(pluginBytes)` did not match the record's stored hash.
    #[error("content hash mismatch for plugin `{plugin_id}`")]
    HashMismatch {
        /// The plugin that failed verification.
        plugin_id: String,
    },
    /// No trust record exists for the plugin.
    #[error("plugin `{0}` is not registered")]
    NotRegistered(String),
    /// The plugin's trust level forbids loading it at all.
    #[error("plugin `{0}` is untrusted")]
    Untrusted(String),
    /// The plugin is trusted but lacks the capability an operation requires.
    #[error("plugin `{plugin_id}` lacks capability {capability:?}")]
    CapabilityDenied {
        /// The plugin missing the capability.
        plugin_id: String,
        /// The capability that was required.
        capability: vellum_types::Capability,
    },
    /// A `contentHash` field was not 64 lowercase hex characters.
    #[error("malformed content hash: {0}")]
    MalformedHash(String),
}
