//! The trust store: mutation and capability gating for plugin records.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use vellum_types::{Capability, TrustLevel, TrustedPluginRecord};

use crate::error::PluginError;
use crate::hash::{validate_hash_format, verify};

/// Holds the trust records for every plugin known to this runtime and
/// enforces the three-part gate before a plugin-supplied tool handler
/// runs: hash match, non-`none` trust, and capability membership.
#[derive(Clone, Default)]
pub struct TrustStore {
    records: Arc<RwLock<HashMap<String, TrustedPluginRecord>>>,
}

impl TrustStore {
    /// Create an empty trust store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `trustPlugin`: register or overwrite the trust record for
    /// `plugin_id`. Trust level derives from `capabilities`: empty
    /// grants [`TrustLevel::None`] (equivalent to untrusted for every
    /// gated operation), any non-empty set grants [`TrustLevel::Limited`].
    /// Reaching [`TrustLevel::Full`] requires a separate call to
    /// [`TrustStore::elevate`].
    ///
    /// Re-trusting an already-known plugin updates its hash,
    /// capabilities, and timestamp atomically — readers never observe
    /// a record with a new hash but stale capabilities or vice versa.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MalformedHash`] if `content_hash` is not
    /// 64 hex characters.
    pub fn trust_plugin(
        &self,
        plugin_id: impl Into<String>,
        version: impl Into<String>,
        capabilities: Vec<Capability>,
        content_hash: impl Into<String>,
    ) -> Result<(), PluginError> {
        let content_hash = content_hash.into();
        validate_hash_format(&content_hash)?;

        let trust = if capabilities.is_empty() { TrustLevel::None } else { TrustLevel::Limited };
        let record = TrustedPluginRecord {
            id: plugin_id.into(),
            version: version.into(),
            content_hash,
            trust,
            capabilities,
            verified_at: Utc::now(),
        };

        let mut records = self.records.write().expect("trust store lock poisoned");
        records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Elevate an already-verified plugin to [`TrustLevel::Full`],
    /// the explicit upgrade `full` trust requires. No-op on the
    /// capability set.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotRegistered`] if no record exists for
    /// `plugin_id`.
    pub fn elevate(&self, plugin_id: &str) -> Result<(), PluginError> {
        let mut records = self.records.write().expect("trust store lock poisoned");
        let record = records.get_mut(plugin_id).ok_or_else(|| PluginError::NotRegistered(plugin_id.to_string()))?;
        record.trust = TrustLevel::Full;
        record.verified_at = Utc::now();
        Ok(())
    }

    /// `revokeTrust`: delete the record for `plugin_id`. Subsequent
    /// capability checks for it deny with [`PluginError::NotRegistered`].
    pub fn revoke_trust(&self, plugin_id: &str) {
        let mut records = self.records.write().expect("trust store lock poisoned");
        records.remove(plugin_id);
    }

    /// The full gate: verify `bytes` hashes to the plugin's stored
    /// `content_hash`, that its trust level is not `none`, and that it
    /// has been granted `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotRegistered`], [`PluginError::HashMismatch`],
    /// [`PluginError::Untrusted`], or [`PluginError::CapabilityDenied`]
    /// as appropriate.
    pub fn authorize(&self, plugin_id: &str, bytes: &[u8], capability: Capability) -> Result<(), PluginError> {
        let records = self.records.read().expect("trust store lock poisoned");
        let record = records.get(plugin_id).ok_or_else(|| PluginError::NotRegistered(plugin_id.to_string()))?;

        verify(plugin_id, bytes, &record.content_hash)?;

        if record.trust == TrustLevel::None {
            return Err(PluginError::Untrusted(plugin_id.to_string()));
        }
        if !record.capabilities.contains(&capability) {
            return Err(PluginError::CapabilityDenied { plugin_id: plugin_id.to_string(), capability });
        }
        Ok(())
    }

    /// Look up the current record for `plugin_id`, if any.
    #[must_use]
    pub fn get(&self, plugin_id: &str) -> Option<TrustedPluginRecord> {
        self.records.read().expect("trust store lock poisoned").get(plugin_id).cloned()
    }
}
