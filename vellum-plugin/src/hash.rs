//! Content-hash verification for plugin bytes.

use sha2::{Digest, Sha256};

use crate::error::PluginError;

/// Compute the lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Reject anything that isn't 64 lowercase hex characters, matching
/// the wire format's parse-time validation.
///
/// # Errors
///
/// Returns [`PluginError::MalformedHash`] if `hash` is not exactly 64
/// hex digits.
pub fn validate_hash_format(hash: &str) -> Result<(), PluginError> {
    let well_formed = hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit());
    if well_formed {
        Ok(())
    } else {
        Err(PluginError::MalformedHash(hash.to_string()))
    }
}

/// Verify that `bytes` hashes to `expected_hash`.
///
/// # Errors
///
/// Returns [`PluginError::HashMismatch`] if the computed digest differs
/// from `expected_hash`. Comparison is case-sensitive, matching the
/// wire format's stated semantics.
pub fn verify(plugin_id: &str, bytes: &[u8], expected_hash: &str) -> Result<(), PluginError> {
    if content_hash(bytes) == expected_hash {
        Ok(())
    } else {
        Err(PluginError::HashMismatch { plugin_id: plugin_id.to_string() })
    }
}
