//! Credential lookup interface.
//!
//! Credential *storage* is explicitly out of scope for this runtime;
//! this module defines only the interface adapters use to ask an
//! external collaborator for a secret, plus a zeroized holder so a
//! resolved credential never lingers in memory longer than it must.

use std::future::Future;

use zeroize::Zeroizing;

/// An opaque secret value. Not `Clone`, not `Debug`-transparent, not
/// `Serialize` — the only way to read it is [`SecretValue::with_bytes`],
/// which confines exposure to the closure's scope. Memory is zeroed on
/// drop.
pub struct SecretValue {
    inner: Zeroizing<Vec<u8>>,
}

impl SecretValue {
    /// Wrap raw secret bytes. The input is moved, not copied.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Zeroizing::new(bytes),
        }
    }

    /// Scoped exposure: the secret is only visible inside `f`.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.inner)
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

/// Resolves a provider name to a credential, deferring to whatever
/// external store (keychain, environment, vault) the embedding
/// application wires up.
pub trait CredentialLookup: Send + Sync {
    /// Resolve the credential for `provider_name`, if one is
    /// configured.
    fn resolve(&self, provider_name: &str) -> impl Future<Output = Option<SecretValue>> + Send;
}
