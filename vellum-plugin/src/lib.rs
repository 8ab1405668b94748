//! Trusted-plugin gate: content-hash verification and capability
//! scoping for plugin-supplied tool handlers.
//!
//! Before a plugin's tool handler is registered or invoked, three
//! checks must all pass: the plugin's bytes hash to the stored
//! [`vellum_types::TrustedPluginRecord::content_hash`], its trust
//! level is not `none`, and the capability the operation needs is in
//! its granted set. [`store::TrustStore::authorize`] runs all three.

mod error;
mod hash;
mod store;

pub use error::PluginError;
pub use hash::{content_hash, validate_hash_format, verify};
pub use store::TrustStore;
