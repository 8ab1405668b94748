//! The provider boundary of the Vellum agent runtime: a single
//! [`Provider`] trait that every LLM backend adapter implements, plus
//! the retry policy and credential-lookup interface the agent loop
//! needs to drive it.
//!
//! This crate defines the contract; concrete adapters live in sibling
//! `vellum-provider-*` crates.

#![deny(missing_docs)]

mod error;
mod request;
mod retry;
mod secret;

pub use error::ProviderError;
pub use request::{
    CompletionRequest, CompletionResponse, ReasoningEffort, SamplingParams, ThinkingConfig,
    ToolDefinition,
};
pub use retry::RetryPolicy;
pub use secret::{CredentialLookup, SecretValue};

use std::future::Future;
use std::pin::Pin;

use futures::Stream;
use vellum_types::StreamEvent;

/// A boxed, pinned stream of normalized stream events, as returned by
/// [`Provider::stream`].
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ProviderError>> + Send>>;

/// Interface implemented by each LLM backend adapter.
///
/// This trait uses return-position `impl Trait` and is intentionally
/// not object-safe: the agent loop is generic over `P: Provider`
/// rather than storing providers behind a trait object, since each
/// session is bound to exactly one provider for its lifetime.
pub trait Provider: Send + Sync {
    /// The provider's stable name (e.g. `"anthropic"`), used in log
    /// fields and credential lookups.
    fn name(&self) -> &str;

    /// Issue a non-streaming completion request.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send;

    /// Issue a streaming completion request, returning normalized
    /// stream events as they arrive.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionStream, ProviderError>> + Send;

    /// Synchronous, format-only credential validation (e.g. a key
    /// prefix regex). Must never issue a network request.
    fn validate_credential_format(&self, credential: &str) -> bool;
}
