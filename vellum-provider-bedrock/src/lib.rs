#![deny(missing_docs)]
//! AWS Bedrock Converse API adapter implementing
//! [`vellum_provider::Provider`].
//!
//! This adapter authenticates with a long-lived Bedrock API key (bearer
//! token), not full SigV4 request signing — see [`Bedrock`] for why.

mod client;
mod error;
mod mapping;
mod streaming;

pub use client::Bedrock;
