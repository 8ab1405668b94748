#![deny(missing_docs)]
//! OpenAI Chat Completions adapter implementing [`vellum_provider::Provider`].
//!
//! Also covers OpenAI-compatible endpoints (Azure OpenAI, Mistral, DeepSeek,
//! and similar) that speak the same wire format via [`compatible`].

mod client;
mod error;
pub mod compatible;
mod mapping;
mod streaming;
mod types;

pub use client::OpenAI;
