#![deny(missing_docs)]
//! Ollama Chat API adapter implementing [`vellum_provider::Provider`].
//!
//! Ollama runs locally and needs no credential; streaming uses
//! newline-delimited JSON rather than SSE.

mod client;
mod error;
mod mapping;
mod streaming;

pub use client::Ollama;
