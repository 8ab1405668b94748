#![deny(missing_docs)]
//! Anthropic Messages API adapter implementing [`vellum_provider::Provider`].

mod client;
mod error;
mod mapping;
mod streaming;

pub use client::Anthropic;
