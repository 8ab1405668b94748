#![deny(missing_docs)]
//! Google Gemini `generateContent` adapter implementing
//! [`vellum_provider::Provider`].

mod client;
mod error;
mod mapping;
mod streaming;

pub use client::Google;
