//! Context-window tracking and history compaction.
//!
//! Tracks a session's estimated token usage against a model's context
//! window, classifies it into a [`vellum_types::ContextLevel`], and
//! drives the compaction protocol that replaces a prefix of older
//! messages with a generated summary once usage crosses the warning
//! threshold. See [`filter::effective_history`] for how a
//! compaction-forested message list is reduced to the set actually
//! sent to a provider.

mod compaction;
mod estimate;
mod error;
mod filter;
mod state;
mod threshold;

pub use compaction::{compact, Summarizer};
pub use error::ContextError;
pub use estimate::TokenEstimator;
pub use filter::effective_history;
pub use state::{classify, derive_state};
pub use threshold::{ThresholdProfile, ThresholdTable};
