//! Session persistence, checkpointing, and content-addressed file
//! snapshots.
//!
//! Two independent concerns live here: [`storage`] persists
//! [`record::SessionRecord`]s (messages, checkpoints, incremental sync
//! cursor), while [`shadow`] tracks working-tree snapshots keyed by
//! content hash, unrelated to message indices.

mod error;
mod record;
mod shadow;
mod storage;

pub use error::StorageError;
pub use record::{SessionMetadata, SessionRecord};
pub use shadow::{hash_tree, ChangeKind, FileDiff, FileShadowStore, InMemoryShadowStore, ShadowSnapshot, ShadowStore, WorkingTree};
pub use storage::{FileSessionStorage, InMemorySessionStorage, SessionStorage};
