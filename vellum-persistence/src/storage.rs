//! Durable storage for session records.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use vellum_types::SessionSummary;

use crate::error::StorageError;
use crate::record::SessionRecord;

/// Persists and loads [`SessionRecord`]s.
///
/// Messages are append-only from the caller's point of view: `save`
/// always writes the full current record, but callers are expected to
/// only ever grow `session.messages` (via [`SessionRecord::rollback`]
/// for the sole sanctioned exception, truncation to a checkpoint).
pub trait SessionStorage: Send + Sync {
    /// Save a record (create or update), bumping its version.
    fn save(&self, record: &mut SessionRecord) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Load a record by session id.
    fn load(&self, id: &str) -> impl Future<Output = Result<SessionRecord, StorageError>> + Send;

    /// List summaries of all stored sessions.
    fn list(&self) -> impl Future<Output = Result<Vec<SessionSummary>, StorageError>> + Send;

    /// Delete a session by id.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// In-memory session storage backed by a concurrent hash map. Suitable
/// for tests and short-lived processes; nothing survives past the
/// process.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStorage {
    records: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl InMemorySessionStorage {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, record: &mut SessionRecord) -> Result<(), StorageError> {
        record.version += 1;
        let mut map = self.records.write().await;
        map.insert(record.metadata.id.clone(), record.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<SessionRecord, StorageError> {
        let map = self.records.read().await;
        map.get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, StorageError> {
        let map = self.records.read().await;
        Ok(map.values().map(|r| r.session.summary()).collect())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut map = self.records.write().await;
        map.remove(id).ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(())
    }
}

/// File-based session storage, one JSON document per session at
/// `{directory}/{id}.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    directory: PathBuf,
}

impl FileSessionStorage {
    /// Create a store rooted at `directory`. The directory is created
    /// lazily on first `save`.
    #[must_use]
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.directory.join(format!("{id}.json"))
    }
}

impl SessionStorage for FileSessionStorage {
    async fn save(&self, record: &mut SessionRecord) -> Result<(), StorageError> {
        record.version += 1;
        tokio::fs::create_dir_all(&self.directory).await?;
        let json = serde_json::to_string_pretty(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        tokio::fs::write(self.path_for(&record.metadata.id), json).await?;
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<SessionRecord, StorageError> {
        let path = self.path_for(id);
        let data = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { StorageError::NotFound(id.to_string()) } else { StorageError::Io(e) }
        })?;
        serde_json::from_str(&data).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, StorageError> {
        let mut summaries = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(summaries),
            Err(e) => return Err(StorageError::Io(e)),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let data = tokio::fs::read_to_string(&path).await?;
                if let Ok(record) = serde_json::from_str::<SessionRecord>(&data) {
                    summaries.push(record.session.summary());
                }
            }
        }
        Ok(summaries)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let path = self.path_for(id);
        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { StorageError::NotFound(id.to_string()) } else { StorageError::Io(e) }
        })
    }
}
