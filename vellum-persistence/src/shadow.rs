//! Content-addressed snapshots of the working tree, independent of
//! session/message persistence.
//!
//! The runtime takes a shadow snapshot before any tool execution with
//! file-system side effects, so a session can be rolled back to a
//! known-good tree even if the model's own checkpoint granularity
//! (message count) doesn't line up with exactly what changed on disk.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::StorageError;

/// A snapshot of file contents at a point in time, keyed by path.
/// Callers are responsible for scanning the actual filesystem into
/// this shape; the store only ever sees bytes.
pub type WorkingTree = BTreeMap<PathBuf, Vec<u8>>;

/// How a file differs between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Present in the later snapshot only.
    Added,
    /// Present in the earlier snapshot only.
    Removed,
    /// Present in both, with different contents.
    Modified,
}

/// One file's change between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// The file's path within the tree.
    pub path: PathBuf,
    /// What changed.
    pub kind: ChangeKind,
}

/// A recorded snapshot: its content hash, the caller-supplied label
/// (typically the tool call that triggered it), and when it was taken.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShadowSnapshot {
    /// Content hash of the tree at the time of the snapshot.
    pub hash: String,
    /// Caller-supplied label, e.g. the triggering tool call.
    pub label: String,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

/// Hash a working tree deterministically: sort by path, hash path then
/// content length then content for every entry.
#[must_use]
pub fn hash_tree(tree: &WorkingTree) -> String {
    let mut hasher = Sha256::new();
    for (path, contents) in tree {
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update((contents.len() as u64).to_le_bytes());
        hasher.update(contents);
    }
    hex::encode(hasher.finalize())
}

/// A content-addressed store of working-tree snapshots.
pub trait ShadowStore: Send + Sync {
    /// Record the current tree under `label`. Idempotent: if the tree
    /// is unchanged from the most recently taken snapshot, returns that
    /// snapshot's hash without creating a new entry.
    fn take(&self, label: &str, tree: &WorkingTree) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// List all snapshots, oldest first.
    fn list(&self) -> impl Future<Output = Result<Vec<ShadowSnapshot>, StorageError>> + Send;

    /// Restore the tree recorded at `hash`.
    fn restore(&self, hash: &str) -> impl Future<Output = Result<WorkingTree, StorageError>> + Send;

    /// Diff the snapshot at `hash` against the snapshot immediately
    /// preceding it chronologically (the empty tree if `hash` is the
    /// first snapshot taken).
    fn diff(&self, hash: &str) -> impl Future<Output = Result<Vec<FileDiff>, StorageError>> + Send;
}

fn diff_trees(before: &WorkingTree, after: &WorkingTree) -> Vec<FileDiff> {
    let mut diffs = Vec::new();
    for (path, after_contents) in after {
        match before.get(path) {
            None => diffs.push(FileDiff { path: path.clone(), kind: ChangeKind::Added }),
            Some(before_contents) if before_contents != after_contents => {
                diffs.push(FileDiff { path: path.clone(), kind: ChangeKind::Modified });
            }
            Some(_) => {}
        }
    }
    for path in before.keys() {
        if !after.contains_key(path) {
            diffs.push(FileDiff { path: path.clone(), kind: ChangeKind::Removed });
        }
    }
    diffs.sort_by(|a, b| a.path.cmp(&b.path));
    diffs
}

struct StoredSnapshot {
    meta: ShadowSnapshot,
    tree: WorkingTree,
}

/// In-memory shadow store. Snapshots are lost when the process exits.
#[derive(Default)]
pub struct InMemoryShadowStore {
    snapshots: Arc<RwLock<Vec<StoredSnapshot>>>,
}

impl InMemoryShadowStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShadowStore for InMemoryShadowStore {
    async fn take(&self, label: &str, tree: &WorkingTree) -> Result<String, StorageError> {
        let hash = hash_tree(tree);
        let mut snapshots = self.snapshots.write().await;
        if let Some(latest) = snapshots.last() {
            if latest.meta.hash == hash {
                return Ok(hash);
            }
        }
        snapshots.push(StoredSnapshot {
            meta: ShadowSnapshot { hash: hash.clone(), label: label.to_string(), taken_at: Utc::now() },
            tree: tree.clone(),
        });
        Ok(hash)
    }

    async fn list(&self) -> Result<Vec<ShadowSnapshot>, StorageError> {
        Ok(self.snapshots.read().await.iter().map(|s| s.meta.clone()).collect())
    }

    async fn restore(&self, hash: &str) -> Result<WorkingTree, StorageError> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .iter()
            .find(|s| s.meta.hash == hash)
            .map(|s| s.tree.clone())
            .ok_or_else(|| StorageError::NotFound(hash.to_string()))
    }

    async fn diff(&self, hash: &str) -> Result<Vec<FileDiff>, StorageError> {
        let snapshots = self.snapshots.read().await;
        let index = snapshots.iter().position(|s| s.meta.hash == hash).ok_or_else(|| StorageError::NotFound(hash.to_string()))?;
        let before = index.checked_sub(1).map(|i| &snapshots[i].tree);
        let empty = WorkingTree::new();
        Ok(diff_trees(before.unwrap_or(&empty), &snapshots[index].tree))
    }
}

/// Content-addressed filesystem shadow store.
///
/// Layout:
/// ```text
/// root/
///   objects/<hash>.json   -- serialized WorkingTree
///   manifest.jsonl        -- append-only {hash, label, taken_at} log, chronological
/// ```
///
/// A `tokio::sync::Mutex` serializes manifest appends; object writes
/// are content-addressed and therefore safe to race.
pub struct FileShadowStore {
    root: PathBuf,
    manifest_lock: tokio::sync::Mutex<()>,
}

impl FileShadowStore {
    /// Create a store rooted at `root`. Directories are created lazily
    /// on first `take`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root, manifest_lock: tokio::sync::Mutex::new(()) }
    }

    fn object_path(&self, hash: &str) -> PathBuf {
        self.root.join("objects").join(format!("{hash}.json"))
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.jsonl")
    }

    async fn read_manifest(&self) -> Result<Vec<ShadowSnapshot>, StorageError> {
        let data = match tokio::fs::read_to_string(self.manifest_path()).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };
        data.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| StorageError::Serialization(e.to_string())))
            .collect()
    }

    async fn load_tree(&self, hash: &str) -> Result<WorkingTree, StorageError> {
        let data = tokio::fs::read_to_string(self.object_path(hash)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { StorageError::NotFound(hash.to_string()) } else { StorageError::Io(e) }
        })?;
        serde_json::from_str(&data).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

impl ShadowStore for FileShadowStore {
    async fn take(&self, label: &str, tree: &WorkingTree) -> Result<String, StorageError> {
        let hash = hash_tree(tree);
        let _guard = self.manifest_lock.lock().await;

        let manifest = self.read_manifest().await?;
        if manifest.last().is_some_and(|latest| latest.hash == hash) {
            return Ok(hash);
        }

        tokio::fs::create_dir_all(self.root.join("objects")).await?;
        let object_json = serde_json::to_string(tree).map_err(|e| StorageError::Serialization(e.to_string()))?;
        tokio::fs::write(self.object_path(&hash), object_json).await?;

        let entry = ShadowSnapshot { hash: hash.clone(), label: label.to_string(), taken_at: Utc::now() };
        let entry_json = serde_json::to_string(&entry).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut line = entry_json;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(self.manifest_path()).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, line.as_bytes()).await?;

        Ok(hash)
    }

    async fn list(&self) -> Result<Vec<ShadowSnapshot>, StorageError> {
        self.read_manifest().await
    }

    async fn restore(&self, hash: &str) -> Result<WorkingTree, StorageError> {
        self.load_tree(hash).await
    }

    async fn diff(&self, hash: &str) -> Result<Vec<FileDiff>, StorageError> {
        let manifest = self.read_manifest().await?;
        let index = manifest.iter().position(|s| s.hash == hash).ok_or_else(|| StorageError::NotFound(hash.to_string()))?;
        let after = self.load_tree(hash).await?;
        let before = match index.checked_sub(1) {
            Some(i) => self.load_tree(&manifest[i].hash).await?,
            None => WorkingTree::new(),
        };
        Ok(diff_trees(&before, &after))
    }
}
