//! Comment snapshot persistence
//!
//! Provides the pluggable storage adapter behind the comment store: a flat
//! list of comments is loaded, overwritten, or cleared as one JSON array
//! under a fixed namespace key. Two variants exist: `MemoryStorage`
//! (process-lifetime only) and `FileStorage` (survives restarts).
//!
//! Storage is best-effort by contract: `load` never fails (missing,
//! malformed, or non-array content reads as an empty list) and `save`
//! failures are swallowed after a warning. The comment layer must keep
//! working when the backend is absent or full.

use directories::ProjectDirs;
use pin_model::Comment;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Namespace key the durable snapshot is stored under.
pub const DEFAULT_NAMESPACE: &str = "pagepin-comments";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Storage variant selected at enable time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// Ephemeral, process-lifetime only
    #[default]
    Memory,
    /// Survives restarts; falls back to memory if the backend fails a live
    /// write/read probe
    Durable,
}

/// Persist/restore/clear a flat list of comments.
///
/// Implementations never mutate the list they are handed - they only
/// serialize and deserialize snapshots.
pub trait CommentStorage {
    /// Return the persisted list, or an empty list if nothing is stored or
    /// the stored value is unusable. Never fails.
    fn load(&self) -> Vec<Comment>;

    /// Overwrite the persisted snapshot. Best-effort; failures are
    /// swallowed.
    fn save(&mut self, comments: &[Comment]);

    /// Remove the persisted snapshot entirely, so a later `load` returns
    /// empty without any stale key lingering. Distinct from saving an empty
    /// list.
    fn clear(&mut self);
}

/// Ephemeral storage holding the snapshot in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: Option<Vec<Comment>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommentStorage for MemoryStorage {
    fn load(&self) -> Vec<Comment> {
        self.snapshot.clone().unwrap_or_default()
    }

    fn save(&mut self, comments: &[Comment]) {
        self.snapshot = Some(comments.to_vec());
    }

    fn clear(&mut self) {
        self.snapshot = None;
    }
}

/// Durable storage writing one JSON array per namespace under a root
/// directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    namespace: String,
}

impl FileStorage {
    /// Storage rooted at the platform-local data directory.
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs =
            ProjectDirs::from("dev", "PagePin", "PagePin").ok_or(StorageError::NoDataDirectory)?;

        Ok(Self::with_root(dirs.data_local_dir(), DEFAULT_NAMESPACE))
    }

    /// Storage rooted at an explicit directory (used by tests).
    pub fn with_root(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self { root: root.into(), namespace: namespace.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.namespace))
    }

    /// Verify the backend actually accepts writes and reads them back.
    ///
    /// Run at selection time; a failed probe demotes a durable request to
    /// memory storage.
    pub fn probe(&self) -> bool {
        let marker = self.root.join(format!("{}.probe", self.namespace));
        let payload = b"pagepin-probe";

        let ok = fs::create_dir_all(&self.root)
            .and_then(|_| fs::write(&marker, payload))
            .and_then(|_| fs::read(&marker))
            .map(|read| read == payload)
            .unwrap_or(false);

        let _ = fs::remove_file(&marker);
        ok
    }

    fn try_load(&self) -> Result<Vec<Comment>, StorageError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(path)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        if !value.is_array() {
            debug!(namespace = %self.namespace, "stored snapshot is not an array, treating as empty");
            return Ok(Vec::new());
        }

        Ok(serde_json::from_value(value)?)
    }

    fn try_save(&self, comments: &[Comment]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let bytes = serde_json::to_vec(comments)?;

        // Write through a temp file so a failed write never truncates the
        // previous snapshot.
        let temp_path = self.snapshot_path().with_extension("json.tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, self.snapshot_path())?;
        Ok(())
    }
}

impl CommentStorage for FileStorage {
    fn load(&self) -> Vec<Comment> {
        match self.try_load() {
            Ok(comments) => comments,
            Err(err) => {
                warn!(namespace = %self.namespace, error = %err, "failed to load snapshot, treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&mut self, comments: &[Comment]) {
        if let Err(err) = self.try_save(comments) {
            warn!(namespace = %self.namespace, error = %err, "failed to save snapshot, dropping write");
        }
    }

    fn clear(&mut self) {
        let path = self.snapshot_path();
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(namespace = %self.namespace, error = %err, "failed to clear snapshot");
            }
        }
    }
}

/// Pick a storage backend for the requested kind.
///
/// A durable request is probed with a live write/read round-trip first;
/// probe failure (or an unresolvable data directory) silently degrades to
/// memory storage. `root` overrides the platform data directory, primarily
/// for tests.
pub fn select_storage(kind: StorageKind, root: Option<&Path>) -> Box<dyn CommentStorage> {
    match kind {
        StorageKind::Memory => Box::new(MemoryStorage::new()),
        StorageKind::Durable => {
            let file = match root {
                Some(root) => Ok(FileStorage::with_root(root, DEFAULT_NAMESPACE)),
                None => FileStorage::from_default_project(),
            };

            match file {
                Ok(file) if file.probe() => Box::new(file),
                Ok(file) => {
                    warn!(root = %file.root().display(), "durable storage failed probe, falling back to memory");
                    Box::new(MemoryStorage::new())
                }
                Err(err) => {
                    warn!(error = %err, "durable storage unavailable, falling back to memory");
                    Box::new(MemoryStorage::new())
                }
            }
        }
    }
}
