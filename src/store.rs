//! Persistent store adapter for todos
//!
//! The whole task collection lives under one key as a single JSON array.
//! Every read deserializes the full blob and every write replaces it; there
//! are no partial updates and no schema versions.
//!
//! ```text
//! <store dir>/
//!   todos.toml          # optional configuration
//!   <key>.json          # the collection, e.g. tasks.json
//!   <key>.json.lock     # advisory lock held during read-modify-write
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::Task;

/// Default key the collection is stored under
pub const DEFAULT_KEY: &str = "tasks";

/// Held for the duration of one read-modify-write; released on drop.
#[derive(Debug)]
pub enum StoreGuard {
    File(FileLock),
    Unlocked,
}

impl StoreGuard {
    /// Lock file backing this guard, if any.
    pub fn lock_path(&self) -> Option<&Path> {
        match self {
            StoreGuard::File(lock) => Some(lock.path()),
            StoreGuard::Unlocked => None,
        }
    }
}

/// Key-value style storage of the full task collection.
pub trait Store {
    /// Read the full collection. A missing or unreadable blob yields an empty list.
    fn read(&self) -> Result<Vec<Task>>;

    /// Replace the full collection.
    fn write(&self, tasks: &[Task]) -> Result<()>;

    /// Exclude other writers until the guard is dropped.
    fn lock(&self) -> Result<StoreGuard>;
}

/// Store backed by one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    key: String,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self {
            root: root.into(),
            key,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        })
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path of the blob holding the collection
    pub fn blob_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.key))
    }

    /// Path of the sidecar lock file
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(format!("{}.json.lock", self.key))
    }
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "invalid store key '{}': use letters, digits, '-', '_' or '.'",
            key
        )))
    }
}

impl Store for FileStore {
    fn read(&self) -> Result<Vec<Task>> {
        let path = self.blob_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(Error::Io(err)),
        };
        Ok(decode_collection(&content, &path))
    }

    fn write(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks)?;
        lock::write_atomic(self.blob_path(), json.as_bytes())?;
        tracing::debug!(key = %self.key, count = tasks.len(), "collection written");
        Ok(())
    }

    fn lock(&self) -> Result<StoreGuard> {
        let lock = FileLock::acquire(self.lock_path(), self.lock_timeout_ms)?;
        Ok(StoreGuard::File(lock))
    }
}

fn decode_collection(content: &str, path: &Path) -> Vec<Task> {
    if content.trim().is_empty() || content.trim() == "null" {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Task>>(content) {
        Ok(tasks) => tasks,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "stored collection is unreadable; treating it as empty"
            );
            Vec::new()
        }
    }
}

/// In-process store, used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
        }
    }
}

impl Store for MemoryStore {
    fn read(&self) -> Result<Vec<Task>> {
        let tasks = self
            .tasks
            .lock()
            .map_err(|_| Error::OperationFailed("memory store poisoned".to_string()))?;
        Ok(tasks.clone())
    }

    fn write(&self, tasks: &[Task]) -> Result<()> {
        let mut stored = self
            .tasks
            .lock()
            .map_err(|_| Error::OperationFailed("memory store poisoned".to_string()))?;
        *stored = tasks.to_vec();
        Ok(())
    }

    fn lock(&self) -> Result<StoreGuard> {
        Ok(StoreGuard::Unlocked)
    }
}
