//! Key-value stores backing the rating cache.
//!
//! The cache only needs `get`/`set` on string keys with JSON values, mirroring
//! the browser's extension-local storage. No transactions, no batch writes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Persistent key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` if the key was never written.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Write or overwrite a value.
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Every stored entry, sorted by key.
    async fn entries(&self) -> StoreResult<Vec<(String, Value)>>;
}

/// In-process store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.map.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.map.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn entries(&self) -> StoreResult<Vec<(String, Value)>> {
        Ok(self
            .map
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Store persisted as a single JSON object on disk.
///
/// Writes are serialized through an async mutex and land atomically
/// (temp file + rename), so a crash never leaves a half-written file.
///
/// Each `set` rewrites the whole file. The mutex only covers this instance:
/// two instances or processes writing the same file concurrently can drop
/// each other's entries, even for different keys. Share one `FileStore` per
/// file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Store at the default location: `<cache dir>/doctonote/ratings.json`.
    pub fn new() -> StoreResult<Self> {
        Ok(Self::with_path(default_store_path()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<BTreeMap<String, Value>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError::unavailable(format!(
                    "failed to read store {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StoreError::unavailable(format!(
                "failed to parse store {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let mut map = self.load().await?;
        Ok(map.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut map = self.load().await?;
        map.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::unavailable(format!("failed to create store directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| StoreError::unavailable(format!("failed to serialize store: {}", e)))?;
        write_atomic(&self.path, &json).await?;

        debug!(key, path = %self.path.display(), "stored entry");
        Ok(())
    }

    async fn entries(&self) -> StoreResult<Vec<(String, Value)>> {
        Ok(self.load().await?.into_iter().collect())
    }
}

fn default_store_path() -> StoreResult<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| StoreError::unavailable("could not determine cache directory"))?;

    Ok(base.join("doctonote").join("ratings.json"))
}

/// Per-write temp file next to `path`, unique within and across processes.
fn temp_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_extension(format!("{}.{}.tmp", std::process::id(), seq))
}

async fn write_atomic(path: &Path, content: &str) -> StoreResult<()> {
    let temp_path = temp_path(path);

    fs::write(&temp_path, content)
        .await
        .map_err(|e| StoreError::unavailable(format!("failed to write temp file: {}", e)))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StoreError::unavailable(format!("failed to rename temp file: {}", e)))?;

    Ok(())
}
