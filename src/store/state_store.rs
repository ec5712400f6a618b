//! Persisted state store trait and implementations.
//!
//! The core persists two small maps across sessions: the truncation cache
//! (repositories known to exceed the listing size limit) and nothing else
//! that outlives a navigation. Each read or write is a whole-value
//! get/set so concurrent navigations degrade to last-writer-wins rather
//! than corruption.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during state store operations.
#[derive(Debug, Error)]
pub enum StateStoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for state store operations.
pub type Result<T> = std::result::Result<T, StateStoreError>;

// =============================================================================
// StateStore Trait
// =============================================================================

/// A persisted key-value surface for small JSON documents.
///
/// Keys name whole documents (e.g. `"huge-repos"`); values are replaced
/// atomically per `set`. There is no partial update: callers read, mutate
/// and write back the whole value.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the value stored under a key, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under a key.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

// =============================================================================
// MemoryStateStore
// =============================================================================

/// An in-memory state store, intended primarily for testing.
#[derive(Default)]
pub struct MemoryStateStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStateStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self.values.read().unwrap();
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.write().unwrap();
        values.insert(key.to_string(), value);
        Ok(())
    }
}

// =============================================================================
// JsonFileStateStore
// =============================================================================

/// A state store persisted as a single JSON file.
///
/// The whole document is rewritten on every `set`; the stored state is a
/// handful of small maps, so this stays cheap. The write goes through a
/// temporary file and rename so a crash cannot leave a half-written file.
pub struct JsonFileStateStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonFileStateStore {
    /// Create a store backed by the given file path.
    ///
    /// The file does not need to exist yet; it is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<HashMap<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, doc: &HashMap<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        let doc = self.read_document().await?;
        Ok(doc.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.insert(key.to_string(), value);
        self.write_document(&doc).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStateStore::new();

        assert!(store.get("missing").await.unwrap().is_none());

        store.set("key", json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(json!({"a": 1})));

        store.set("key", json!({"a": 2})).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(json!({"a": 2})));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let store = JsonFileStateStore::new(&path);

        assert!(store.get("key").await.unwrap().is_none());

        store.set("key", json!([1, 2, 3])).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        {
            let store = JsonFileStateStore::new(&path);
            store.set("huge-repos", json!({"o/r": 42})).await.unwrap();
        }

        let store = JsonFileStateStore::new(&path);
        assert_eq!(
            store.get("huge-repos").await.unwrap(),
            Some(json!({"o/r": 42}))
        );
    }

    #[tokio::test]
    async fn test_file_store_keys_independent() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStateStore::new(temp_dir.path().join("state.json"));

        store.set("a", json!(1)).await.unwrap();
        store.set("b", json!(2)).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));
        assert_eq!(store.get("b").await.unwrap(), Some(json!(2)));
    }
}
