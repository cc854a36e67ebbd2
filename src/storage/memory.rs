//! In-memory object store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use super::{ObjectStore, StorageError, StorageResult};

/// A thread-safe map of key -> bytes.
///
/// Keys registered with [`MemoryStore::fail_key`] return a backend error on
/// every access, which lets tests exercise partial-failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<DashMap<String, Vec<u8>>>,
    failing: Arc<DashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under a key.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects.insert(key.into(), bytes.into());
    }

    /// Store a JSON value under a key.
    pub fn insert_json(&self, key: impl Into<String>, value: &serde_json::Value) {
        self.insert(key, value.to_string());
    }

    /// Make every access to `key` fail with a backend error.
    pub fn fail_key(&self, key: impl Into<String>) {
        self.failing.insert(key.into());
    }

    /// Current bytes under a key, if any.
    pub fn snapshot(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.get(key).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn check(&self, key: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        if self.failing.contains(key) {
            return Err(StorageError::backend(key, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.check(key)?;
        self.objects
            .get(key)
            .map(|r| r.value().clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        self.check(key)?;
        self.objects.insert(key.to_string(), bytes);
        Ok(())
    }
}
