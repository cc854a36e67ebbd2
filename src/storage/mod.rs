//! Object storage subsystem.
//!
//! # Data Flow
//! ```text
//! Document fetcher / subscription appender
//!     → ObjectStore::get / ObjectStore::put (raw bytes)
//!     → memory.rs (tests, demos)
//!     → fs.rs     (local directory)
//!     → s3.rs     (one S3 bucket, feature "s3")
//! ```
//!
//! # Design Decisions
//! - Byte-oriented key/value contract; JSON decoding happens above this layer
//! - Missing objects are a distinct error so callers can treat them as empty
//! - No retries here; the caller decides how to classify failures

pub mod fs;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::schema::{StorageBackend, StorageConfig};

pub use fs::LocalStore;
pub use memory::MemoryStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

/// Errors returned by an object store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object exists under the key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The key is empty or would escape the store.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// Any other backend failure (I/O, access denied, network).
    #[error("storage backend error for '{key}': {reason}")]
    Backend { key: String, reason: String },
}

impl StorageError {
    pub fn backend(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Backend {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A flat byte-oriented key/value store.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Read the full object stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Replace the object stored under `key`.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()>;
}

/// Build the store selected by configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Local => {
            tracing::info!(root = %config.root.display(), "Using local object store");
            Ok(Arc::new(LocalStore::new(&config.root)))
        }
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            let store = S3Store::from_config(config).await?;
            tracing::info!(bucket = %config.bucket, prefix = ?config.prefix, "Using S3 object store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(StorageError::backend(
            config.bucket.clone(),
            "built without the `s3` feature",
        )),
    }
}
