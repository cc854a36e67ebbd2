//! Single-document retrieval.
//!
//! # Responsibilities
//! - Read one object by key with a deadline
//! - Decode it as JSON
//! - Classify failures as NotAvailable or Malformed
//!
//! # Design Decisions
//! - Missing, denied and timed-out reads all collapse into NotAvailable;
//!   `missing` records whether the backend reported the object as absent
//! - No retries: the first backend failure is the answer

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use crate::observability::metrics;
use crate::storage::{ObjectStore, StorageError};

/// A decoded JSON value read from storage.
pub type Document = serde_json::Value;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The backend could not produce the object. `missing` is set only
    /// when the backend answered that no object exists under the key.
    #[error("Unable to fetch {key}: {reason}")]
    NotAvailable {
        key: String,
        reason: String,
        missing: bool,
    },

    /// The object was read but is not valid JSON.
    #[error("Error decoding JSON in {key}: {reason}")]
    Malformed { key: String, reason: String },
}

impl FetchError {
    pub fn key(&self) -> &str {
        match self {
            FetchError::NotAvailable { key, .. } | FetchError::Malformed { key, .. } => key,
        }
    }

    /// True when the object does not exist, as opposed to being unreadable.
    pub fn is_missing(&self) -> bool {
        matches!(self, FetchError::NotAvailable { missing: true, .. })
    }
}

/// Reads and decodes documents from an object store.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    store: Arc<dyn ObjectStore>,
    deadline: Duration,
}

impl DocumentFetcher {
    pub fn new(store: Arc<dyn ObjectStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Deadline applied to every backend call.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Fetch and decode the document stored under `key`.
    pub async fn fetch(&self, key: &str) -> Result<Document, FetchError> {
        let result = self.fetch_inner(key).await;
        match &result {
            Ok(_) => metrics::record_fetch("ok"),
            Err(FetchError::NotAvailable { reason, .. }) => {
                tracing::debug!(key = %key, reason = %reason, "Document not available");
                metrics::record_fetch("not_available");
            }
            Err(FetchError::Malformed { reason, .. }) => {
                tracing::warn!(key = %key, reason = %reason, "Stored document is not valid JSON");
                metrics::record_fetch("malformed");
            }
        }
        result
    }

    async fn fetch_inner(&self, key: &str) -> Result<Document, FetchError> {
        if key.is_empty() {
            return Err(FetchError::NotAvailable {
                key: String::new(),
                reason: "storage key is empty".to_string(),
                missing: false,
            });
        }

        let bytes = match timeout(self.deadline, self.store.get(key)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                return Err(FetchError::NotAvailable {
                    key: key.to_string(),
                    missing: matches!(e, StorageError::NotFound(_)),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(FetchError::NotAvailable {
                    key: key.to_string(),
                    reason: format!("timed out after {:?}", self.deadline),
                    missing: false,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}
