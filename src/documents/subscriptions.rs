//! Newsletter subscription list.
//!
//! # Responsibilities
//! - Validate a signup
//! - Read the stored list, append one record, write the whole list back
//!
//! # Design Decisions
//! - A list that cannot be read is treated as empty (it may not exist yet)
//! - A list that reads but does not decode is never overwritten
//! - No locking and no conditional write: two concurrent signups can race
//!   and the later write wins

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;

use super::fetcher::{DocumentFetcher, FetchError};
use crate::observability::metrics;

/// Incoming signup, as posted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscribeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subscribe: Option<bool>,
}

/// One stored record of the subscription list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub email: String,
    pub subscribe: bool,
}

impl SubscribeRequest {
    /// Check required fields and normalize into a stored record.
    pub fn validate(self) -> Result<Subscription, SubscribeError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        Ok(Subscription {
            name,
            email,
            subscribe: self.subscribe.unwrap_or(false),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, SubscribeError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(SubscribeError::MissingField(field))
}

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error(transparent)]
    Fetch(FetchError),

    #[error("Subscription list {key} is not a list")]
    NotAList { key: String },

    #[error("Unable to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Appends records to the subscription list document.
#[derive(Debug, Clone)]
pub struct SubscriptionAppender {
    fetcher: DocumentFetcher,
    key: String,
}

impl SubscriptionAppender {
    pub fn new(fetcher: DocumentFetcher, key: impl Into<String>) -> Self {
        Self {
            fetcher,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Validate and append one signup. Returns the stored record.
    pub async fn subscribe(&self, request: SubscribeRequest) -> Result<Subscription, SubscribeError> {
        let record = request.validate()?;
        let result = self.append(&record).await;
        match &result {
            Ok(len) => {
                tracing::info!(key = %self.key, entries = len, "Subscription recorded");
                metrics::record_subscription("ok");
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Subscription failed");
                metrics::record_subscription("error");
            }
        }
        result.map(|_| record)
    }

    async fn append(&self, record: &Subscription) -> Result<usize, SubscribeError> {
        let mut entries = match self.fetcher.fetch(&self.key).await {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                return Err(SubscribeError::NotAList {
                    key: self.key.clone(),
                })
            }
            Err(e) if e.is_missing() => {
                tracing::warn!(key = %self.key, "Subscription list missing, starting a new one");
                Vec::new()
            }
            Err(e) => return Err(SubscribeError::Fetch(e)),
        };

        let value = serde_json::to_value(record).map_err(|e| self.write_error(e))?;
        entries.push(value);
        let bytes = serde_json::to_vec(&entries).map_err(|e| self.write_error(e))?;

        match timeout(self.fetcher.deadline(), self.fetcher.store().put(&self.key, bytes)).await {
            Ok(Ok(())) => Ok(entries.len()),
            Ok(Err(e)) => Err(self.write_error(e)),
            Err(_) => Err(self.write_error(format!("timed out after {:?}", self.fetcher.deadline()))),
        }
    }

    fn write_error(&self, reason: impl ToString) -> SubscribeError {
        SubscribeError::Write {
            key: self.key.clone(),
            reason: reason.to_string(),
        }
    }
}
