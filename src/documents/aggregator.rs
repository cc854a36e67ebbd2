//! Best-effort concatenation of several list documents.

use futures_util::stream::{self, StreamExt};
use serde_json::Value;

use super::fetcher::{Document, DocumentFetcher};
use crate::observability::metrics;

/// Fetches many keys and concatenates their records in key order.
///
/// A key that fails to fetch, fails to decode, or does not hold a list is
/// skipped; the aggregate itself never fails.
#[derive(Debug, Clone)]
pub struct Aggregator {
    fetcher: DocumentFetcher,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(fetcher: DocumentFetcher, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn fetch_all<I, S>(&self, keys: I) -> Document
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let total = keys.len();

        // `buffered` yields in input order regardless of completion order.
        let fetched: Vec<(String, _)> = stream::iter(keys)
            .map(|key| {
                let fetcher = self.fetcher.clone();
                async move {
                    let result = fetcher.fetch(&key).await;
                    (key, result)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut combined = Vec::new();
        for (key, result) in fetched {
            match result {
                Ok(Value::Array(records)) => combined.extend(records),
                Ok(_) => {
                    tracing::warn!(key = %key, "Skipping non-list document in aggregate");
                    metrics::record_aggregate_skip();
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping unavailable document in aggregate");
                    metrics::record_aggregate_skip();
                }
            }
        }

        tracing::debug!(keys = total, records = combined.len(), "Aggregate assembled");
        Value::Array(combined)
    }
}
