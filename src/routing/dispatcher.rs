//! Route dispatch.
//!
//! # Responsibilities
//! - Resolve a parsed [`Route`] to storage keys via the registry
//! - Call the fetcher or aggregator
//! - Apply article lookup and date filtering
//!
//! # Design Decisions
//! - Stateless apart from shared immutable components
//! - Two-segment generic paths are reserved for articles; any other
//!   category with a sub-key is a bad request, registered or not

use std::sync::Arc;

use serde_json::Value;

use crate::documents::range::{filter_by_date, RangeQuery};
use crate::documents::{Aggregator, Document, DocumentFetcher, FetchError};
use crate::error::ApiError;
use crate::registry::{self, KeyRegistry, Namespace};
use crate::routing::Route;

/// Maps routes to documents.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<KeyRegistry>,
    fetcher: DocumentFetcher,
    aggregator: Aggregator,
}

impl Dispatcher {
    pub fn new(registry: Arc<KeyRegistry>, fetcher: DocumentFetcher, aggregator: Aggregator) -> Self {
        Self {
            registry,
            fetcher,
            aggregator,
        }
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Produce the response document for a route.
    ///
    /// `query` is only consulted by the daily-bars route.
    pub async fn dispatch(&self, route: &Route, query: &RangeQuery) -> Result<Document, ApiError> {
        match route {
            Route::Series {
                namespace,
                identifier,
            } => self.series(*namespace, identifier).await,
            Route::Aggregate { namespace } => Ok(self.aggregate(*namespace).await),
            Route::DailyBars { symbol } => self.daily_bars(symbol, query).await,
            Route::Articles { id } => self.articles(id.as_deref()).await,
            Route::Category { category, key } => self.category(category, key.as_deref()).await,
            Route::Unknown => Err(ApiError::not_found("Resource not found")),
        }
    }

    async fn series(&self, namespace: Namespace, identifier: &str) -> Result<Document, ApiError> {
        let key = self
            .registry
            .lookup(namespace, identifier)
            .ok_or_else(|| ApiError::not_found(format!("Indicator {} not found", identifier)))?;
        Ok(self.fetcher.fetch(key).await?)
    }

    async fn aggregate(&self, namespace: Namespace) -> Document {
        self.aggregator.fetch_all(self.registry.keys(namespace)).await
    }

    async fn daily_bars(&self, symbol: &str, query: &RangeQuery) -> Result<Document, ApiError> {
        let range = query.to_range()?;
        let key = registry::stock_key(symbol);

        let document = match self.fetcher.fetch(&key).await {
            Ok(document) => document,
            Err(e @ FetchError::NotAvailable { .. }) => {
                return Err(ApiError::NotFound {
                    message: format!("Stock data for {} not found", symbol.to_uppercase()),
                    details: Some(e.to_string()),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if range.is_unbounded() {
            return Ok(document);
        }
        match document {
            Value::Array(records) => Ok(Value::Array(filter_by_date(records, &range))),
            _ => Err(ApiError::Malformed {
                details: format!("Stock data in {} is not a list of records", key),
            }),
        }
    }

    async fn articles(&self, id: Option<&str>) -> Result<Document, ApiError> {
        let key = self
            .registry
            .lookup(Namespace::Generic, registry::ARTICLES_CATEGORY)
            .ok_or_else(|| ApiError::not_found("Category articles not found"))?;
        let articles = self.fetcher.fetch(key).await?;

        let Some(id) = id else {
            return Ok(articles);
        };
        let Value::Array(records) = articles else {
            return Err(ApiError::Malformed {
                details: format!("Articles in {} are not a list", key),
            });
        };

        records
            .into_iter()
            .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| ApiError::not_found(format!("Article with id {} not found", id)))
    }

    async fn category(&self, category: &str, key: Option<&str>) -> Result<Document, ApiError> {
        if key.is_some() {
            return Err(ApiError::bad_request("Invalid request"));
        }
        let storage_key = self
            .registry
            .lookup(Namespace::Generic, category)
            .ok_or_else(|| ApiError::not_found(format!("Category {} not found", category)))?;
        Ok(self.fetcher.fetch(storage_key).await?)
    }
}
