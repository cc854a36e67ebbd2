//! Caller-facing error taxonomy.
//!
//! Every failure a request can end in is one of four variants; the HTTP
//! mapping lives in `http::response`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::documents::fetcher::FetchError;
use crate::documents::range::RangeError;
use crate::documents::subscriptions::SubscribeError;

/// Message used for every server-side failure body.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller sent something we will never be able to serve.
    #[error("{message}")]
    BadRequest { message: String },

    /// The resource is absent.
    #[error("{message}")]
    NotFound {
        message: String,
        details: Option<String>,
    },

    /// The storage backend could not produce or accept an object.
    #[error("{details}")]
    NotAvailable { details: String },

    /// A stored object is not the JSON we expect.
    #[error("{details}")]
    Malformed { details: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::NotFound { .. } => "not_found",
            ApiError::NotAvailable { .. } => "not_available",
            ApiError::Malformed { .. } => "malformed",
        }
    }

    /// The JSON body sent to the caller.
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::BadRequest { message } => ErrorBody {
                message: message.clone(),
                details: None,
            },
            ApiError::NotFound { message, details } => ErrorBody {
                message: message.clone(),
                details: details.clone(),
            },
            ApiError::NotAvailable { details } | ApiError::Malformed { details } => ErrorBody {
                message: INTERNAL_ERROR_MESSAGE.to_string(),
                details: Some(details.clone()),
            },
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotAvailable { .. } => ApiError::NotAvailable {
                details: err.to_string(),
            },
            FetchError::Malformed { .. } => ApiError::Malformed {
                details: err.to_string(),
            },
        }
    }
}

impl From<RangeError> for ApiError {
    fn from(err: RangeError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<SubscribeError> for ApiError {
    fn from(err: SubscribeError) -> Self {
        match err {
            SubscribeError::MissingField(_) => ApiError::bad_request(err.to_string()),
            SubscribeError::Fetch(fetch) => fetch.into(),
            SubscribeError::NotAList { .. } => ApiError::Malformed {
                details: err.to_string(),
            },
            SubscribeError::Write { .. } => ApiError::NotAvailable {
                details: err.to_string(),
            },
        }
    }
}

/// `{message, details?}` failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
