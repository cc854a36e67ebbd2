//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected and returned together.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, StorageBackend};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let storage = &config.storage;
    if storage.timeout_secs == 0 {
        errors.push(ValidationError::new("storage.timeout_secs", "must be greater than zero"));
    }
    if storage.subscriptions_key.trim().is_empty() {
        errors.push(ValidationError::new("storage.subscriptions_key", "must not be empty"));
    }
    match storage.backend {
        StorageBackend::Local => {
            if storage.root.as_os_str().is_empty() {
                errors.push(ValidationError::new("storage.root", "must not be empty"));
            }
        }
        StorageBackend::S3 => {
            if storage.bucket.trim().is_empty() {
                errors.push(ValidationError::new("storage.bucket", "required for the s3 backend"));
            }
        }
    }
    if let Some(endpoint) = &storage.endpoint {
        if let Err(e) = url::Url::parse(endpoint) {
            errors.push(ValidationError::new(
                "storage.endpoint",
                format!("'{}' is not a valid URL: {}", endpoint, e),
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }
    if config.aggregate.concurrency == 0 {
        errors.push(ValidationError::new("aggregate.concurrency", "must be greater than zero"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.storage.backend = StorageBackend::S3;
        config.storage.endpoint = Some("::nope".into());
        config.aggregate.concurrency = 0;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "storage.bucket",
                "storage.endpoint",
                "timeouts.request_secs",
                "aggregate.concurrency",
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_err());

        config.observability.metrics_enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
