//! S3 object store.
//!
//! # Responsibilities
//! - Read and write whole objects in one bucket, under an optional prefix
//! - Classify SDK failures into NotFound vs Backend
//!
//! # Design Decisions
//! - Endpoint override enables MinIO/LocalStack (path-style addressing)
//! - SDK retries are left at defaults; this layer adds none

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::{ObjectStore, StorageError, StorageResult};
use crate::config::schema::StorageConfig;

#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl S3Store {
    /// Build a client from the ambient AWS environment plus config overrides.
    pub async fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        if config.bucket.is_empty() {
            return Err(StorageError::backend("", "S3 bucket is not configured"));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::from_client(
            Client::from_conf(builder.build()),
            config.bucket.clone(),
            config.prefix.clone(),
        ))
    }

    /// Wrap a pre-built client.
    pub fn from_client(client: Client, bucket: String, prefix: Option<String>) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.filter(|p| !p.trim_matches('/').is_empty()),
        }
    }

    fn object_key(&self, key: &str) -> StorageResult<String> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), key),
            None => key.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let object_key = self.object_key(key)?;
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| classify(e, key))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend(key, format!("failed to read body: {}", e)))?
            .into_bytes();
        Ok(bytes.to_vec())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let object_key = self.object_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type("application/json")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| classify(e, key))?;
        Ok(())
    }
}

fn classify<E: std::fmt::Debug>(err: SdkError<E>, key: &str) -> StorageError {
    match &err {
        SdkError::ServiceError(service_err) => match service_err.raw().status().as_u16() {
            404 => StorageError::NotFound(key.to_string()),
            403 => StorageError::backend(key, format!("access denied: {:?}", err)),
            status => StorageError::backend(key, format!("HTTP {}: {:?}", status, err)),
        },
        SdkError::TimeoutError(_) => StorageError::backend(key, format!("timeout: {:?}", err)),
        SdkError::DispatchFailure(_) => {
            StorageError::backend(key, format!("connection error: {:?}", err))
        }
        _ => StorageError::backend(key, format!("{:?}", err)),
    }
}
