use crate::config::StorageConfig;
use crate::error::StorageError;
use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;
use bytes::Bytes;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Body of a put, either held in memory or streamed from a local file
#[derive(Debug, Clone)]
pub enum ObjectBody {
    Memory(Bytes),
    File(PathBuf),
}

/// Acknowledgment of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutAck {
    pub bucket: String,
    pub key: String,
    pub etag: Option<String>,
    pub version_id: Option<String>,
}

/// Minimal object store: a single blocking put per object
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        length: u64,
        content_type: &str,
    ) -> Result<PutAck, StorageError>;
}

/// MinIO/S3 backed object store
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Create a client for the configured endpoint and static credentials
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "datagen-static",
        );

        let endpoint_url = endpoint_url(&config.endpoint);
        let s3_config = S3ConfigBuilder::from(&aws_config)
            .credentials_provider(credentials)
            .endpoint_url(&endpoint_url)
            // MinIO only serves path-style requests
            .force_path_style(config.force_path_style)
            .build();

        info!(
            endpoint = %endpoint_url,
            bucket = %config.bucket,
            columnar_bucket = %config.columnar_bucket,
            "S3 object store initialized"
        );

        Ok(Self {
            client: S3Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip_all, fields(bucket = %bucket, key = %key))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        length: u64,
        content_type: &str,
    ) -> Result<PutAck, StorageError> {
        let stream = match body {
            ObjectBody::Memory(bytes) => ByteStream::from(bytes),
            ObjectBody::File(path) => {
                ByteStream::from_path(&path)
                    .await
                    .map_err(|e| StorageError::Body {
                        path: path.clone(),
                        message: e.to_string(),
                    })?
            }
        };

        debug!(size_bytes = length, content_type = %content_type, "Putting object");

        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(stream)
            .content_length(length as i64)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(PutAck {
            bucket: bucket.to_string(),
            key: key.to_string(),
            etag: output.e_tag().map(String::from),
            version_id: output.version_id().map(String::from),
        })
    }
}

/// Bare `host:port` endpoints are plain HTTP
fn endpoint_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}
