use crate::columnar;
use crate::config::StorageConfig;
use crate::encoder::{Format, Payload};
use crate::error::{Result, StorageError};
use crate::object_key::{build_key, columnar_token, json_token};
use crate::records::StoreType;
use crate::s3_uploader::{ObjectBody, ObjectStore, PutAck};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Outcome of one dataset put
pub type UploadResult = std::result::Result<PutAck, StorageError>;

/// Lands encoded payloads in the object store.
///
/// JSON payloads go to the configured bucket; Parquet payloads go to the
/// columnar bucket, which defaults to a different, fixed name.
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    columnar_bucket: String,
    root: String,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            bucket: config.bucket.clone(),
            columnar_bucket: config.columnar_bucket.clone(),
            root: config.root_folder.clone(),
        }
    }

    /// Upload one dataset payload. `at` names JSON objects.
    ///
    /// Storage failures are logged and returned as the inner `Err`; only
    /// local staging failures abort with the outer error.
    #[instrument(skip_all, fields(dataset = %dataset, store_type = %store_type, format = %payload.format()))]
    pub async fn upload(
        &self,
        payload: Payload,
        dataset: &str,
        store_type: StoreType,
        at: DateTime<Utc>,
    ) -> Result<UploadResult> {
        let result = match payload {
            Payload::Json(bytes) => self.upload_json(bytes, dataset, store_type, at).await,
            Payload::Columnar(batch) => self.upload_columnar(&batch, dataset, store_type).await?,
        };

        match &result {
            Ok(ack) => info!(
                bucket = %ack.bucket,
                key = %ack.key,
                etag = ?ack.etag,
                "Dataset uploaded"
            ),
            Err(e) => error!(error = %e, "error occurred while uploading data"),
        }

        Ok(result)
    }

    async fn upload_json(
        &self,
        bytes: Bytes,
        dataset: &str,
        store_type: StoreType,
        at: DateTime<Utc>,
    ) -> UploadResult {
        let token = json_token(at);
        let key = build_key(&self.root, store_type, dataset, Format::Json, &token);

        info!("file location: {key}");

        let length = bytes.len() as u64;
        self.store
            .put_object(
                &self.bucket,
                &key,
                ObjectBody::Memory(bytes),
                length,
                Format::Json.content_type(),
            )
            .await
    }

    async fn upload_columnar(
        &self,
        batch: &RecordBatch,
        dataset: &str,
        store_type: StoreType,
    ) -> Result<UploadResult> {
        let key = build_key(
            &self.root,
            store_type,
            dataset,
            Format::Parquet,
            &columnar_token(),
        );

        info!("file location: {key}");

        // Removed from disk when dropped, after the put completes
        let mut staging = tempfile::Builder::new().suffix(".parquet").tempfile()?;
        columnar::write_parquet(batch, staging.as_file_mut())?;
        let length = staging.as_file().metadata()?.len();

        let object_key = format!("{key}{}", Format::Parquet.extension());
        let result = self
            .store
            .put_object(
                &self.columnar_bucket,
                &object_key,
                ObjectBody::File(staging.path().to_path_buf()),
                length,
                Format::Parquet.content_type(),
            )
            .await;

        Ok(result)
    }
}
