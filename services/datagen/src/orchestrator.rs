//! Per-store-type dataset dispatch.
//!
//! Every store type owns a fixed, ordered list of datasets. A batch first
//! materializes all of its datasets (fetch or generate, assemble, encode) and
//! then uploads them in order. Fetch and encode failures abort the batch;
//! storage failures are recorded per dataset and the remaining datasets are
//! still uploaded.

use crate::encoder::{encode, Format, Payload};
use crate::error::{DatagenError, EncodeError, Result};
use crate::frame::{Frame, TIMESTAMP_FORMAT};
use crate::landing::{UploadResult, Uploader};
use crate::records::{
    national_id_gate, records_from_value, Endpoint, Entity, IdentitySource, RecordSource,
    RemoteSource, StoreType,
};
use bytes::Bytes;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Where a dataset's records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Local(Entity),
    Remote(Endpoint),
}

/// One dataset of a store type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetPlan {
    pub name: &'static str,
    pub source: Source,
    /// Whether national ids are added when the batch gate is open
    pub national_id: bool,
}

const fn dataset(name: &'static str, source: Source, national_id: bool) -> DatasetPlan {
    DatasetPlan {
        name,
        source,
        national_id,
    }
}

/// Ordered datasets of a store type
pub fn datasets(store_type: StoreType) -> Vec<DatasetPlan> {
    use Source::{Local, Remote};

    match store_type {
        StoreType::Mssql => vec![
            dataset("users", Local(Entity::Users), true),
            dataset("credit_card", Remote(Endpoint::CreditCard), false),
        ],
        StoreType::Postgres => vec![
            dataset("payments", Local(Entity::Payments), false),
            dataset("subscription", Remote(Endpoint::Subscription), false),
            dataset("vehicle", Local(Entity::Vehicle), false),
        ],
        StoreType::Mongodb => vec![
            dataset("rides", Local(Entity::Rides), true),
            dataset("users", Remote(Endpoint::Users), true),
            dataset("stripe", Remote(Endpoint::Stripe), false),
        ],
        StoreType::Redis => vec![
            dataset("google_auth", Remote(Endpoint::GoogleAuth), false),
            dataset("linkedin_auth", Remote(Endpoint::LinkedinAuth), false),
            dataset("apple_auth", Remote(Endpoint::AppleAuth), false),
        ],
    }
}

/// Upload outcome of one dataset
#[derive(Debug)]
pub struct DatasetUpload {
    pub dataset: &'static str,
    pub result: UploadResult,
}

/// Outcomes of one store-type batch, in dataset order
#[derive(Debug)]
pub struct WriteReport {
    pub store_type: StoreType,
    pub format: Format,
    pub uploads: Vec<DatasetUpload>,
}

impl WriteReport {
    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    pub fn get(&self, dataset: &str) -> Option<&DatasetUpload> {
        self.uploads.iter().find(|u| u.dataset == dataset)
    }

    pub fn succeeded(&self) -> usize {
        self.uploads.iter().filter(|u| u.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:", self.store_type, self.format)?;
        for upload in &self.uploads {
            match &upload.result {
                Ok(ack) => write!(f, " {}=ok({}/{})", upload.dataset, ack.bucket, ack.key)?,
                Err(e) => write!(f, " {}=failed({})", upload.dataset, e)?,
            }
        }
        Ok(())
    }
}

/// Drives fetch, assembly, encoding and upload for each store type
pub struct Orchestrator {
    records: Box<dyn RecordSource>,
    identity: Box<dyn IdentitySource>,
    remote: Arc<dyn RemoteSource>,
    uploader: Uploader,
    rows: usize,
}

impl Orchestrator {
    pub fn new(
        records: Box<dyn RecordSource>,
        identity: Box<dyn IdentitySource>,
        remote: Arc<dyn RemoteSource>,
        uploader: Uploader,
        rows: usize,
    ) -> Self {
        Self {
            records,
            identity,
            remote,
            uploader,
            rows,
        }
    }

    /// Generate, encode and land every dataset of `store_type`
    #[instrument(skip_all, fields(store_type = %store_type, format = %format))]
    pub async fn write_file(&mut self, store_type: StoreType, format: Format) -> Result<WriteReport> {
        let plan = datasets(store_type);

        let (format, staged) = if store_type.is_key_value() {
            if format != Format::Json {
                warn!(requested = %format, "Key-value events are always landed as JSON");
            }
            (Format::Json, self.stage_events(&plan).await?)
        } else {
            (format, self.stage_frames(store_type, format, &plan).await?)
        };

        let mut uploads = Vec::with_capacity(staged.len());
        for (dataset, payload) in staged {
            let result = self
                .uploader
                .upload(payload, dataset, store_type, self.identity.now())
                .await?;
            uploads.push(DatasetUpload { dataset, result });
        }

        let report = WriteReport {
            store_type,
            format,
            uploads,
        };

        info!(
            datasets = report.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Store type batch written"
        );

        Ok(report)
    }

    async fn fetch(&mut self, source: Source) -> Result<Value> {
        match source {
            Source::Local(entity) => Ok(Value::Array(
                self.records
                    .records(entity, self.rows)
                    .into_iter()
                    .map(Value::Object)
                    .collect(),
            )),
            Source::Remote(endpoint) => Ok(self.remote.fetch(endpoint).await?),
        }
    }

    async fn stage_frames(
        &mut self,
        store_type: StoreType,
        format: Format,
        plan: &[DatasetPlan],
    ) -> Result<Vec<(&'static str, Payload)>> {
        let gate = national_id_gate(self.identity.as_mut());
        let mut staged = Vec::with_capacity(plan.len());

        for dataset in plan {
            let records = records_from_value(self.fetch(dataset.source).await?);
            let frame = Frame::assemble(
                &records,
                self.identity.as_mut(),
                dataset.national_id && gate,
            );

            let encoded = encode(&frame, format, store_type)?
                .ok_or(DatagenError::UnsupportedRoute { store_type, format })?;

            debug!(
                dataset = dataset.name,
                rows = frame.num_rows(),
                columns = frame.num_columns(),
                "Dataset staged"
            );
            staged.push((dataset.name, encoded.payload));
        }

        Ok(staged)
    }

    /// Key-value events are stamped and serialized as-is, without a frame
    async fn stage_events(&mut self, plan: &[DatasetPlan]) -> Result<Vec<(&'static str, Payload)>> {
        let user_id = self.identity.user_id();
        let timestamp = self.identity.now().format(TIMESTAMP_FORMAT).to_string();
        let mut staged = Vec::with_capacity(plan.len());

        for dataset in plan {
            let mut events = self.fetch(dataset.source).await?;
            stamp_events(&mut events, user_id, &timestamp);

            let bytes = serde_json::to_vec(&events).map_err(EncodeError::from)?;
            staged.push((dataset.name, Payload::Json(Bytes::from(bytes))));
        }

        Ok(staged)
    }
}

/// Add `user_id` and `timestamp` to an event object, or to every object of
/// an array of events
pub fn stamp_events(events: &mut Value, user_id: u32, timestamp: &str) {
    match events {
        Value::Object(event) => {
            event.insert("user_id".to_string(), json!(user_id));
            event.insert("timestamp".to_string(), json!(timestamp));
        }
        Value::Array(items) => {
            for item in items.iter_mut().filter(|i| i.is_object()) {
                stamp_events(item, user_id, timestamp);
            }
        }
        _ => {}
    }
}
