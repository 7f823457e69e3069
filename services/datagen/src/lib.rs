//! Datagen
//!
//! Synthetic datastore record generator. For each simulated backing store it
//! fabricates or fetches fake operational records, assembles them into a
//! uniform frame, encodes the frame as JSON or Parquet and lands the result in
//! a MinIO/S3 landing area under a deterministic key.
//!
//! ## Store types
//!
//! - **mssql**: users, credit_card
//! - **postgres**: payments, subscription, vehicle
//! - **mongodb**: rides, users, stripe
//! - **redis**: google_auth, linkedin_auth, apple_auth (stamped JSON events)
//!
//! ## Architecture
//!
//! ```text
//! Local faker / fake-data API
//! ┌──────────────┐
//! │ Record       │
//! │ Sources      │
//! └──────────────┘
//!        │
//!        ▼
//! ┌──────────────┐           ┌──────────────┐          ┌──────────────┐
//! │ Frame        │──────────▶│ Encoder      │─────────▶│ Uploader     │
//! │ Assembler    │           │ json/parquet │          │              │
//! └──────────────┘           └──────────────┘          └──────────────┘
//!                                                             │
//!                                                             ▼
//!                                                      ┌──────────────┐
//!                                                      │ {root}/      │
//!                                                      │  {store}/    │
//!                                                      │  {dataset}/  │
//!                                                      │  {format}/   │
//!                                                      │  {token}     │
//!                                                      └──────────────┘
//! ```

pub mod columnar;
pub mod config;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod landing;
pub mod object_key;
pub mod orchestrator;
pub mod records;
pub mod s3_uploader;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, StorageOverrides};
pub use encoder::{encode, Encoded, Format, Payload};
pub use error::{DatagenError, EncodeError, FetchError, StorageError};
pub use frame::Frame;
pub use landing::{UploadResult, Uploader};
pub use orchestrator::{datasets, DatasetPlan, DatasetUpload, Orchestrator, Source, WriteReport};
pub use records::{
    Endpoint, Entity, Identity, IdentitySource, LocalRecords, RandomDataApi, Record, RecordSource,
    RemoteSource, StoreType,
};
pub use s3_uploader::{ObjectBody, ObjectStore, PutAck, S3ObjectStore};
