use crate::columnar;
use crate::error::EncodeError;
use crate::frame::Frame;
use crate::records::StoreType;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use std::fmt;

/// Output format of a landed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Row-oriented JSON array
    Json,
    /// Apache Parquet
    Parquet,
}

impl Format {
    /// Key segment for this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Parquet => "parquet",
        }
    }

    /// File extension appended to object keys
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => ".json",
            Format::Parquet => ".parquet",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Parquet => "application/octet-stream",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire representation of one dataset
#[derive(Debug, Clone)]
pub enum Payload {
    /// UTF-8 JSON bytes
    Json(Bytes),
    /// Columnar table, written to Parquet at upload time
    Columnar(RecordBatch),
}

impl Payload {
    pub fn format(&self) -> Format {
        match self {
            Payload::Json(_) => Format::Json,
            Payload::Columnar(_) => Format::Parquet,
        }
    }
}

/// A payload tagged with the store type its key is built for
#[derive(Debug, Clone)]
pub struct Encoded {
    pub payload: Payload,
    pub store_type: StoreType,
}

/// Encode a frame in the requested format.
///
/// Key-value frames have no JSON route here and yield `None`; their events
/// are serialized directly by the orchestrator.
pub fn encode(
    frame: &Frame,
    format: Format,
    store_type: StoreType,
) -> Result<Option<Encoded>, EncodeError> {
    let payload = match format {
        Format::Json if store_type.is_key_value() => return Ok(None),
        Format::Json => Payload::Json(Bytes::from(serde_json::to_vec(&frame.rows())?)),
        Format::Parquet => Payload::Columnar(columnar::to_record_batch(frame)?),
    };

    Ok(Some(Encoded {
        payload,
        store_type,
    }))
}
