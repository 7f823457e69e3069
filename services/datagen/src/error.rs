use crate::encoder::Format;
use crate::records::StoreType;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching records from the fake-data API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while turning a frame into a wire payload
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow conversion failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet encoding failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Errors reported by the object store for a single put
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("put of {bucket}/{key} failed: {message}")]
    Put {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to stream upload body from {path}: {message}")]
    Body { path: PathBuf, message: String },
}

/// Pipeline errors that abort a whole store-type branch
#[derive(Error, Debug)]
pub enum DatagenError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("no {format} payload route for store type {store_type}")]
    UnsupportedRoute { store_type: StoreType, format: Format },
}

pub type Result<T, E = DatagenError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Put {
            bucket: "landing".to_string(),
            key: "com.owshq.data/mssql/users/json/x.json".to_string(),
            message: "access denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "put of landing/com.owshq.data/mssql/users/json/x.json failed: access denied"
        );
    }

    #[test]
    fn test_unsupported_route_display() {
        let err = DatagenError::UnsupportedRoute {
            store_type: StoreType::Redis,
            format: Format::Json,
        };
        assert_eq!(err.to_string(), "no json payload route for store type redis");
    }
}
