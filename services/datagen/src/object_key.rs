//! Object keys for the landing area.
//!
//! Layout: `{root}/{store_type}/{dataset}/{format}/{token}`
//!
//! - JSON objects use a second-granularity timestamp token with the `.json`
//!   extension already attached. Two JSON uploads of the same dataset within
//!   one second therefore share a key.
//! - Parquet objects use a random UUID token; the `.parquet` extension is
//!   appended by the uploader.
//!
//! Dataset names are not sanitized and must already be key-safe.

use crate::encoder::Format;
use crate::records::StoreType;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Build an object key from its components
pub fn build_key(
    root: &str,
    store_type: StoreType,
    dataset: &str,
    format: Format,
    token: &str,
) -> String {
    format!(
        "{root}/{store_type}/{dataset}/{format}/{token}",
        root = root,
        store_type = store_type.as_str(),
        dataset = dataset,
        format = format.as_str(),
        token = token
    )
}

/// Token for JSON objects, e.g. `2024_01_15_10_30_45.json`
pub fn json_token(at: DateTime<Utc>) -> String {
    format!("{}{}", at.format("%Y_%m_%d_%H_%M_%S"), Format::Json.extension())
}

/// Token for columnar objects
pub fn columnar_token() -> String {
    Uuid::new_v4().to_string()
}
