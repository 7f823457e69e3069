//! Record sources: locally faked entities, synthetic identities and the
//! remote fake-data API.

pub mod faker;
pub mod identity;
pub mod random_data;

pub use faker::LocalRecords;
pub use identity::{national_id_gate, Identity, IdentitySource};
pub use random_data::{Endpoint, RandomDataApi, RemoteSource};

use serde_json::{Map, Value};
use std::fmt;

/// One flat record, field name to scalar (or nested) JSON value.
///
/// Field order is insertion order.
pub type Record = Map<String, Value>;

/// Simulated backing store a batch of datasets is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreType {
    /// Relational store holding users and credit cards
    Mssql,
    /// Relational store holding payments, subscriptions and vehicles
    Postgres,
    /// Document store holding rides, users and stripe charges
    Mongodb,
    /// Key-value store holding federated-auth events
    Redis,
}

impl StoreType {
    /// Key segment for this store type
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Mssql => "mssql",
            StoreType::Postgres => "postgres",
            StoreType::Mongodb => "mongodb",
            StoreType::Redis => "redis",
        }
    }

    /// Whether this is the key-value store, whose datasets skip the frame route
    pub fn is_key_value(&self) -> bool {
        matches!(self, StoreType::Redis)
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities produced by the local generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Users,
    Rides,
    Payments,
    Vehicle,
}

/// Produces locally generated records for an entity
pub trait RecordSource: Send {
    fn records(&mut self, entity: Entity, rows: usize) -> Vec<Record>;
}

/// Flatten a parsed API response into records.
///
/// Arrays yield one record per element, objects a single record. Anything
/// that is not an object is wrapped under a `value` field.
pub fn records_from_value(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items.into_iter().map(into_record).collect(),
        other => vec![into_record(other)],
    }
}

fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => {
            let mut record = Record::new();
            record.insert("value".to_string(), other);
            record
        }
    }
}
