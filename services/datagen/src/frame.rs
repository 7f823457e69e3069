//! Frame assembly: raw records plus enrichment columns in one uniform table.

use crate::records::{IdentitySource, Record};
use serde_json::{json, Value};

/// Column holding the synthetic per-invocation user id
pub const USER_ID_COLUMN: &str = "user_id";
/// Column holding the generation timestamp
pub const TIMESTAMP_COLUMN: &str = "dt_current_timestamp";
/// Optional column holding per-row national ids
pub const NATIONAL_ID_COLUMN: &str = "cpf";

/// Millisecond precision, shared by frames and key-value events
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A named column of JSON values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Column-oriented table with a fixed row count
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Frame {
    /// Materialize records into columns.
    ///
    /// Columns follow the first-seen order of field names; fields missing
    /// from a record become nulls.
    pub fn from_records(records: &[Record]) -> Self {
        let num_rows = records.len();
        let mut columns: Vec<Column> = Vec::new();

        for record in records {
            for name in record.keys() {
                if !columns.iter().any(|c| &c.name == name) {
                    columns.push(Column {
                        name: name.clone(),
                        values: Vec::with_capacity(num_rows),
                    });
                }
            }
        }

        for column in &mut columns {
            column.values = records
                .iter()
                .map(|r| r.get(&column.name).cloned().unwrap_or(Value::Null))
                .collect();
        }

        Self { columns, num_rows }
    }

    /// Build the enriched frame for a dataset.
    ///
    /// One user id and one timestamp are drawn and broadcast to every row; a
    /// national id, when requested, is drawn per row.
    pub fn assemble(
        records: &[Record],
        identity: &mut dyn IdentitySource,
        include_national_id: bool,
    ) -> Self {
        let mut frame = Self::from_records(records);

        let user_id = json!(identity.user_id());
        let timestamp = json!(identity.now().format(TIMESTAMP_FORMAT).to_string());
        frame.broadcast(USER_ID_COLUMN, user_id);
        frame.broadcast(TIMESTAMP_COLUMN, timestamp);

        if include_national_id {
            let national_ids = (0..frame.num_rows)
                .map(|_| Value::String(identity.national_id()))
                .collect();
            frame.set_column(NATIONAL_ID_COLUMN, national_ids);
        }

        frame
    }

    /// Set one value on every row
    pub fn broadcast(&mut self, name: &str, value: Value) {
        self.set_column(name, vec![value; self.num_rows]);
    }

    /// Replace the column in place if it exists, append it otherwise
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.num_rows);

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Rows as ordered JSON objects
    pub fn rows(&self) -> Vec<Record> {
        (0..self.num_rows)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values[row].clone()))
                    .collect()
            })
            .collect()
    }
}
