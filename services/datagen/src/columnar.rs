//! Arrow/Parquet conversion of frames.
//!
//! Column types are inferred from the JSON values of each column:
//! - all booleans -> `Boolean`
//! - all integers -> `Int64`
//! - non-negative integers with at least one above `i64::MAX` -> `UInt64`
//! - numbers with at least one float -> `Float64`
//! - all strings -> `Utf8`
//! - nested or mixed values -> `Utf8` holding the JSON text, as do integer
//!   columns fitting neither `Int64` nor `UInt64` and `UInt64` mixed with floats
//!
//! Nulls never take part in inference and every field is nullable.

use crate::error::EncodeError;
use crate::frame::Frame;
use crate::records::Record;
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema, UInt64Type};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;

/// Infer the Arrow type of a column of JSON values
pub fn infer_type(values: &[Value]) -> DataType {
    let mut inferred: Option<DataType> = None;

    for value in values {
        let current = match value {
            Value::Null => continue,
            Value::Bool(_) => DataType::Boolean,
            Value::Number(n) if n.is_i64() => DataType::Int64,
            Value::Number(n) if n.is_u64() => DataType::UInt64,
            Value::Number(_) => DataType::Float64,
            Value::String(_) => DataType::Utf8,
            Value::Array(_) | Value::Object(_) => return DataType::Utf8,
        };

        inferred = Some(match inferred {
            None => current,
            Some(previous) if previous == current => previous,
            Some(DataType::Int64) | Some(DataType::Float64)
                if matches!(current, DataType::Int64 | DataType::Float64) =>
            {
                DataType::Float64
            }
            Some(DataType::Int64) | Some(DataType::UInt64)
                if matches!(current, DataType::Int64 | DataType::UInt64) =>
            {
                DataType::UInt64
            }
            Some(_) => return DataType::Utf8,
        });
    }

    match inferred {
        // a negative integer has no UInt64 representation
        Some(DataType::UInt64) if values.iter().any(|v| v.as_u64().is_none() && !v.is_null()) => {
            DataType::Utf8
        }
        Some(data_type) => data_type,
        None => DataType::Utf8,
    }
}

fn build_array(data_type: &DataType, values: &[Value]) -> ArrayRef {
    match data_type {
        DataType::Boolean => Arc::new(BooleanArray::from(
            values.iter().map(Value::as_bool).collect::<Vec<_>>(),
        )),
        DataType::Int64 => Arc::new(Int64Array::from(
            values.iter().map(Value::as_i64).collect::<Vec<_>>(),
        )),
        DataType::UInt64 => Arc::new(UInt64Array::from(
            values.iter().map(Value::as_u64).collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            values.iter().map(Value::as_f64).collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>(),
        )),
    }
}

/// Convert a frame into a single record batch, preserving column order
pub fn to_record_batch(frame: &Frame) -> Result<RecordBatch, ArrowError> {
    let mut fields = Vec::with_capacity(frame.num_columns());
    let mut arrays = Vec::with_capacity(frame.num_columns());

    for column in frame.columns() {
        let data_type = infer_type(&column.values);
        arrays.push(build_array(&data_type, &column.values));
        fields.push(Field::new(column.name.as_str(), data_type, true));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(frame.num_rows()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
}

fn writer_properties() -> WriterProperties {
    let created_by = KeyValue {
        key: "created_by".to_string(),
        value: Some("datagen".to_string()),
    };
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(Some(vec![created_by]))
        .build()
}

/// Write a batch as a complete Parquet file
pub fn write_parquet<W: Write + Send>(batch: &RecordBatch, sink: W) -> Result<(), EncodeError> {
    let mut writer = ArrowWriter::try_new(sink, batch.schema(), Some(writer_properties()))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Encode a batch into an in-memory Parquet file
pub fn to_parquet_bytes(batch: &RecordBatch) -> Result<Bytes, EncodeError> {
    let mut buffer = Vec::new();
    write_parquet(batch, &mut buffer)?;
    Ok(Bytes::from(buffer))
}

/// Read every batch back from Parquet bytes
pub fn read_parquet(bytes: Bytes) -> Result<Vec<RecordBatch>, EncodeError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;
    let batches = reader.collect::<Result<Vec<_>, ArrowError>>()?;
    Ok(batches)
}

/// Rows of a batch as JSON objects, in schema order
pub fn to_json_rows(batch: &RecordBatch) -> Vec<Record> {
    let schema = batch.schema();
    let columns: Vec<Vec<Value>> = batch.columns().iter().map(|a| json_values(a.as_ref())).collect();

    (0..batch.num_rows())
        .map(|row| {
            schema
                .fields()
                .iter()
                .zip(&columns)
                .map(|(field, values)| (field.name().clone(), values[row].clone()))
                .collect()
        })
        .collect()
}

fn json_values(array: &dyn Array) -> Vec<Value> {
    let value_at = |i: usize, f: &dyn Fn(usize) -> Value| {
        if array.is_null(i) {
            Value::Null
        } else {
            f(i)
        }
    };

    (0..array.len())
        .map(|i| match array.data_type() {
            DataType::Boolean => value_at(i, &|i| json!(array.as_boolean().value(i))),
            DataType::Int64 => value_at(i, &|i| json!(array.as_primitive::<Int64Type>().value(i))),
            DataType::UInt64 => {
                value_at(i, &|i| json!(array.as_primitive::<UInt64Type>().value(i)))
            }
            DataType::Float64 => {
                value_at(i, &|i| json!(array.as_primitive::<Float64Type>().value(i)))
            }
            DataType::Utf8 => value_at(i, &|i| json!(array.as_string::<i32>().value(i))),
            _ => Value::Null,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::records_from_value;

    fn sample_frame() -> Frame {
        Frame::from_records(&records_from_value(json!([
            {"id": 1, "price": 9.5, "active": true, "name": "a", "address": {"city": "SP"}},
            {"id": 2, "price": 3, "active": false, "name": null, "address": {"city": "RJ"}},
            {"id": 3, "price": 1.25, "name": "c"}
        ])))
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(&[json!(1), Value::Null, json!(2)]), DataType::Int64);
        assert_eq!(infer_type(&[json!(1), json!(2.5)]), DataType::Float64);
        assert_eq!(infer_type(&[json!(true), json!(false)]), DataType::Boolean);
        assert_eq!(infer_type(&[json!("a"), json!(1)]), DataType::Utf8);
        assert_eq!(infer_type(&[json!({"a": 1})]), DataType::Utf8);
        assert_eq!(infer_type(&[Value::Null]), DataType::Utf8);
        assert_eq!(infer_type(&[]), DataType::Utf8);
    }

    #[test]
    fn test_integers_above_i64_keep_precision() {
        let big = json!(u64::MAX);

        assert_eq!(infer_type(&[big.clone()]), DataType::UInt64);
        assert_eq!(infer_type(&[json!(1), big.clone(), Value::Null]), DataType::UInt64);
        assert_eq!(infer_type(&[json!(-1), big.clone()]), DataType::Utf8);
        assert_eq!(infer_type(&[json!(0.5), big.clone()]), DataType::Utf8);

        let frame = Frame::from_records(&records_from_value(json!([
            {"id": big.clone()},
            {"id": 7},
            {"id": null}
        ])));
        let batch = to_record_batch(&frame).unwrap();
        let batches = read_parquet(to_parquet_bytes(&batch).unwrap()).unwrap();
        let rows = to_json_rows(&batches[0]);

        assert_eq!(batches[0].schema().field(0).data_type(), &DataType::UInt64);
        assert_eq!(rows[0]["id"], big);
        assert_eq!(rows[1]["id"], json!(7));
        assert_eq!(rows[2]["id"], Value::Null);
    }

    #[test]
    fn test_record_batch_shape() {
        let batch = to_record_batch(&sample_frame()).unwrap();
        let schema = batch.schema();

        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 5);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Boolean);
        assert_eq!(schema.field(3).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(4).data_type(), &DataType::Utf8);
        assert_eq!(batch.column(3).null_count(), 1);
    }

    #[test]
    fn test_parquet_round_trip() {
        let frame = sample_frame();
        let batch = to_record_batch(&frame).unwrap();

        let batches = read_parquet(to_parquet_bytes(&batch).unwrap()).unwrap();
        assert_eq!(batches.iter().map(RecordBatch::num_rows).sum::<usize>(), 3);

        let read_back = &batches[0];
        let schema = read_back.schema();
        let names: Vec<&str> = schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, frame.column_names());

        let rows = to_json_rows(read_back);
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[1]["price"], json!(3.0));
        assert_eq!(rows[0]["active"], json!(true));
        assert_eq!(rows[2]["active"], Value::Null);
        assert_eq!(rows[1]["name"], Value::Null);
        // nested values widen to their JSON text
        assert_eq!(rows[0]["address"], json!(r#"{"city":"SP"}"#));
    }

    #[test]
    fn test_empty_frame_batch() {
        let frame = Frame::from_records(&[]);
        let batch = to_record_batch(&frame).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 0);
    }
}
