use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::ExportError;
use crate::metrics::ResultRecord;
use crate::results::ResultsTable;

pub(crate) fn export_to_parquet_impl(
    table: &ResultsTable,
    file: std::fs::File,
) -> Result<(), ExportError> {
    let batch = build_record_batch(table)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn build_record_batch(table: &ResultsTable) -> Result<RecordBatch, arrow::error::ArrowError> {
    let schema = Arc::new(parquet_schema(table));
    let mut arrays = key_arrays(table);
    arrays.extend(record_arrays(table));

    RecordBatch::try_new(schema, arrays)
}

fn parquet_schema(table: &ResultsTable) -> Schema {
    let record_types = [
        DataType::UInt64,
        DataType::Boolean,
        DataType::Float64,
        DataType::Float64,
        DataType::Float64,
        DataType::Float64,
    ];

    let keys = table
        .key_columns()
        .iter()
        .map(|name| Field::new(name, DataType::Float64, false));
    let records = ResultRecord::COLUMNS
        .iter()
        .zip(record_types)
        .map(|(name, data_type)| Field::new(*name, data_type, false));

    Schema::new(keys.chain(records).collect::<Vec<_>>())
}

fn key_arrays(table: &ResultsTable) -> Vec<ArrayRef> {
    (0..table.key_columns().len())
        .map(|column| {
            Arc::new(Float64Array::from(
                table
                    .rows()
                    .iter()
                    .map(|row| row.key.get(column).map_or(f64::NAN, |v| v.as_f64()))
                    .collect::<Vec<_>>(),
            )) as ArrayRef
        })
        .collect()
}

fn record_arrays(table: &ResultsTable) -> Vec<ArrayRef> {
    let records: Vec<&ResultRecord> = table.records().collect();
    let floats = |field: fn(&ResultRecord) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(
            records.iter().map(|r| field(r)).collect::<Vec<_>>(),
        ))
    };

    vec![
        Arc::new(UInt64Array::from(
            records.iter().map(|r| r.final_tick).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            records.iter().map(|r| r.won).collect::<Vec<_>>(),
        )),
        floats(|r| r.final_average_spread),
        floats(|r| r.final_max_spread),
        floats(|r| r.final_gcm_distance_from_goal),
        floats(|r| r.final_average_distance_from_goal),
    ]
}
