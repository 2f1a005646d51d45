//! Result export and sweep archives.
//!
//! A sweep can be exported as CSV or Parquet for analysis, and archived as
//! JSON together with the parameter specifications and constraints that
//! produced it, so the archive alone is enough to reload and re-plot a run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sweep_core::{Constraint, SweepParameter, SweepSpace};

use crate::error::ExportError;
use crate::results::ResultsTable;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/parquet.rs"]
mod parquet;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// A finished sweep: its definition and its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepArchive {
    pub parameters: Vec<SweepParameter>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub table: ResultsTable,
}

impl SweepArchive {
    pub fn new(space: &SweepSpace, table: ResultsTable) -> Self {
        Self {
            parameters: space.parameters().to_vec(),
            constraints: space.constraints().to_vec(),
            table,
        }
    }
}

/// Write `archive` as pretty-printed JSON.
pub fn save_archive(path: impl AsRef<Path>, archive: &SweepArchive) -> Result<(), ExportError> {
    let file = writer_utils::create_output_file(path)?;
    json::save_archive_impl(archive, file)
}

pub fn load_archive(path: impl AsRef<Path>) -> Result<SweepArchive, ExportError> {
    let file = std::fs::File::open(path)?;
    json::load_archive_impl(file)
}

/// Export results to CSV: one column per key, then one per record field.
///
/// # Errors
///
/// Fails on an empty table, or when the file cannot be written.
pub fn export_to_csv(table: &ResultsTable, path: impl AsRef<Path>) -> Result<(), ExportError> {
    writer_utils::ensure_not_empty(table)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(table, file)
}

/// Export results to Parquet. Key columns are stored as `Float64`.
///
/// # Errors
///
/// Fails on an empty table, or when the file cannot be written.
pub fn export_to_parquet(table: &ResultsTable, path: impl AsRef<Path>) -> Result<(), ExportError> {
    writer_utils::ensure_not_empty(table)?;
    let file = writer_utils::create_output_file(path)?;
    parquet::export_to_parquet_impl(table, file)
}
