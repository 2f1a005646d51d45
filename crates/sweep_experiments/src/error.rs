//! Error types for running and exporting sweeps.

use sweep_core::SweepError;
use thiserror::Error;

/// Failure talking to a simulation instance.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("simulation I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("simulation rejected request: {0}")]
    Backend(String),
    #[error("simulation closed the connection")]
    Disconnected,
    #[error("report `{expression}` returned unexpected value {value}")]
    UnexpectedReport { expression: String, value: String },
}

/// Failure of a sweep run. Any error aborts the whole sweep.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Design(#[from] SweepError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("worker {worker} failed to start its simulation")]
    WorkerStartup {
        worker: usize,
        #[source]
        source: LinkError,
    },
    #[error("experiment {index} failed")]
    Run {
        index: usize,
        #[source]
        source: LinkError,
    },
    #[error("task ran outside the worker pool")]
    WorkerUnavailable,
    #[error("simulation slot of worker {worker} is poisoned")]
    WorkerPoisoned { worker: usize },
    #[error("{records} results for {configurations} configurations")]
    LengthMismatch {
        configurations: usize,
        records: usize,
    },
}

/// Failure writing or reading sweep results.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No results to export")]
    Empty,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}
