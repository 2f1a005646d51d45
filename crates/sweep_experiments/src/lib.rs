//! Parallel execution framework for agent-based simulation parameter sweeps.
//!
//! This crate takes an experiment design from `sweep_core`, runs every
//! configuration on a fixed pool of workers that each own one simulation
//! instance, and collects the outcomes into a results table that can be
//! summarised as a success-rate surface and exported.
//!
//! # Quick Start
//!
//! ```no_run
//! use sweep_experiments::{
//!     export_to_csv, parameter_spaces, run_sweep, success_rate, StdioLink, StdioLinkConfig,
//!     SweepConfig,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let link = StdioLinkConfig::new("netlogo-bridge").arg("models/Shepherds.nlogo");
//! let config = SweepConfig::default()
//!     .with_workers(8)
//!     .with_seed(42)
//!     .with_static_parameter("shepherd-model", "\"pierson\"");
//!
//! let mut space = parameter_spaces::shepherding_space()?;
//! let table = run_sweep(&|_worker: usize| StdioLink::spawn(&link), &mut space, &config)?;
//!
//! let surface = success_rate(&table, &["num-sheep", "num-neighbors"])?;
//! export_to_csv(&table, "results.csv")?;
//! # let _ = surface;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`link`]: the simulation protocol and the child-process link
//! - [`runner`]: worker pool, per-run command sequence, ordered fan-in
//! - [`metrics`]: the per-run result record
//! - [`results`]: the results table
//! - [`surface`]: success-rate aggregation over key columns
//! - [`export`]: CSV/Parquet export and JSON archives

pub mod config;
pub mod error;
pub mod export;
pub mod link;
pub mod metrics;
pub mod parameter_spaces;
pub mod results;
pub mod runner;
pub mod surface;

pub use config::SweepConfig;
pub use error::{ExportError, HarnessError, LinkError};
pub use export::{export_to_csv, export_to_parquet, load_archive, save_archive, SweepArchive};
pub use link::{ReportValue, SimulationFactory, SimulationLink, StdioLink, StdioLinkConfig};
pub use metrics::ResultRecord;
pub use results::{ResultRow, ResultsTable};
pub use runner::{run_parallel_experiments, run_sweep, WorkerPool};
pub use surface::{find_best_point, success_rate, SurfacePoint};
