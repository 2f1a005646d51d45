//! Shepherding parameter sweep CLI
//!
//! Runs the herding study against a simulation reachable through a stdio
//! bridge, one bridge process per worker.
//!
//! # Example
//!
//! ```bash
//! shepherd_sweep --link ./netlogo-bridge --link-arg models/Shepherds.nlogo \
//!     --workers 18 --seed 42 --model pierson --output sweep-output
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use sweep_core::SweepSpace;
use sweep_experiments::{
    export_to_csv, export_to_parquet, find_best_point, parameter_spaces, run_sweep, save_archive,
    success_rate, StdioLink, StdioLinkConfig, SweepArchive, SweepConfig,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Shepherding parameter sweep
///
/// Designs the sweep, runs it on a pool of simulation workers and writes
/// `results.json`, `results.csv` and `results.parquet` to the output directory.
#[derive(Parser, Debug)]
#[command(name = "shepherd_sweep")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with sweep settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with a sweep definition to run instead of the built-in study
    #[arg(long)]
    space: Option<PathBuf>,

    /// Number of workers (one simulation process each)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Tick ceiling for each run
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Seed for resampling. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Shepherd behaviour model
    #[arg(long, value_enum, default_value_t = ShepherdModel::Pierson)]
    model: ShepherdModel,

    /// Bridge program speaking the line protocol on stdin/stdout
    #[arg(long, env = "SHEPHERD_LINK")]
    link: PathBuf,

    /// Argument passed to the bridge program (repeatable)
    #[arg(long = "link-arg", allow_hyphen_values = true)]
    link_args: Vec<String>,

    /// Milliseconds a bridge gets to exit after `quit` before it is killed
    #[arg(long)]
    shutdown_grace_ms: Option<u64>,

    /// Directory for result files
    #[arg(short = 'o', long, default_value = "sweep-output")]
    output: PathBuf,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShepherdModel {
    Strombom,
    Pierson,
}

impl ShepherdModel {
    /// Model-source literal for the `shepherd-model` global.
    fn literal(self) -> &'static str {
        match self {
            ShepherdModel::Strombom => "\"strombom\"",
            ShepherdModel::Pierson => "\"pierson\"",
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(err) = run(args) {
        error!(error = %err, "Sweep failed");
        exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SweepConfig::from_json(&fs::read_to_string(path)?)?,
        None => parameter_spaces::shepherding_config(),
    };
    if config.startup_commands.is_empty() {
        config.startup_commands = parameter_spaces::shepherding_config().startup_commands;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(max_ticks) = args.max_ticks {
        config.max_ticks = max_ticks;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_progress {
        config.show_progress = false;
    }
    config
        .static_parameters
        .insert("shepherd-model".to_string(), args.model.literal().to_string());

    let mut space: SweepSpace = match &args.space {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => parameter_spaces::shepherding_space()?,
    };

    let mut link = StdioLinkConfig::new(args.link.clone());
    link.args = args.link_args.clone();
    if let Some(grace) = args.shutdown_grace_ms {
        link = link.with_shutdown_grace(Duration::from_millis(grace));
    }

    info!(
        workers = config.workers,
        max_ticks = config.max_ticks,
        seed = ?config.seed,
        model = ?args.model,
        link = %link.program.display(),
        startup_commands = ?config.startup_commands,
        "Starting sweep"
    );

    let table = run_sweep(&|_worker: usize| StdioLink::spawn(&link), &mut space, &config)?;

    fs::create_dir_all(&args.output)?;
    let archive = SweepArchive::new(&space, table);
    save_archive(args.output.join("results.json"), &archive)?;
    export_to_csv(&archive.table, args.output.join("results.csv"))?;
    export_to_parquet(&archive.table, args.output.join("results.parquet"))?;
    info!(output = %args.output.display(), rows = archive.table.len(), "Wrote results");

    match success_rate(&archive.table, &["num-sheep", "num-neighbors"]) {
        Ok(surface) => {
            for point in &surface {
                info!(
                    key = ?point.key,
                    trials = point.trials,
                    success_rate = point.success_rate,
                    mean_final_tick = point.mean_final_tick,
                    "Success rate"
                );
            }
            if let Some(best) = find_best_point(&surface) {
                info!(
                    key = ?best.key,
                    success_rate = best.success_rate,
                    "Best sheep/neighbors combination"
                );
            }
        }
        Err(err) => warn!(error = %err, "Skipping sheep/neighbors surface"),
    }

    Ok(())
}
