//! Parallel sweep execution on a pool of simulation workers.
//!
//! Each worker is a thread of a dedicated rayon pool that opens one simulation
//! instance when the pool starts and keeps it until the pool is dropped.
//! Configurations are dispatched through an indexed parallel iterator, so the
//! collected records come back in configuration order whatever order the runs
//! finish in. The first failing run aborts the sweep.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use sweep_core::{to_model_name, Configuration, ExperimentDesign, SweepSpace};
use tracing::{debug, info, warn};

use crate::config::SweepConfig;
use crate::error::{HarnessError, LinkError};
use crate::link::{SimulationFactory, SimulationLink};
use crate::metrics::{extract_record, stop_condition, ResultRecord};
use crate::results::ResultsTable;

/// Configuration key that seeds the model's own random generator.
pub const RANDOM_SEED_KEY: &str = "random_seed";

/// Push a configuration and the static parameters into the model, then `setup`.
pub fn apply_configuration<L: SimulationLink + ?Sized>(
    link: &mut L,
    configuration: &Configuration,
    static_parameters: &BTreeMap<String, String>,
) -> Result<(), LinkError> {
    for (key, value) in configuration.iter() {
        if key == RANDOM_SEED_KEY {
            link.command(&format!("random-seed {value}"))?;
        } else {
            link.command(&format!("set {} {value}", to_model_name(key)))?;
        }
    }
    for (name, literal) in static_parameters {
        link.command(&format!("set {} {literal}", to_model_name(name)))?;
    }
    link.command("setup")
}

/// Run one configuration to completion on `link`.
///
/// `go` is issued at least once; the run stops when the model reports a win
/// or the tick ceiling is reached.
pub fn run_trial<L: SimulationLink + ?Sized>(
    link: &mut L,
    configuration: &Configuration,
    config: &SweepConfig,
) -> Result<ResultRecord, LinkError> {
    apply_configuration(link, configuration, &config.static_parameters)?;

    let stop = stop_condition(config.max_ticks);
    loop {
        link.command("go")?;
        if link.report_bool(&stop)? {
            break;
        }
    }

    extract_record(link, config.max_ticks)
}

/// Fixed set of workers, each holding one open simulation instance.
///
/// Dropping the pool closes every instance, so teardown happens on success
/// and on abort alike.
pub struct WorkerPool<L: SimulationLink> {
    pool: rayon::ThreadPool,
    slots: Vec<Mutex<L>>,
}

impl<L: SimulationLink> WorkerPool<L> {
    /// Build the pool and open one instance on every worker thread.
    pub fn start<F>(factory: &F, config: &SweepConfig) -> Result<Self, HarnessError>
    where
        F: SimulationFactory<Link = L>,
    {
        let workers = config.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("sweep-worker-{index}"))
            .build()?;

        let startup_commands = &config.startup_commands;
        let opened = pool.broadcast(|ctx| open_worker(factory, ctx.index(), startup_commands));

        let mut slots = Vec::with_capacity(workers);
        let mut failure = None;
        for (worker, result) in opened.into_iter().enumerate() {
            match result {
                Ok(link) => slots.push(Mutex::new(link)),
                Err(source) => {
                    warn!(worker, error = %source, "Worker failed to start");
                    if failure.is_none() {
                        failure = Some(HarnessError::WorkerStartup { worker, source });
                    }
                }
            }
        }

        let started = Self { pool, slots };
        match failure {
            Some(error) => Err(error),
            None => Ok(started),
        }
    }

    pub fn workers(&self) -> usize {
        self.slots.len()
    }

    /// Run every configuration and return the records in input order.
    pub fn run(
        &self,
        configurations: &[Configuration],
        config: &SweepConfig,
    ) -> Result<Vec<ResultRecord>, HarnessError> {
        let total = configurations.len();
        info!(experiments = total, workers = self.workers(), "Running experiments");

        let progress = progress_bar(total, config.show_progress);
        let finished = AtomicUsize::new(0);
        let started_at = Instant::now();

        let records = self.pool.install(|| {
            configurations
                .par_iter()
                .enumerate()
                .map(|(index, configuration)| {
                    let record = self.run_on_current_worker(index, configuration, config)?;
                    let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(
                        "Finished experiment {done}/{total} ({:.2}%) in {:.2?}",
                        done as f64 * 100.0 / total as f64,
                        started_at.elapsed()
                    );
                    if let Some(ref progress_bar) = progress {
                        progress_bar.inc(1);
                    }
                    Ok(record)
                })
                .collect::<Result<Vec<_>, HarnessError>>()
        });

        if let Some(ref progress_bar) = progress {
            match &records {
                Ok(_) => progress_bar.finish_with_message("Completed"),
                Err(_) => progress_bar.abandon_with_message("Aborted"),
            }
        }

        let records = records?;
        info!(
            experiments = records.len(),
            elapsed = ?started_at.elapsed(),
            "Ran experiments successfully"
        );
        Ok(records)
    }

    fn run_on_current_worker(
        &self,
        index: usize,
        configuration: &Configuration,
        config: &SweepConfig,
    ) -> Result<ResultRecord, HarnessError> {
        let worker = rayon::current_thread_index().ok_or(HarnessError::WorkerUnavailable)?;
        let slot = self.slots.get(worker).ok_or(HarnessError::WorkerUnavailable)?;
        let mut link = slot
            .lock()
            .map_err(|_| HarnessError::WorkerPoisoned { worker })?;

        run_trial(&mut *link, configuration, config).map_err(|source| {
            warn!(index, worker, error = %source, "Experiment failed");
            HarnessError::Run { index, source }
        })
    }
}

impl<L: SimulationLink> Drop for WorkerPool<L> {
    fn drop(&mut self) {
        for (worker, slot) in self.slots.iter_mut().enumerate() {
            let link = match slot.get_mut() {
                Ok(link) => link,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Err(error) = link.close() {
                warn!(worker, %error, "Failed to close simulation");
            }
        }
        debug!(workers = self.slots.len(), "Closed simulation instances");
    }
}

fn open_worker<F: SimulationFactory>(
    factory: &F,
    worker: usize,
    startup_commands: &[String],
) -> Result<F::Link, LinkError> {
    let mut link = factory.open(worker)?;
    for command in startup_commands {
        if let Err(error) = link.command(command) {
            if let Err(close_error) = link.close() {
                debug!(
                    worker,
                    error = %close_error,
                    "Failed to close simulation after startup error"
                );
            }
            return Err(error);
        }
    }
    info!(worker, "Started worker");
    Ok(link)
}

fn progress_bar(total: usize, show_progress: bool) -> Option<ProgressBar> {
    if !show_progress || total == 0 {
        return None;
    }

    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    Some(bar)
}

/// Run every configuration of `design` and join the records into a table.
pub fn run_parallel_experiments<F: SimulationFactory>(
    factory: &F,
    design: &ExperimentDesign,
    config: &SweepConfig,
) -> Result<ResultsTable, HarnessError> {
    if design.is_empty() {
        warn!("No configurations left after filtering; nothing to run");
        return ResultsTable::join(design, Vec::new());
    }

    let pool = WorkerPool::start(factory, config)?;
    let records = pool.run(design.configurations(), config)?;
    drop(pool);

    ResultsTable::join(design, records)
}

/// Design `space` (reseeding from `config.seed`) and run it.
pub fn run_sweep<F: SimulationFactory>(
    factory: &F,
    space: &mut SweepSpace,
    config: &SweepConfig,
) -> Result<ResultsTable, HarnessError> {
    let design = space.design(true, config.seed)?;
    run_parallel_experiments(factory, &design, config)
}
