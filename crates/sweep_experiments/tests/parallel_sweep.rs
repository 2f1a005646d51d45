use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sweep_core::{Bounds, Parameter, SampleKind, SampledParameter, SweepSpace, Value};
use sweep_experiments::{
    parameter_spaces, run_parallel_experiments, run_sweep, HarnessError, LinkError, ReportValue,
    SimulationLink, SweepConfig,
};

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    /// Commands received by each worker before its first run.
    startup: Mutex<Vec<(usize, String)>>,
}

impl Counters {
    fn startup_commands(&self, worker: usize) -> Vec<String> {
        let log = self.startup.lock().unwrap();
        log.iter()
            .filter(|(w, _)| *w == worker)
            .map(|(_, command)| command.clone())
            .collect()
    }
}

/// Wins after as many ticks as it has sheep; fails `setup` for one flock size.
struct FakeModel {
    worker: usize,
    counters: Arc<Counters>,
    fail_on: Option<i64>,
    configured: bool,
    sheep: i64,
    ticks: u64,
}

impl SimulationLink for FakeModel {
    fn command(&mut self, text: &str) -> Result<(), LinkError> {
        assert_eq!(rayon::current_thread_index(), Some(self.worker));

        if text.starts_with("set ") || text.starts_with("random-seed ") {
            self.configured = true;
        } else if !self.configured {
            let mut log = self.counters.startup.lock().unwrap();
            log.push((self.worker, text.to_string()));
        }

        if let Some(value) = text.strip_prefix("set num-sheep ") {
            self.sheep = value.parse().map_err(|_| LinkError::Protocol(text.to_string()))?;
        } else if text == "setup" {
            if self.fail_on == Some(self.sheep) {
                return Err(LinkError::Backend("flock too large".to_string()));
            }
            self.ticks = 0;
        } else if text == "go" {
            self.ticks += 1;
            // Uneven latency so runs finish out of submission order.
            thread::sleep(Duration::from_micros(((self.sheep * 37) % 400) as u64));
        }
        Ok(())
    }

    fn report(&mut self, expression: &str) -> Result<ReportValue, LinkError> {
        if let Some(max) = expression.strip_prefix("win? or ticks >= ") {
            let max: u64 = max.parse().map_err(|_| LinkError::Protocol(max.to_string()))?;
            let won = self.ticks as i64 >= self.sheep;
            return Ok(ReportValue::Bool(won || self.ticks >= max));
        }
        match expression {
            "ticks" => Ok(ReportValue::Number(self.ticks as f64)),
            _ => Ok(ReportValue::Number(self.sheep as f64 / 2.0)),
        }
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn factory(
    counters: &Arc<Counters>,
    fail_on: Option<i64>,
) -> impl Fn(usize) -> Result<FakeModel, LinkError> + Sync + '_ {
    move |worker| {
        counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeModel {
            worker,
            counters: Arc::clone(counters),
            fail_on,
            configured: false,
            sheep: 0,
            ticks: 0,
        })
    }
}

fn flock_space(sizes: std::ops::RangeInclusive<i64>) -> SweepSpace {
    SweepSpace::new()
        .parameter(Parameter::new("num-sheep", sizes))
        .parameter(Parameter::new("num-shepherds", [1, 2]))
}

fn quiet(workers: usize) -> SweepConfig {
    SweepConfig::default()
        .with_workers(workers)
        .with_max_ticks(30)
        .with_progress(false)
}

#[test]
fn test_results_follow_configuration_order() {
    let counters = Arc::new(Counters::default());
    let design = flock_space(1..=40).design(false, None).unwrap();

    let table = run_parallel_experiments(&factory(&counters, None), &design, &quiet(4)).unwrap();

    assert_eq!(table.len(), 80);
    for (row, configuration) in table.rows().iter().zip(design.configurations()) {
        assert_eq!(row.key, configuration.values());
        let sheep = match row.key[0] {
            Value::Int(v) => v as u64,
            Value::Float(v) => v as u64,
        };
        assert_eq!(row.record.final_tick, sheep.min(30));
        assert_eq!(row.record.won, sheep < 30);
    }
}

#[test]
fn test_each_worker_opens_once() {
    let counters = Arc::new(Counters::default());
    let config = quiet(3).with_startup_command("reset-default-parameters");
    let design = flock_space(1..=25).design(false, None).unwrap();

    run_parallel_experiments(&factory(&counters, None), &design, &config).unwrap();

    assert_eq!(counters.opened.load(Ordering::SeqCst), 3);
    assert_eq!(counters.startup.lock().unwrap().len(), 3);
    assert_eq!(counters.closed.load(Ordering::SeqCst), 3);
}

#[test]
fn test_shepherding_workers_set_up_and_reset_once() {
    let counters = Arc::new(Counters::default());
    let config = parameter_spaces::shepherding_config()
        .with_workers(3)
        .with_max_ticks(30)
        .with_progress(false);
    let design = flock_space(1..=25).design(false, None).unwrap();

    run_parallel_experiments(&factory(&counters, None), &design, &config).unwrap();

    for worker in 0..3 {
        assert_eq!(
            counters.startup_commands(worker),
            ["setup", "reset-default-parameters"],
            "worker {worker}"
        );
    }
    assert_eq!(counters.startup.lock().unwrap().len(), 6);
}

#[test]
fn test_failed_run_aborts_and_closes_everything() {
    let counters = Arc::new(Counters::default());
    let design = flock_space(1..=20).design(false, None).unwrap();

    let error = run_parallel_experiments(&factory(&counters, Some(13)), &design, &quiet(4))
        .unwrap_err();

    match error {
        HarnessError::Run { index, source } => {
            assert!(index == 24 || index == 25, "unexpected index {index}");
            assert!(matches!(source, LinkError::Backend(_)));
        }
        other => panic!("expected run failure, got {other:?}"),
    }
    assert_eq!(counters.opened.load(Ordering::SeqCst), 4);
    assert_eq!(counters.closed.load(Ordering::SeqCst), 4);
}

#[test]
fn test_startup_failure_closes_opened_workers() {
    let counters = Arc::new(Counters::default());
    let inner = factory(&counters, None);
    let failing = |worker: usize| {
        if worker == 1 {
            Err(LinkError::Disconnected)
        } else {
            inner(worker)
        }
    };
    let design = flock_space(1..=4).design(false, None).unwrap();

    let error = run_parallel_experiments(&failing, &design, &quiet(3)).unwrap_err();

    assert!(matches!(
        error,
        HarnessError::WorkerStartup { worker: 1, source: LinkError::Disconnected }
    ));
    assert_eq!(counters.opened.load(Ordering::SeqCst), 2);
    assert_eq!(counters.closed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_run_sweep_is_reproducible() {
    let space = || {
        SweepSpace::new()
            .parameter(Parameter::new("num-sheep", [5, 10]))
            .parameter(
                SampledParameter::new(
                    "random-seed",
                    SampleKind::RandomInt,
                    Bounds::new(1.0, 100_000.0),
                    3,
                )
                .unwrap(),
            )
    };
    let config = quiet(2).with_seed(42);

    let counters = Arc::new(Counters::default());
    let first = run_sweep(&factory(&counters, None), &mut space(), &config).unwrap();
    let second = run_sweep(&factory(&counters, None), &mut space(), &config).unwrap();

    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
    assert_eq!(first.key_columns(), &["num_sheep".to_string(), "random_seed".to_string()]);
}

#[test]
fn test_empty_design_runs_nothing() {
    let counters = Arc::new(Counters::default());
    let design = SweepSpace::new()
        .parameter(Parameter::new("num-sheep", Vec::<i64>::new()))
        .design(false, None)
        .unwrap();

    let table = run_parallel_experiments(&factory(&counters, None), &design, &quiet(2)).unwrap();

    assert!(table.is_empty());
    assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
}
