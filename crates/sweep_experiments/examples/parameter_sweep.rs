//! Example: sweep the minimal shepherding space against an in-process toy model.
//!
//! The toy model stands in for a real simulation bridge so the whole pipeline
//! (design, parallel execution, surface, export) can be tried without one.

use sweep_experiments::{
    export_to_csv, find_best_point, parameter_spaces, run_sweep, success_rate, LinkError,
    ReportValue, SimulationLink, SweepConfig,
};

/// Herding gets slower with more sheep and faster with more shepherds.
#[derive(Default)]
struct ToyModel {
    sheep: f64,
    shepherds: f64,
    seed: u64,
    ticks: u64,
}

impl ToyModel {
    fn ticks_to_win(&self) -> u64 {
        let base = self.sheep * 40.0 / self.shepherds.max(1.0);
        base as u64 + self.seed % 200
    }
}

impl SimulationLink for ToyModel {
    fn command(&mut self, text: &str) -> Result<(), LinkError> {
        let mut words = text.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("set"), Some("num-sheep"), Some(v)) => self.sheep = parse(v)?,
            (Some("set"), Some("num-shepherds"), Some(v)) => self.shepherds = parse(v)?,
            (Some("random-seed"), Some(v), None) => self.seed = parse(v)? as u64,
            (Some("setup"), None, None) => self.ticks = 0,
            (Some("go"), None, None) => self.ticks += 1,
            _ => {}
        }
        Ok(())
    }

    fn report(&mut self, expression: &str) -> Result<ReportValue, LinkError> {
        if let Some(max) = expression.strip_prefix("win? or ticks >= ") {
            let max = parse(max)? as u64;
            return Ok(ReportValue::Bool(self.ticks >= self.ticks_to_win().min(max)));
        }
        match expression {
            "ticks" => Ok(ReportValue::Number(self.ticks as f64)),
            _ => Ok(ReportValue::Number(self.sheep.sqrt())),
        }
    }
}

fn parse(text: &str) -> Result<f64, LinkError> {
    text.parse()
        .map_err(|_| LinkError::Protocol(format!("not a number: {text}")))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting parameter sweep experiment...");

    let mut space = parameter_spaces::minimal_space()?;
    let config = SweepConfig::default()
        .with_workers(4)
        .with_max_ticks(2000)
        .with_seed(42);

    let factory = |_worker: usize| Ok::<_, LinkError>(ToyModel::default());
    let table = run_sweep(&factory, &mut space, &config)?;
    println!("Completed {} simulations", table.len());

    let surface = success_rate(&table, &["num-sheep", "num-shepherds"])?;
    for point in &surface {
        println!(
            "{:?}: {:.0}% won, mean final tick {:.1} ({} trials)",
            point.key,
            point.success_rate * 100.0,
            point.mean_final_tick,
            point.trials
        );
    }
    if let Some(best) = find_best_point(&surface) {
        println!("\nBest configuration: {:?}", best.key);
    }

    export_to_csv(&table, "parameter_sweep_results.csv")?;
    println!("Results written to parameter_sweep_results.csv");
    Ok(())
}
