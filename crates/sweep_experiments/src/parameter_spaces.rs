//! Pre-defined sweeps over the shepherding model.

use sweep_core::{
    Bounds, Constraint, Operator, SampleKind, SampledParameter, SweepError, SweepSpace,
};

use crate::config::SweepConfig;

/// Commands every shepherding worker runs once after opening its model.
pub const SHEPHERDING_STARTUP_COMMANDS: [&str; 2] = ["setup", "reset-default-parameters"];

fn linear_int(
    name: &str,
    min: f64,
    max: f64,
    count: usize,
) -> Result<SampledParameter, SweepError> {
    SampledParameter::new(name, SampleKind::LinearInt, Bounds::new(min, max), count)
}

fn model_seeds(count: usize) -> Result<SampledParameter, SweepError> {
    SampledParameter::new(
        "random-seed",
        SampleKind::RandomInt,
        Bounds::new(1.0, 100_000.0),
        count,
    )
}

/// The full herding study: flock size, neighbourhood size and shepherd count,
/// each combination repeated over twelve model seeds. Neighbourhoods larger
/// than the flock are skipped.
pub fn shepherding_space() -> Result<SweepSpace, SweepError> {
    Ok(SweepSpace::new()
        .parameter(linear_int("num-sheep", 1.0, 101.0, 11)?)
        .parameter(linear_int("num-neighbors", 1.0, 100.0, 11)?)
        .parameter(linear_int("num-shepherds", 2.0, 16.0, 15)?)
        .parameter(model_seeds(12)?)
        .constraint(Constraint::new("num-sheep", Operator::Ge, "num-neighbors")))
}

/// A few dozen runs; useful for checking a model link end to end.
pub fn minimal_space() -> Result<SweepSpace, SweepError> {
    Ok(SweepSpace::new()
        .parameter(linear_int("num-sheep", 10.0, 50.0, 3)?)
        .parameter(linear_int("num-neighbors", 5.0, 15.0, 3)?)
        .parameter(linear_int("num-shepherds", 2.0, 4.0, 2)?)
        .parameter(model_seeds(2)?)
        .constraint(Constraint::new("num-sheep", Operator::Ge, "num-neighbors")))
}

/// Default settings for the herding study, with the shepherding startup
/// commands installed.
pub fn shepherding_config() -> SweepConfig {
    SweepConfig {
        startup_commands: SHEPHERDING_STARTUP_COMMANDS.map(String::from).to_vec(),
        ..SweepConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_core::Value;

    #[test]
    fn test_shepherding_space_size() {
        let mut space = shepherding_space().unwrap();
        let design = space.design(true, Some(42)).unwrap();

        assert_eq!(design.unfiltered_count(), 11 * 11 * 15 * 12);
        assert!(design.len() < design.unfiltered_count());
        assert!(design.configurations().iter().all(|c| {
            c.get("num_sheep").unwrap() >= c.get("num_neighbors").unwrap()
        }));
        assert_eq!(design.sub_seeds().len(), 4);
    }

    #[test]
    fn test_shepherding_axes() {
        let space = shepherding_space().unwrap();
        let sheep = space.parameters()[0].values();
        assert_eq!(sheep.first(), Some(&Value::Int(1)));
        assert_eq!(sheep.last(), Some(&Value::Int(101)));
        assert_eq!(space.parameters()[2].values().len(), 15);
    }

    #[test]
    fn test_minimal_space_is_small() {
        let mut space = minimal_space().unwrap();
        let design = space.design(true, Some(1)).unwrap();
        assert!(design.len() <= 36);
        assert!(!design.is_empty());
    }

    #[test]
    fn test_shepherding_config_runs_setup_then_reset() {
        let config = shepherding_config();
        assert_eq!(config.startup_commands, ["setup", "reset-default-parameters"]);
        assert_eq!(config.workers, SweepConfig::default().workers);
    }
}
