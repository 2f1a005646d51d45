//! Experiment design: from parameter specifications to ordered configurations.
//!
//! The designer optionally re-draws every sampled dimension from sub-seeds
//! derived from a single top-level seed, forms the Cartesian product of all
//! dimensions, and drops combinations rejected by any constraint.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SweepError;
use crate::parameters::{
    cartesian_product, product_size, satisfies_all, Configuration, Constraint, SweepParameter,
};

/// Sub-seeds are drawn from `[0, SUB_SEED_LIMIT)`.
pub const SUB_SEED_LIMIT: u64 = u16::MAX as u64;

/// Ordered, filtered set of experiment configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDesign {
    columns: Vec<String>,
    configurations: Vec<Configuration>,
    unfiltered_count: usize,
    sub_seeds: Vec<(String, u64)>,
}

impl ExperimentDesign {
    /// Configuration keys, one per dimension, in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn into_configurations(self) -> Vec<Configuration> {
        self.configurations
    }

    /// Size of the cross product before constraints were applied.
    pub fn unfiltered_count(&self) -> usize {
        self.unfiltered_count
    }

    /// Seeds assigned to sampled dimensions while reseeding, by name.
    pub fn sub_seeds(&self) -> &[(String, u64)] {
        &self.sub_seeds
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

/// Design a sweep over `parameters`.
///
/// With `reseed` set, every sampled dimension is re-drawn in place, in input
/// order, from a sub-seed taken from one generator seeded with `seed` (or from
/// entropy when `seed` is `None`). Duplicate configurations are kept: they are
/// independent stochastic trials.
pub fn design(
    parameters: &mut [SweepParameter],
    constraints: &[Constraint],
    reseed: bool,
    seed: Option<u64>,
) -> Result<ExperimentDesign, SweepError> {
    let columns = validate(parameters, constraints)?;

    let sub_seeds = if reseed {
        reseed_parameters(parameters, seed)?
    } else {
        Vec::new()
    };

    let unfiltered_count = product_size(parameters);
    let mut configurations = Vec::with_capacity(unfiltered_count);
    for configuration in cartesian_product(parameters) {
        if satisfies_all(constraints, &configuration)? {
            configurations.push(configuration);
        }
    }

    info!(
        unfiltered = unfiltered_count,
        kept = configurations.len(),
        constraints = constraints.len(),
        "Designed parameter sweep"
    );

    Ok(ExperimentDesign {
        columns,
        configurations,
        unfiltered_count,
        sub_seeds,
    })
}

fn validate(
    parameters: &[SweepParameter],
    constraints: &[Constraint],
) -> Result<Vec<String>, SweepError> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let key = parameter.config_key();
        if !seen.insert(key.clone()) {
            return Err(SweepError::DuplicateParameter(parameter.name().to_string()));
        }
        columns.push(key);
    }

    for constraint in constraints {
        for key in constraint.keys() {
            if !seen.contains(key) {
                return Err(SweepError::UnknownParameterKey(key.to_string()));
            }
        }
    }

    Ok(columns)
}

fn reseed_parameters(
    parameters: &mut [SweepParameter],
    seed: Option<u64>,
) -> Result<Vec<(String, u64)>, SweepError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Draw everything first so a failure leaves every parameter untouched.
    let mut draws = Vec::new();
    for (index, parameter) in parameters.iter().enumerate() {
        if let SweepParameter::Sampled(sampled) = parameter {
            let sub_seed = rng.gen_range(0..SUB_SEED_LIMIT);
            draws.push((index, sub_seed, sampled.draw(Some(sub_seed))?));
        }
    }

    let mut sub_seeds = Vec::with_capacity(draws.len());
    for (index, sub_seed, values) in draws {
        if let Some(parameter) = parameters[index].as_sampled_mut() {
            parameter.commit(Some(sub_seed), values);
            debug!(parameter = parameter.name(), sub_seed, "Resampled parameter");
            sub_seeds.push((parameter.name().to_string(), sub_seed));
        }
    }

    Ok(sub_seeds)
}

/// Parameter specifications plus constraints; the definition of one sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepSpace {
    parameters: Vec<SweepParameter>,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

impl SweepSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension. A dimension with the same name replaces the earlier one
    /// in place.
    pub fn parameter(mut self, parameter: impl Into<SweepParameter>) -> Self {
        let parameter = parameter.into();
        match self.parameters.iter_mut().find(|p| **p == parameter) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn parameters(&self) -> &[SweepParameter] {
        &self.parameters
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Design the sweep; see [`design`].
    pub fn design(
        &mut self,
        reseed: bool,
        seed: Option<u64>,
    ) -> Result<ExperimentDesign, SweepError> {
        design(&mut self.parameters, &self.constraints, reseed, seed)
    }

    pub fn into_parts(self) -> (Vec<SweepParameter>, Vec<Constraint>) {
        (self.parameters, self.constraints)
    }
}
