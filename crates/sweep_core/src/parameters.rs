//! Parameter specifications for sweep dimensions.
//!
//! A sweep dimension is either a fixed list of values ([`Parameter`]) or a
//! list drawn from a bounded range by one of the samplers
//! ([`SampledParameter`]). Both compare equal by name only, so a dimension can
//! be replaced in a collection without matching its values.

use serde::{Deserialize, Serialize};

use crate::error::SweepError;
use crate::naming::to_config_key;
use crate::value::Value;

mod combinations;
mod constraints;
mod sampling;

pub use combinations::Configuration;
pub use constraints::{Constraint, Operator};
pub use sampling::{Bounds, SampleKind};

pub(crate) use combinations::{cartesian_product, product_size};
pub(crate) use constraints::satisfies_all;

/// A sweep dimension with an explicit list of values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    values: Vec<Value>,
}

impl Parameter {
    pub fn new<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Parameter {}

/// A sweep dimension whose values come from a sampler.
///
/// Values are drawn when the parameter is constructed. [`SampledParameter::resample`]
/// replaces them in place with a new seed; [`SampledParameter::sample`] draws a
/// fresh sequence without touching the stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SampledParameterRepr")]
pub struct SampledParameter {
    name: String,
    sample_type: SampleKind,
    bounds: Bounds,
    count: usize,
    seed: Option<u64>,
    values: Vec<Value>,
}

impl SampledParameter {
    /// Create an unseeded sampled parameter.
    pub fn new(
        name: impl Into<String>,
        sample_type: SampleKind,
        bounds: impl Into<Bounds>,
        count: usize,
    ) -> Result<Self, SweepError> {
        Self::with_seed(name, sample_type, bounds, count, None)
    }

    /// Create a sampled parameter whose initial draw uses `seed`.
    pub fn with_seed(
        name: impl Into<String>,
        sample_type: SampleKind,
        bounds: impl Into<Bounds>,
        count: usize,
        seed: Option<u64>,
    ) -> Result<Self, SweepError> {
        let name = name.into();
        let bounds = bounds.into();
        let values = sampling::sample(&name, sample_type, bounds, count, seed)?;
        Ok(Self {
            name,
            sample_type,
            bounds,
            count,
            seed,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_type(&self) -> SampleKind {
        self.sample_type
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Draw a fresh sequence with the stored seed, leaving stored values alone.
    pub fn sample(&self) -> Result<Vec<Value>, SweepError> {
        self.draw(self.seed)
    }

    /// Replace the seed and the stored values.
    pub fn resample(&mut self, seed: Option<u64>) -> Result<(), SweepError> {
        let values = self.draw(seed)?;
        self.commit(seed, values);
        Ok(())
    }

    /// Draw with `seed` without touching stored state.
    pub(crate) fn draw(&self, seed: Option<u64>) -> Result<Vec<Value>, SweepError> {
        sampling::sample(&self.name, self.sample_type, self.bounds, self.count, seed)
    }

    pub(crate) fn commit(&mut self, seed: Option<u64>, values: Vec<Value>) {
        self.values = values;
        self.seed = seed;
    }
}

impl PartialEq for SampledParameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SampledParameter {}

/// Serialized form of [`SampledParameter`]; stored values are optional so a
/// hand-written sweep definition only needs the sampler settings.
#[derive(Deserialize)]
struct SampledParameterRepr {
    name: String,
    sample_type: SampleKind,
    bounds: Bounds,
    count: usize,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    values: Option<Vec<Value>>,
}

impl TryFrom<SampledParameterRepr> for SampledParameter {
    type Error = SweepError;

    fn try_from(repr: SampledParameterRepr) -> Result<Self, Self::Error> {
        match repr.values {
            Some(values) if values.len() != repr.count => Err(SweepError::SampleCountMismatch {
                name: repr.name,
                count: repr.count,
                actual: values.len(),
            }),
            Some(values) => {
                let values =
                    sampling::validate_values(&repr.name, repr.sample_type, repr.bounds, values)?;
                Ok(Self {
                    name: repr.name,
                    sample_type: repr.sample_type,
                    bounds: repr.bounds,
                    count: repr.count,
                    seed: repr.seed,
                    values,
                })
            }
            None => Self::with_seed(
                repr.name,
                repr.sample_type,
                repr.bounds,
                repr.count,
                repr.seed,
            ),
        }
    }
}

/// One dimension of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepParameter {
    Fixed(Parameter),
    Sampled(SampledParameter),
}

impl SweepParameter {
    pub fn name(&self) -> &str {
        match self {
            SweepParameter::Fixed(p) => p.name(),
            SweepParameter::Sampled(p) => p.name(),
        }
    }

    /// Key under which this dimension appears in every configuration.
    pub fn config_key(&self) -> String {
        to_config_key(self.name())
    }

    pub fn values(&self) -> &[Value] {
        match self {
            SweepParameter::Fixed(p) => p.values(),
            SweepParameter::Sampled(p) => p.values(),
        }
    }

    pub fn as_sampled_mut(&mut self) -> Option<&mut SampledParameter> {
        match self {
            SweepParameter::Sampled(p) => Some(p),
            SweepParameter::Fixed(_) => None,
        }
    }
}

impl PartialEq for SweepParameter {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for SweepParameter {}

impl From<Parameter> for SweepParameter {
    fn from(parameter: Parameter) -> Self {
        SweepParameter::Fixed(parameter)
    }
}

impl From<SampledParameter> for SweepParameter {
    fn from(parameter: SampledParameter) -> Self {
        SweepParameter::Sampled(parameter)
    }
}
