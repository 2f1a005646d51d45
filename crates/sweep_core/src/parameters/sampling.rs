use std::str::FromStr;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::SweepError;
use crate::value::Value;

/// Strategy used to turn bounds and a count into concrete values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    /// Uniform integers in `[min, max)`.
    RandomInt,
    /// Uniform floats in `[min, max)`.
    RandomFloat,
    /// Evenly spaced over `[min, max]`, truncated toward zero.
    LinearInt,
    /// Evenly spaced floats over `[min, max]`.
    LinearFloat,
}

impl SampleKind {
    pub fn is_random(self) -> bool {
        matches!(self, SampleKind::RandomInt | SampleKind::RandomFloat)
    }
}

impl FromStr for SampleKind {
    type Err = SweepError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized: String = tag
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "randint" | "randomint" => Ok(SampleKind::RandomInt),
            "randfloat" | "randomfloat" => Ok(SampleKind::RandomFloat),
            "linearint" => Ok(SampleKind::LinearInt),
            "linearfloat" => Ok(SampleKind::LinearFloat),
            _ => Err(SweepError::InvalidSamplerKind(tag.to_string())),
        }
    }
}

/// Closed range a sampler draws from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Integers `k` with `min <= k < max`, as a half-open range.
    fn integer_range(self) -> std::ops::Range<i64> {
        (self.min.ceil() as i64)..(self.max.ceil() as i64)
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<(i64, i64)> for Bounds {
    fn from((min, max): (i64, i64)) -> Self {
        Self {
            min: min as f64,
            max: max as f64,
        }
    }
}

pub(crate) fn sample(
    name: &str,
    kind: SampleKind,
    bounds: Bounds,
    count: usize,
    seed: Option<u64>,
) -> Result<Vec<Value>, SweepError> {
    validate_bounds(name, kind, bounds)?;

    let values = match kind {
        SampleKind::RandomInt => {
            let mut rng = seeded_rng(seed);
            let range = bounds.integer_range();
            (0..count)
                .map(|_| Value::Int(rng.gen_range(range.clone())))
                .collect()
        }
        SampleKind::RandomFloat => {
            let mut rng = seeded_rng(seed);
            (0..count)
                .map(|_| Value::Float(rng.gen_range(bounds.min..bounds.max)))
                .collect()
        }
        SampleKind::LinearInt => linspace(bounds, count)
            .map(|v| Value::Int(v.trunc() as i64))
            .collect(),
        SampleKind::LinearFloat => linspace(bounds, count).map(Value::Float).collect(),
    };

    Ok(values)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// `count` evenly spaced points from `min` to `max`; the last point is `max` exactly.
fn linspace(bounds: Bounds, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (bounds.max - bounds.min) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| {
        if count > 1 && i == count - 1 {
            bounds.max
        } else {
            bounds.min + step * i as f64
        }
    })
}

fn validate_bounds(name: &str, kind: SampleKind, bounds: Bounds) -> Result<(), SweepError> {
    let invalid = |reason| SweepError::InvalidBounds {
        name: name.to_string(),
        min: bounds.min,
        max: bounds.max,
        reason,
    };

    if !bounds.min.is_finite() || !bounds.max.is_finite() {
        return Err(invalid("bounds must be finite"));
    }

    match kind {
        SampleKind::LinearInt | SampleKind::LinearFloat if bounds.min > bounds.max => {
            Err(invalid("minimum exceeds maximum"))
        }
        SampleKind::RandomFloat if bounds.min >= bounds.max => {
            Err(invalid("random range is empty"))
        }
        SampleKind::RandomInt if bounds.integer_range().is_empty() => {
            Err(invalid("no integer lies in the half-open range"))
        }
        _ => Ok(()),
    }
}

/// Check stored values against the sampler that claims to have produced them.
///
/// Integer kinds must hold integers; float kinds accept either and are
/// returned as floats.
pub(crate) fn validate_values(
    name: &str,
    kind: SampleKind,
    bounds: Bounds,
    values: Vec<Value>,
) -> Result<Vec<Value>, SweepError> {
    validate_bounds(name, kind, bounds)?;

    let invalid = |reason| SweepError::InvalidBounds {
        name: name.to_string(),
        min: bounds.min,
        max: bounds.max,
        reason,
    };

    values
        .into_iter()
        .map(|value| {
            let in_range = match kind {
                SampleKind::RandomInt => match value {
                    Value::Int(v) => bounds.integer_range().contains(&v),
                    Value::Float(_) => return Err(invalid("stored value is not an integer")),
                },
                SampleKind::LinearInt => match value {
                    Value::Int(v) => {
                        let lo = bounds.min.min(bounds.min.trunc());
                        let hi = bounds.max.max(bounds.max.trunc());
                        (lo..=hi).contains(&(v as f64))
                    }
                    Value::Float(_) => return Err(invalid("stored value is not an integer")),
                },
                SampleKind::RandomFloat => (bounds.min..bounds.max).contains(&value.as_f64()),
                SampleKind::LinearFloat => (bounds.min..=bounds.max).contains(&value.as_f64()),
            };
            if !in_range {
                return Err(invalid("stored value lies outside the bounds"));
            }
            Ok(match kind {
                SampleKind::RandomFloat | SampleKind::LinearFloat => Value::Float(value.as_f64()),
                SampleKind::RandomInt | SampleKind::LinearInt => value,
            })
        })
        .collect()
}
