use thiserror::Error;

/// Failures raised while describing or designing a sweep.
///
/// All of these are fatal for the sweep being built; nothing in this crate
/// retries or recovers locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    /// A sampling strategy tag did not name one of the four samplers.
    #[error("unknown sampler kind '{0}'")]
    InvalidSamplerKind(String),
    /// A comparison operator tag did not name one of the six operators.
    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),
    /// A constraint or lookup referenced a parameter that is not in the sweep.
    #[error("unknown parameter key '{0}'")]
    UnknownParameterKey(String),
    /// Sampling bounds cannot produce values for the requested sampler.
    #[error("invalid bounds [{min}, {max}] for parameter '{name}': {reason}")]
    InvalidBounds {
        name: String,
        min: f64,
        max: f64,
        reason: &'static str,
    },
    /// Two parameters map onto the same configuration key.
    #[error("parameter '{0}' is defined more than once")]
    DuplicateParameter(String),
    /// A stored sample list disagrees with its declared count.
    #[error("parameter '{name}' declares {count} samples but carries {actual}")]
    SampleCountMismatch {
        name: String,
        count: usize,
        actual: usize,
    },
}
