//! Deterministic experiment design for simulation parameter sweeps.
//!
//! This crate owns everything about a sweep that can be decided before a single
//! simulation runs: parameter specifications, value sampling, inter-parameter
//! constraints, and the expansion of all of that into an ordered list of
//! experiment configurations. Running those configurations against a model
//! lives in `sweep_experiments`.
//!
//! # Quick Start
//!
//! ```
//! use sweep_core::{Bounds, Constraint, Operator, SampleKind, SampledParameter, SweepSpace};
//!
//! let sheep =
//!     SampledParameter::new("num-sheep", SampleKind::LinearInt, Bounds::new(1.0, 101.0), 11)?;
//! let neighbors =
//!     SampledParameter::new("num-neighbors", SampleKind::LinearInt, Bounds::new(1.0, 100.0), 11)?;
//! let mut space = SweepSpace::new()
//!     .parameter(sheep)
//!     .parameter(neighbors)
//!     .constraint(Constraint::new("num-sheep", Operator::Ge, "num-neighbors"));
//!
//! let design = space.design(true, Some(42))?;
//! assert!(design.len() <= design.unfiltered_count());
//! # Ok::<(), sweep_core::SweepError>(())
//! ```

pub mod design;
pub mod error;
pub mod naming;
pub mod parameters;
pub mod value;

pub use design::{design, ExperimentDesign, SweepSpace};
pub use error::SweepError;
pub use naming::{to_config_key, to_model_name};
pub use parameters::{
    Bounds, Configuration, Constraint, Operator, Parameter, SampleKind, SampledParameter,
    SweepParameter,
};
pub use value::Value;
