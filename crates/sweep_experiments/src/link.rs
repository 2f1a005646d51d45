//! Connection to one running simulation instance.
//!
//! A link issues commands and evaluates report expressions against a model.
//! Each worker owns exactly one link for the lifetime of a sweep, so links are
//! `Send` but never shared.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LinkError;

mod stdio;

pub use stdio::{StdioLink, StdioLinkConfig};

/// Value returned by a report expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<ReportValue>),
}

impl ReportValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReportValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ReportValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Whole, non-negative numbers only. Tick counters arrive as floats.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ReportValue::Number(v) if v.is_finite() && *v >= 0.0 && v.fract() == 0.0 => {
                Some(*v as u64)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Bool(v) => write!(f, "{v}"),
            ReportValue::Number(v) => write!(f, "{v}"),
            ReportValue::Text(v) => write!(f, "{v:?}"),
            ReportValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A live simulation instance.
pub trait SimulationLink: Send {
    /// Execute a model command such as `setup` or `set num-sheep 10`.
    fn command(&mut self, text: &str) -> Result<(), LinkError>;

    /// Evaluate a report expression.
    fn report(&mut self, expression: &str) -> Result<ReportValue, LinkError>;

    /// Release the instance. Called once per worker at teardown.
    fn close(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn report_f64(&mut self, expression: &str) -> Result<f64, LinkError> {
        let value = self.report(expression)?;
        value.as_f64().ok_or_else(|| unexpected(expression, &value))
    }

    fn report_bool(&mut self, expression: &str) -> Result<bool, LinkError> {
        let value = self.report(expression)?;
        value.as_bool().ok_or_else(|| unexpected(expression, &value))
    }

    fn report_u64(&mut self, expression: &str) -> Result<u64, LinkError> {
        let value = self.report(expression)?;
        value.as_u64().ok_or_else(|| unexpected(expression, &value))
    }
}

fn unexpected(expression: &str, value: &ReportValue) -> LinkError {
    LinkError::UnexpectedReport {
        expression: expression.to_string(),
        value: value.to_string(),
    }
}

/// Opens the simulation instance for one worker.
pub trait SimulationFactory: Sync {
    type Link: SimulationLink;

    fn open(&self, worker: usize) -> Result<Self::Link, LinkError>;
}

impl<F, L> SimulationFactory for F
where
    F: Fn(usize) -> Result<L, LinkError> + Sync,
    L: SimulationLink,
{
    type Link = L;

    fn open(&self, worker: usize) -> Result<L, LinkError> {
        self(worker)
    }
}
