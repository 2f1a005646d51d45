use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::combinations::Configuration;
use super::SweepParameter;
use crate::error::SweepError;
use crate::naming::to_config_key;
use crate::value::Value;

/// Comparison applied between two configuration entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    pub fn apply(self, left: Value, right: Value) -> bool {
        match self {
            Operator::Eq => left == right,
            Operator::Ne => left != right,
            Operator::Gt => left > right,
            Operator::Ge => left >= right,
            Operator::Lt => left < right,
            Operator::Le => left <= right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }
}

impl FromStr for Operator {
    type Err = SweepError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim() {
            "==" | "eq" => Ok(Operator::Eq),
            "!=" | "ne" => Ok(Operator::Ne),
            ">" | "gt" => Ok(Operator::Gt),
            ">=" | "ge" => Ok(Operator::Ge),
            "<" | "lt" => Ok(Operator::Lt),
            "<=" | "le" => Ok(Operator::Le),
            _ => Err(SweepError::UnknownOperator(tag.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Predicate `left <op> right` over two entries of a configuration.
///
/// Keys are stored in configuration-key form, so either naming convention
/// may be used when building one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConstraintRepr")]
pub struct Constraint {
    left_key: String,
    operator: Operator,
    right_key: String,
}

impl Constraint {
    pub fn new(left: impl AsRef<str>, operator: Operator, right: impl AsRef<str>) -> Self {
        Self {
            left_key: to_config_key(left.as_ref()),
            operator,
            right_key: to_config_key(right.as_ref()),
        }
    }

    /// Build a constraint from a textual operator such as `">="`.
    pub fn parse(
        left: impl AsRef<str>,
        operator: &str,
        right: impl AsRef<str>,
    ) -> Result<Self, SweepError> {
        Ok(Self::new(left, operator.parse()?, right))
    }

    /// Build a constraint between two sweep dimensions.
    pub fn between(left: &SweepParameter, operator: Operator, right: &SweepParameter) -> Self {
        Self::new(left.name(), operator, right.name())
    }

    pub fn left_key(&self) -> &str {
        &self.left_key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn right_key(&self) -> &str {
        &self.right_key
    }

    pub fn keys(&self) -> [&str; 2] {
        [&self.left_key, &self.right_key]
    }

    pub fn evaluate(&self, configuration: &Configuration) -> Result<bool, SweepError> {
        let left = lookup(configuration, &self.left_key)?;
        let right = lookup(configuration, &self.right_key)?;
        Ok(self.operator.apply(left, right))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left_key, self.operator, self.right_key)
    }
}

fn lookup(configuration: &Configuration, key: &str) -> Result<Value, SweepError> {
    configuration
        .get(key)
        .ok_or_else(|| SweepError::UnknownParameterKey(key.to_string()))
}

#[derive(Deserialize)]
struct ConstraintRepr {
    left_key: String,
    operator: Operator,
    right_key: String,
}

impl From<ConstraintRepr> for Constraint {
    fn from(repr: ConstraintRepr) -> Self {
        Self::new(repr.left_key, repr.operator, repr.right_key)
    }
}

/// Returns false when any constraint rejects the configuration.
pub(crate) fn satisfies_all(
    constraints: &[Constraint],
    configuration: &Configuration,
) -> Result<bool, SweepError> {
    for constraint in constraints {
        if !constraint.evaluate(configuration)? {
            return Ok(false);
        }
    }
    Ok(true)
}
