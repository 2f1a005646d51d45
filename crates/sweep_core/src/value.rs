use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete parameter value.
///
/// Integer samplers produce [`Value::Int`] and float samplers produce
/// [`Value::Float`]. Comparisons between the two are numeric, so `Int(2)`
/// equals `Float(2.0)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Value::Int(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// Renders the value the way it is spelled inside a model command.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_comparisons_are_numeric() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert!(Value::Int(3) > Value::Float(2.5));
        assert!(Value::Float(-1.0) < Value::Int(0));
    }

    #[test]
    fn display_keeps_integers_integral() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
    }

    #[test]
    fn json_numbers_keep_their_kind() {
        let values: Vec<Value> = serde_json::from_str("[3, 3.5]").unwrap();
        assert!(values[0].is_int());
        assert!(!values[1].is_int());
    }
}
