use serde::{Deserialize, Serialize};

use super::SweepParameter;
use crate::value::Value;

/// One concrete assignment of a value to every sweep dimension.
///
/// Entries keep the order in which the dimensions were declared.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Configuration {
    entries: Vec<(String, Value)>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry(mut self, key: &str, value: Value) -> Self {
        self.entries.push((key.to_string(), value));
        self
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, value)| *value).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Number of configurations the full cross product would contain.
pub(crate) fn product_size(parameters: &[SweepParameter]) -> usize {
    parameters
        .iter()
        .fold(1usize, |size, p| size.saturating_mul(p.values().len()))
}

/// Cartesian product of all dimensions; the first dimension varies slowest.
pub(crate) fn cartesian_product(parameters: &[SweepParameter]) -> Vec<Configuration> {
    let mut partial: Vec<Configuration> = vec![Configuration::new()];

    for parameter in parameters {
        let key = parameter.config_key();
        partial = partial
            .iter()
            .flat_map(|p| {
                let key = key.as_str();
                parameter
                    .values()
                    .iter()
                    .map(move |&value| p.clone().with_entry(key, value))
            })
            .collect();
    }

    partial
}
