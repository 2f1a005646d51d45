//! Runtime knobs for a sweep.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Settings shared by every worker in a sweep.
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Number of workers, each owning one simulation instance.
    pub workers: usize,
    /// Tick ceiling for a single run; reaching it counts as a loss.
    pub max_ticks: u64,
    /// Top-level seed for reseeding sampled parameters.
    pub seed: Option<u64>,
    /// Model globals applied after the configuration, as literal model source.
    pub static_parameters: BTreeMap<String, String>,
    /// Commands each worker runs once after opening its instance.
    pub startup_commands: Vec<String>,
    pub show_progress: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_ticks: 6000,
            seed: None,
            static_parameters: BTreeMap::new(),
            startup_commands: Vec::new(),
            show_progress: true,
        }
    }
}

impl SweepConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_static_parameter(
        mut self,
        name: impl Into<String>,
        literal: impl Into<String>,
    ) -> Self {
        self.static_parameters.insert(name.into(), literal.into());
        self
    }

    pub fn with_startup_command(mut self, command: impl Into<String>) -> Self {
        self.startup_commands.push(command.into());
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(SweepConfig::from_json("{}").unwrap(), SweepConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = SweepConfig::from_json(
            r#"{
                "workers": 18,
                "seed": 42,
                "static_parameters": {"shepherd-model": "\"pierson\""}
            }"#,
        )
        .unwrap();
        assert_eq!(config.workers, 18);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_ticks, 6000);
        assert_eq!(config.static_parameters["shepherd-model"], "\"pierson\"");
        assert!(config.show_progress);
    }
}
