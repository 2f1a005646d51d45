//! Results table: one row per executed configuration, keyed by its values.

use serde::{Deserialize, Serialize};
use sweep_core::{ExperimentDesign, Value};

use crate::error::HarnessError;
use crate::metrics::ResultRecord;

/// A configuration's values (in key-column order) and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub key: Vec<Value>,
    pub record: ResultRecord,
}

/// Sweep outcomes in configuration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsTable {
    key_columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultsTable {
    pub fn new(key_columns: Vec<String>) -> Self {
        Self {
            key_columns,
            rows: Vec::new(),
        }
    }

    /// Pair each configuration of `design` with the record at the same position.
    pub fn join(
        design: &ExperimentDesign,
        records: Vec<ResultRecord>,
    ) -> Result<Self, HarnessError> {
        if design.len() != records.len() {
            return Err(HarnessError::LengthMismatch {
                configurations: design.len(),
                records: records.len(),
            });
        }

        let rows = design
            .configurations()
            .iter()
            .zip(records)
            .map(|(configuration, record)| ResultRow {
                key: configuration.values(),
                record,
            })
            .collect();

        Ok(Self {
            key_columns: design.columns().to_vec(),
            rows,
        })
    }

    pub fn push(&mut self, key: Vec<Value>, record: ResultRecord) {
        self.rows.push(ResultRow { key, record });
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.key_columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// First record whose key equals `key`.
    pub fn get(&self, key: &[Value]) -> Option<&ResultRecord> {
        self.rows
            .iter()
            .find(|row| row.key == key)
            .map(|row| &row.record)
    }

    pub fn records(&self) -> impl Iterator<Item = &ResultRecord> + '_ {
        self.rows.iter().map(|row| &row.record)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_core::{Parameter, SweepSpace};

    fn record(final_tick: u64) -> ResultRecord {
        ResultRecord {
            final_tick,
            won: final_tick < 100,
            final_average_spread: 0.0,
            final_max_spread: 0.0,
            final_gcm_distance_from_goal: 0.0,
            final_average_distance_from_goal: 0.0,
        }
    }

    #[test]
    fn test_join_keeps_configuration_order() {
        let design = SweepSpace::new()
            .parameter(Parameter::new("num-sheep", [10, 20]))
            .parameter(Parameter::new("num-shepherds", [1]))
            .design(false, None)
            .unwrap();

        let table = ResultsTable::join(&design, vec![record(5), record(150)]).unwrap();
        assert_eq!(table.key_columns(), &["num_sheep".to_string(), "num_shepherds".to_string()]);
        assert_eq!(table.rows()[0].key, vec![Value::Int(10), Value::Int(1)]);
        assert_eq!(table.get(&[Value::Int(20), Value::Int(1)]).unwrap().final_tick, 150);
        assert_eq!(table.column_index("num_shepherds"), Some(1));
    }

    #[test]
    fn test_join_rejects_missing_records() {
        let design = SweepSpace::new()
            .parameter(Parameter::new("a", [1, 2, 3]))
            .design(false, None)
            .unwrap();
        assert!(matches!(
            ResultsTable::join(&design, vec![record(1)]),
            Err(HarnessError::LengthMismatch {
                configurations: 3,
                records: 1
            })
        ));
    }
}
