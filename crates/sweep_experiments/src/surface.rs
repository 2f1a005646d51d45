//! Response surfaces: success rate aggregated over chosen key columns.
//!
//! Rows that share values in the grouping columns are pooled, typically to
//! average over the seed dimension. Groups keep the order in which they first
//! appear in the table.

use serde::{Deserialize, Serialize};
use sweep_core::{to_config_key, SweepError, Value};

use crate::results::ResultsTable;

/// Aggregate over all runs sharing one combination of grouping values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub key: Vec<Value>,
    pub trials: usize,
    /// Fraction of trials that finished before the tick ceiling.
    pub success_rate: f64,
    pub mean_final_tick: f64,
}

#[derive(Default)]
struct Accumulator {
    trials: usize,
    wins: usize,
    ticks: f64,
}

/// Group table rows by `group_by` and average their outcomes.
pub fn success_rate(
    table: &ResultsTable,
    group_by: &[&str],
) -> Result<Vec<SurfacePoint>, SweepError> {
    let indices = group_by
        .iter()
        .map(|name| {
            let key = to_config_key(name);
            table
                .column_index(&key)
                .ok_or(SweepError::UnknownParameterKey(key))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: Vec<(Vec<Value>, Accumulator)> = Vec::new();
    for row in table.rows() {
        let key: Vec<Value> = indices.iter().filter_map(|&i| row.key.get(i).copied()).collect();
        let position = match groups.iter().position(|(k, _)| *k == key) {
            Some(position) => position,
            None => {
                groups.push((key, Accumulator::default()));
                groups.len() - 1
            }
        };
        let acc = &mut groups[position].1;
        acc.trials += 1;
        acc.wins += usize::from(row.record.won);
        acc.ticks += row.record.final_tick as f64;
    }

    Ok(groups
        .into_iter()
        .map(|(key, acc)| SurfacePoint {
            key,
            trials: acc.trials,
            success_rate: acc.wins as f64 / acc.trials as f64,
            mean_final_tick: acc.ticks / acc.trials as f64,
        })
        .collect())
}

/// Point with the highest success rate; ties go to the faster mean finish.
pub fn find_best_point(points: &[SurfacePoint]) -> Option<&SurfacePoint> {
    points.iter().max_by(|a, b| {
        a.success_rate
            .total_cmp(&b.success_rate)
            .then_with(|| b.mean_final_tick.total_cmp(&a.mean_final_tick))
    })
}
