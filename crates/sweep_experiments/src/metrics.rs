//! Result extraction from a finished simulation run.
//!
//! Once a run stops, the model is queried for its final tick and the flock
//! statistics that describe how well the shepherds did.

use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::link::SimulationLink;

pub const TICKS: &str = "ticks";
pub const AVERAGE_SPREAD: &str = "average-spread-global";
pub const MAX_SPREAD: &str = "max-spread-global";
pub const GCM_DISTANCE_FROM_GOAL: &str = "gcm-distance-from-goal";
pub const AVERAGE_DISTANCE_FROM_GOAL: &str = "average-distance-from-goal";

/// Report that ends a run: the flock reached the goal or time ran out.
pub fn stop_condition(max_ticks: u64) -> String {
    format!("win? or ticks >= {max_ticks}")
}

/// Outcome of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Tick at which the run stopped.
    pub final_tick: u64,
    /// True when the run stopped before the tick ceiling.
    pub won: bool,
    pub final_average_spread: f64,
    pub final_max_spread: f64,
    /// Distance from the flock's global centre of mass to the goal.
    pub final_gcm_distance_from_goal: f64,
    pub final_average_distance_from_goal: f64,
}

impl ResultRecord {
    /// Field names in export order.
    pub const COLUMNS: [&'static str; 6] = [
        "final_tick",
        "won",
        "final_average_spread",
        "final_max_spread",
        "final_gcm_distance_from_goal",
        "final_average_distance_from_goal",
    ];

    pub(crate) fn field_strings(&self) -> [String; 6] {
        [
            self.final_tick.to_string(),
            self.won.to_string(),
            self.final_average_spread.to_string(),
            self.final_max_spread.to_string(),
            self.final_gcm_distance_from_goal.to_string(),
            self.final_average_distance_from_goal.to_string(),
        ]
    }
}

/// Query a stopped run for its result record.
pub fn extract_record<L: SimulationLink + ?Sized>(
    link: &mut L,
    max_ticks: u64,
) -> Result<ResultRecord, LinkError> {
    let final_tick = link.report_u64(TICKS)?;
    Ok(ResultRecord {
        final_tick,
        won: final_tick < max_ticks,
        final_average_spread: link.report_f64(AVERAGE_SPREAD)?,
        final_max_spread: link.report_f64(MAX_SPREAD)?,
        final_gcm_distance_from_goal: link.report_f64(GCM_DISTANCE_FROM_GOAL)?,
        final_average_distance_from_goal: link.report_f64(AVERAGE_DISTANCE_FROM_GOAL)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ReportValue;

    struct Finished {
        tick: f64,
    }

    impl SimulationLink for Finished {
        fn command(&mut self, _text: &str) -> Result<(), LinkError> {
            Ok(())
        }

        fn report(&mut self, expression: &str) -> Result<ReportValue, LinkError> {
            let value = match expression {
                TICKS => self.tick,
                AVERAGE_SPREAD => 1.5,
                MAX_SPREAD => 4.0,
                GCM_DISTANCE_FROM_GOAL => 2.25,
                AVERAGE_DISTANCE_FROM_GOAL => 3.0,
                other => return Err(LinkError::Backend(format!("unknown reporter {other}"))),
            };
            Ok(ReportValue::Number(value))
        }
    }

    #[test]
    fn test_extract_record_before_ceiling() {
        let record = extract_record(&mut Finished { tick: 812.0 }, 6000).unwrap();
        assert_eq!(record.final_tick, 812);
        assert!(record.won);
        assert_eq!(record.final_average_spread, 1.5);
        assert_eq!(record.final_max_spread, 4.0);
        assert_eq!(record.final_gcm_distance_from_goal, 2.25);
        assert_eq!(record.final_average_distance_from_goal, 3.0);
    }

    #[test]
    fn test_ceiling_counts_as_loss() {
        let record = extract_record(&mut Finished { tick: 6000.0 }, 6000).unwrap();
        assert!(!record.won);
    }

    #[test]
    fn test_stop_condition() {
        assert_eq!(stop_condition(6000), "win? or ticks >= 6000");
    }
}
