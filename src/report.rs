//! Tab-separated report records handed to the report assembler.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::options::check_time_divisor;
use crate::scoring::{NormalizedTrajectory, RunScore};

/// One line per scored run: label, score, upper bound and best cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run label after the display divisor.
    pub label: u64,
    pub score: f64,
    pub upper_bound: f64,
    pub best_cost: f64,
}

impl RunRecord {
    /// Builds the record for a scored run, dividing the label by `time_divisor`.
    pub fn from_score(label: u64, score: &RunScore, time_divisor: u64) -> Result<Self> {
        check_time_divisor(time_divisor)?;
        Ok(Self {
            label: label / time_divisor,
            score: score.score,
            upper_bound: score.effective_upper_bound,
            best_cost: score.best_cost,
        })
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.6}\t{:.6}\t{:.6}",
            self.label, self.score, self.upper_bound, self.best_cost
        )
    }
}

/// One line per trajectory point: time, normalized cost, raw cost and running best.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    /// Point time after the display divisor.
    pub time: u64,
    pub normalized: f64,
    pub cost: f64,
    pub best_cost_so_far: f64,
}

impl fmt::Display for TrajectoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.6}\t{:.6}\t{:.6}",
            self.time, self.normalized, self.cost, self.best_cost_so_far
        )
    }
}

/// Records for every point of `trajectory`, the synthetic tail included.
pub fn trajectory_records(
    trajectory: &NormalizedTrajectory,
    time_divisor: u64,
) -> Result<Vec<TrajectoryRecord>> {
    check_time_divisor(time_divisor)?;
    Ok(trajectory
        .points_with_tail()
        .map(|point| TrajectoryRecord {
            time: point.time / time_divisor,
            normalized: point.normalized,
            cost: point.cost,
            best_cost_so_far: point.best_cost_so_far,
        })
        .collect())
}

/// Writes one line per record followed by a blank line closing the block.
pub fn write_report<W, R>(mut writer: W, records: &[R]) -> io::Result<()>
where
    W: Write,
    R: fmt::Display,
{
    for record in records {
        writeln!(writer, "{record}")?;
    }
    writeln!(writer)
}
