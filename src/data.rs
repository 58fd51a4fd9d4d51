//! Observation containers and the restart-tolerant run segment detector.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

/// One reported candidate-solution cost at a point in elapsed run time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Elapsed run time in the log's native unit.
    pub time: u64,
    /// Cost of the best candidate known at `time`.
    pub cost: f64,
}

impl Observation {
    /// Creates an observation from a timestamp and a cost.
    pub fn new(time: u64, cost: f64) -> Self {
        Self { time, cost }
    }
}

impl From<(u64, f64)> for Observation {
    fn from((time, cost): (u64, f64)) -> Self {
        Self::new(time, cost)
    }
}

/// Observations of a run log in file order.
///
/// A trajectory is never empty and every cost is finite and non-negative.
/// Timestamps are not required to be monotonic: a log that was appended to
/// after a restart contains several ascending runs back to back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct Trajectory {
    observations: Vec<Observation>,
}

impl Trajectory {
    /// Validates and wraps a sequence of observations.
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(ScoreError::EmptyTrajectory);
        }

        for (index, observation) in observations.iter().enumerate() {
            if !observation.cost.is_finite() || observation.cost < 0.0 {
                return Err(ScoreError::InvalidCost {
                    index,
                    cost: observation.cost,
                });
            }
        }

        Ok(Self { observations })
    }

    /// Number of observations, including those of superseded runs.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Returns a read-only view of all observations in file order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// The final observation of the log.
    pub fn last(&self) -> Observation {
        self.observations[self.observations.len() - 1]
    }

    /// Isolates the trailing run that was not superseded by a restart.
    ///
    /// Walks backward from the final observation and admits each older
    /// observation while its timestamp is strictly below the oldest one
    /// admitted so far. The first observation that fails the test marks
    /// the restart boundary; it and everything before it are excluded.
    pub fn run_segment(&self) -> RunSegment<'_> {
        let mut start = self.observations.len() - 1;
        let mut boundary_time = self.observations[start].time;

        while start > 0 {
            let candidate = self.observations[start - 1];
            if candidate.time >= boundary_time {
                break;
            }
            boundary_time = candidate.time;
            start -= 1;
        }

        RunSegment {
            observations: &self.observations[start..],
            start,
        }
    }
}

impl TryFrom<Vec<Observation>> for Trajectory {
    type Error = ScoreError;

    fn try_from(observations: Vec<Observation>) -> Result<Self> {
        Self::new(observations)
    }
}

impl From<Trajectory> for Vec<Observation> {
    fn from(trajectory: Trajectory) -> Self {
        trajectory.observations
    }
}

/// The final, non-restarted run of a [`Trajectory`], in chronological order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSegment<'a> {
    observations: &'a [Observation],
    /// Index of the first segment observation within the trajectory.
    start: usize,
}

impl<'a> RunSegment<'a> {
    /// Observations of the segment, oldest first.
    pub fn observations(&self) -> &'a [Observation] {
        self.observations
    }

    /// Position of the segment's first observation in the full trajectory.
    pub fn start_index(&self) -> usize {
        self.start
    }

    /// Number of observations in the segment (at least one).
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false`; a segment holds at least the final observation.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Whether observations from an earlier run were discarded.
    pub fn is_restarted(&self) -> bool {
        self.start > 0
    }

    /// Cost at the chronologically earliest observation of the segment.
    pub fn start_cost(&self) -> f64 {
        self.observations[0].cost
    }

    /// Cost at the final observation, taken as the run's best cost.
    pub fn best_cost(&self) -> f64 {
        self.observations[self.observations.len() - 1].cost
    }

    /// Iterates over the segment oldest first.
    pub fn iter(&self) -> std::slice::Iter<'a, Observation> {
        self.observations.iter()
    }
}
