//! Per-run scoring: segment detection, bound selection and normalization.

use serde::{Deserialize, Serialize};

use crate::data::{RunSegment, Trajectory};
use crate::error::Result;
use crate::normalize::{running_best, Bounds};
use crate::options::{ParseOptions, ScoringOptions, ViewOptions};
use crate::parsing::parse_trajectory_with_options;

/// A single optimizer run, ready to be scored against a lower bound.
#[derive(Clone, Debug)]
pub struct ConvergenceRun {
    trajectory: Trajectory,
}

impl ConvergenceRun {
    /// Wraps an already validated trajectory.
    pub fn new(trajectory: Trajectory) -> Self {
        Self { trajectory }
    }

    /// Parses a raw cost log.
    pub fn from_log(text: &str, options: &ParseOptions) -> Result<Self> {
        parse_trajectory_with_options(text, options).map(Self::new)
    }

    /// Accessor for the full trajectory, superseded runs included.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// The final, non-restarted run segment.
    pub fn segment(&self) -> RunSegment<'_> {
        self.trajectory.run_segment()
    }

    /// Cost at the start of the final run segment.
    pub fn start_cost(&self) -> f64 {
        self.segment().start_cost()
    }

    /// Scores the run's terminal cost against `lower_bound`.
    pub fn score(&self, lower_bound: f64, options: &ScoringOptions) -> Result<RunScore> {
        let segment = self.segment();
        if segment.is_restarted() {
            log::debug!(
                "restart detected; discarding {} superseded observations",
                segment.start_index()
            );
        }

        let start_cost = segment.start_cost();
        let best_cost = segment.best_cost();
        let bounds = Bounds::for_run(lower_bound, start_cost, options.upper_bound)?;
        let score = bounds.normalize(best_cost);
        log::debug!(
            "scored run: start {start_cost}, best {best_cost}, bounds [{}, {}], score {score}",
            bounds.lower(),
            bounds.upper()
        );

        Ok(RunScore {
            start_cost,
            best_cost,
            lower_bound: bounds.lower(),
            effective_upper_bound: bounds.upper(),
            score,
            segment_start: segment.start_index(),
            segment_len: segment.len(),
        })
    }

    /// Normalizes every observation of the final run segment.
    ///
    /// Uses the same bounds as [`score`](Self::score). When tail padding is
    /// enabled, a synthetic point at the next rounded display-time boundary is
    /// stored in [`NormalizedTrajectory::tail`], apart from the real points.
    pub fn normalized_trajectory(
        &self,
        lower_bound: f64,
        options: &ScoringOptions,
        view: &ViewOptions,
    ) -> Result<NormalizedTrajectory> {
        view.validate()?;
        let segment = self.segment();
        let bounds = Bounds::for_run(lower_bound, segment.start_cost(), options.upper_bound)?;

        let best = running_best(segment.iter().map(|observation| observation.cost));
        let points: Vec<TrajectoryPoint> = segment
            .iter()
            .zip(best)
            .map(|(observation, best_cost_so_far)| TrajectoryPoint {
                time: observation.time,
                normalized: bounds.normalize(observation.cost),
                cost: observation.cost,
                best_cost_so_far,
            })
            .collect();

        let tail = match (view.tail_padding, points.last()) {
            (Some(padding), Some(last)) => Some(TrajectoryPoint {
                time: padded_time(last.time, view.time_divisor, padding.rounding_unit),
                normalized: bounds.normalize(last.best_cost_so_far),
                cost: last.best_cost_so_far,
                best_cost_so_far: last.best_cost_so_far,
            }),
            _ => None,
        };

        Ok(NormalizedTrajectory {
            lower_bound: bounds.lower(),
            upper_bound: bounds.upper(),
            points,
            tail,
        })
    }
}

/// Rounds `time` up to the next multiple of `unit` display units, in raw units.
fn padded_time(time: u64, divisor: u64, unit: u64) -> u64 {
    (time / divisor)
        .div_ceil(unit)
        .saturating_mul(unit)
        .saturating_mul(divisor)
}

/// Describes the result of scoring one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunScore {
    /// Cost at the start of the final run segment.
    pub start_cost: f64,
    /// Cost at the final observation of the log.
    pub best_cost: f64,
    /// Normalization floor supplied by the caller.
    pub lower_bound: f64,
    /// `max(incoming upper bound, start_cost)`, or `start_cost` alone.
    pub effective_upper_bound: f64,
    /// `1 - (best_cost - lower_bound) / (effective_upper_bound - lower_bound)`.
    pub score: f64,
    /// Index of the segment's first observation in the full trajectory.
    pub segment_start: usize,
    /// Number of observations in the final run segment.
    pub segment_len: usize,
}

impl RunScore {
    /// Whether observations of an earlier, restarted run were discarded.
    pub fn restarted(&self) -> bool {
        self.segment_start > 0
    }
}

/// One point of a normalized trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Raw elapsed time.
    pub time: u64,
    /// Normalized cost under the run's bounds.
    pub normalized: f64,
    /// Raw cost.
    pub cost: f64,
    /// Lowest cost seen so far within the segment.
    pub best_cost_so_far: f64,
}

/// Per-observation view of a run's final segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTrajectory {
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Real observations, oldest first.
    pub points: Vec<TrajectoryPoint>,
    /// Synthetic presentation point, never an observation.
    pub tail: Option<TrajectoryPoint>,
}

impl NormalizedTrajectory {
    /// Iterates over the real points followed by the synthetic tail, if any.
    pub fn points_with_tail(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter().chain(self.tail.iter())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::Observation;
    use crate::error::ScoreError;
    use crate::options::TailPadding;

    fn run(points: &[(u64, f64)]) -> ConvergenceRun {
        let observations = points.iter().copied().map(Observation::from).collect();
        ConvergenceRun::new(Trajectory::new(observations).unwrap())
    }

    #[test]
    fn scores_single_segment_run() {
        let result = run(&[(0, 100.0), (10, 80.0), (20, 60.0)])
            .score(50.0, &ScoringOptions::default())
            .unwrap();
        assert_eq!(result.start_cost, 100.0);
        assert_eq!(result.best_cost, 60.0);
        assert_eq!(result.effective_upper_bound, 100.0);
        assert_eq!(result.segment_len, 3);
        assert!(!result.restarted());
        assert_relative_eq!(result.score, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn scores_only_the_restarted_segment() {
        let result = run(&[(0, 200.0), (10, 150.0), (0, 90.0), (5, 70.0)])
            .score(50.0, &ScoringOptions::default())
            .unwrap();
        assert_eq!(result.start_cost, 90.0);
        assert_eq!(result.best_cost, 70.0);
        assert_eq!(result.segment_start, 2);
        assert!(result.restarted());
        assert_relative_eq!(result.score, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn incoming_upper_bound_is_combined_with_start_cost() {
        let run = run(&[(0, 100.0), (10, 75.0)]);
        let raised = run
            .score(50.0, &ScoringOptions::default().with_upper_bound(150.0))
            .unwrap();
        assert_eq!(raised.effective_upper_bound, 150.0);
        assert_relative_eq!(raised.score, 0.75, epsilon = 1e-12);

        let ignored = run
            .score(50.0, &ScoringOptions::default().with_upper_bound(60.0))
            .unwrap();
        assert_eq!(ignored.effective_upper_bound, 100.0);
    }

    #[test]
    fn single_observation_needs_distinct_bounds() {
        let single = run(&[(7, 80.0)]);
        let result = single.score(50.0, &ScoringOptions::default()).unwrap();
        assert_eq!(result.start_cost, result.best_cost);
        assert_eq!(result.score, 0.0);

        let err = single.score(80.0, &ScoringOptions::default()).unwrap_err();
        assert!(matches!(err, ScoreError::DegenerateBounds { .. }));
    }

    #[test]
    fn lower_bound_above_start_cost_is_degenerate() {
        let err = run(&[(0, 10.0), (1, 5.0)])
            .score(20.0, &ScoringOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ScoreError::DegenerateBounds {
                lower,
                upper
            } if lower == 20.0 && upper == 10.0
        ));
    }

    #[test]
    fn trajectory_view_tracks_running_best() {
        let view = run(&[(0, 500.0), (0, 100.0), (30, 120.0), (60, 80.0)])
            .normalized_trajectory(50.0, &ScoringOptions::default(), &ViewOptions::default())
            .unwrap();
        assert_eq!(view.points.len(), 3);
        assert_eq!(view.upper_bound, 100.0);
        let best: Vec<f64> = view.points.iter().map(|p| p.best_cost_so_far).collect();
        assert_eq!(best, vec![100.0, 100.0, 80.0]);
        assert_relative_eq!(view.points[1].normalized, -0.4, epsilon = 1e-12);
        assert_relative_eq!(view.points[2].normalized, 0.4, epsilon = 1e-12);
        assert!(view.tail.is_none());
    }

    #[test]
    fn tail_padding_rounds_up_to_next_display_unit() {
        let view_options = ViewOptions::default()
            .with_time_divisor(1000)
            .with_tail_padding(TailPadding::default());
        let view = run(&[(0, 100.0), (61_500, 70.0), (95_000, 75.0)])
            .normalized_trajectory(50.0, &ScoringOptions::default(), &view_options)
            .unwrap();
        let tail = view.tail.expect("tail point");
        assert_eq!(tail.time, 120_000);
        assert_eq!(tail.cost, 70.0);
        assert_eq!(tail.best_cost_so_far, 70.0);
        assert_eq!(view.points_with_tail().count(), 4);
    }

    #[test]
    fn tail_on_boundary_keeps_time() {
        assert_eq!(padded_time(120, 1, 60), 120);
        assert_eq!(padded_time(0, 1, 60), 0);
        assert_eq!(padded_time(121, 1, 60), 180);
    }

    #[test]
    fn trajectory_view_rejects_zero_divisor() {
        let err = run(&[(0, 100.0)])
            .normalized_trajectory(
                0.0,
                &ScoringOptions::default(),
                &ViewOptions::default().with_time_divisor(0),
            )
            .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidOption { .. }));
    }
}
