//! Restart-tolerant convergence scoring for optimizer cost logs.
//!
//! An optimizer that periodically reports the cost of its best candidate
//! leaves behind a log of `time<TAB>cost` lines. When the process is stopped
//! and resumed, fresh observations are appended starting again near time
//! zero. This crate turns such a log into a single comparable number:
//!
//! - parse the log into a validated [`Trajectory`] (`parsing` module),
//! - isolate the final, non-restarted [`RunSegment`] (`data` module),
//! - normalize the terminal cost between an external lower bound and the
//!   run's (or the batch's) starting cost (`normalize` and `scoring`
//!   modules), and
//! - score whole batches of related runs in parallel, with an optional
//!   shared upper bound (`batch` module), printing tab-separated records
//!   (`report` module).
//!
//! # Quick start
//!
//! ```
//! use convscore::{ConvergenceRun, ParseOptions, ScoringOptions};
//!
//! let log = "0\t200.0\n10\t150.0\n-----\n0\t90.0\n5\t70.0\n";
//! let run = ConvergenceRun::from_log(log, &ParseOptions::default()).expect("well-formed log");
//!
//! let result = run.score(50.0, &ScoringOptions::default()).expect("distinct bounds");
//! assert_eq!(result.start_cost, 90.0);
//! assert_eq!(result.best_cost, 70.0);
//! assert!((result.score - 0.5).abs() < 1e-12);
//! ```
//!
//! Scores are not clamped: a run that ends above its upper bound scores below
//! zero, and a loose lower bound can push a score above one.

pub mod batch;
pub mod data;
pub mod error;
pub mod normalize;
pub mod options;
pub mod parsing;
pub mod report;
pub mod scoring;

pub use batch::{score_batch, BatchReport, RunInput, RunOutcome, ScoredRun};
pub use data::{Observation, RunSegment, Trajectory};
pub use error::{Result, ScoreError};
pub use normalize::Bounds;
pub use options::{
    BatchOptions, ParseOptions, ScoringOptions, TailPadding, UpperBoundPolicy, ViewOptions,
};
pub use parsing::parse_trajectory;
pub use scoring::{ConvergenceRun, NormalizedTrajectory, RunScore, TrajectoryPoint};
