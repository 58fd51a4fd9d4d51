//! Scores a batch of related runs in parallel, isolating failures per run.
//!
//! Runs are parsed and segmented independently. The shared upper bound, when
//! one is requested, is a running maximum over the start costs of the runs
//! that parsed successfully; it is folded after the parallel pass and then
//! every run is scored against its share of the bound.

use std::path::Path;

use rayon::prelude::*;

use crate::error::{Result, ScoreError};
use crate::normalize::effective_upper_bound;
use crate::options::{BatchOptions, ScoringOptions, UpperBoundPolicy};
use crate::report::RunRecord;
use crate::scoring::{ConvergenceRun, NormalizedTrajectory, RunScore};

/// Where the log of a run comes from.
#[derive(Clone, Debug)]
pub enum RunSource {
    /// Raw log text.
    Log(String),
    /// The log could not be obtained; carries the reason.
    Unavailable(String),
}

/// One run of a batch, labelled by its scale factor or time budget.
#[derive(Clone, Debug)]
pub struct RunInput {
    pub label: u64,
    pub source: RunSource,
}

impl RunInput {
    /// A run whose log text is already in memory.
    pub fn from_log<S: Into<String>>(label: u64, text: S) -> Self {
        Self {
            label,
            source: RunSource::Log(text.into()),
        }
    }

    /// A run whose log is known to be missing.
    pub fn unavailable<S: Into<String>>(label: u64, reason: S) -> Self {
        Self {
            label,
            source: RunSource::Unavailable(reason.into()),
        }
    }

    /// Reads the log at `path`. A read failure marks the run unavailable
    /// instead of failing the batch.
    pub fn from_path<P: AsRef<Path>>(label: u64, path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_log(label, text),
            Err(err) => Self::unavailable(label, format!("{}: {err}", path.display())),
        }
    }

    /// Returns the log text or a [`RunUnavailable`](ScoreError::RunUnavailable) error.
    pub fn log(&self) -> Result<&str> {
        match &self.source {
            RunSource::Log(text) => Ok(text),
            RunSource::Unavailable(reason) => Err(ScoreError::RunUnavailable {
                label: self.label,
                reason: reason.clone(),
            }),
        }
    }
}

/// A successfully scored run.
#[derive(Clone, Debug)]
pub struct ScoredRun {
    pub label: u64,
    pub score: RunScore,
    /// Present when [`BatchOptions::include_trajectories`] is set.
    pub trajectory: Option<NormalizedTrajectory>,
}

/// Result of one run of the batch.
#[derive(Debug)]
pub enum RunOutcome {
    Scored(ScoredRun),
    /// The log was read but could not be parsed or scored.
    Failed { label: u64, error: ScoreError },
    /// The log could not be obtained.
    Unavailable { label: u64, reason: String },
}

impl RunOutcome {
    /// Label of the run this outcome belongs to.
    pub fn label(&self) -> u64 {
        match self {
            Self::Scored(run) => run.label,
            Self::Failed { label, .. } | Self::Unavailable { label, .. } => *label,
        }
    }
}

/// Per-run outcomes of a batch, in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<RunOutcome>,
    /// Divisor applied to labels when building report records.
    time_divisor: u64,
}

impl BatchReport {
    /// Iterates over the scored runs only.
    pub fn scored(&self) -> impl Iterator<Item = &ScoredRun> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RunOutcome::Scored(run) => Some(run),
            _ => None,
        })
    }

    /// Iterates over runs whose log failed to parse or score.
    pub fn failed(&self) -> impl Iterator<Item = (u64, &ScoreError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RunOutcome::Failed { label, error } => Some((*label, error)),
            _ => None,
        })
    }

    /// Iterates over runs whose log was missing, with the reason.
    pub fn unavailable(&self) -> impl Iterator<Item = (u64, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RunOutcome::Unavailable { label, reason } => Some((*label, reason.as_str())),
            _ => None,
        })
    }

    /// One report record per scored run.
    pub fn records(&self) -> Result<Vec<RunRecord>> {
        self.scored()
            .map(|run| RunRecord::from_score(run.label, &run.score, self.time_divisor))
            .collect()
    }
}

/// Scores every run against `lower_bound`.
///
/// Fails only when the options themselves are invalid; any per-run problem is
/// reported as [`RunOutcome::Failed`] or [`RunOutcome::Unavailable`] for that
/// run alone.
pub fn score_batch(
    runs: &[RunInput],
    lower_bound: f64,
    options: &BatchOptions,
) -> Result<BatchReport> {
    options.parse.validate()?;
    options.view.validate()?;
    options.upper_bound.validate()?;

    let parsed: Vec<Result<ConvergenceRun>> = runs
        .par_iter()
        .map(|run| {
            let text = run.log()?;
            ConvergenceRun::from_log(text, &options.parse)
        })
        .collect();

    let incoming = incoming_bounds(&parsed, options.upper_bound);

    let outcomes = runs
        .par_iter()
        .zip(parsed.into_par_iter())
        .zip(incoming.into_par_iter())
        .map(|((input, parsed), upper_bound)| {
            let scoring = ScoringOptions { upper_bound };
            let scored = parsed.and_then(|run| {
                let score = run.score(lower_bound, &scoring)?;
                let trajectory = if options.include_trajectories {
                    Some(run.normalized_trajectory(lower_bound, &scoring, &options.view)?)
                } else {
                    None
                };
                Ok(ScoredRun {
                    label: input.label,
                    score,
                    trajectory,
                })
            });
            match scored {
                Ok(run) => RunOutcome::Scored(run),
                Err(ScoreError::RunUnavailable { label, reason }) => {
                    log::warn!("run {label} is unavailable: {reason}");
                    RunOutcome::Unavailable { label, reason }
                }
                Err(error) => {
                    log::warn!("skipping run {}: {error}", input.label);
                    RunOutcome::Failed {
                        label: input.label,
                        error,
                    }
                }
            }
        })
        .collect();

    Ok(BatchReport {
        outcomes,
        time_divisor: options.view.time_divisor,
    })
}

/// Upper bound handed to each run under `policy`. Runs that failed to parse
/// receive the bound but never contribute to it.
fn incoming_bounds(parsed: &[Result<ConvergenceRun>], policy: UpperBoundPolicy) -> Vec<Option<f64>> {
    let start_costs = parsed
        .iter()
        .map(|run| run.as_ref().ok().map(ConvergenceRun::start_cost));

    match policy {
        UpperBoundPolicy::PerRun => vec![None; parsed.len()],
        UpperBoundPolicy::Running { initial } => {
            let mut running = initial;
            start_costs
                .map(|start_cost| {
                    if let Some(start_cost) = start_cost {
                        running = Some(effective_upper_bound(start_cost, running));
                    }
                    running
                })
                .collect()
        }
        UpperBoundPolicy::BatchMax { initial } => {
            let max = start_costs
                .flatten()
                .fold(initial, |bound, start_cost| {
                    Some(effective_upper_bound(start_cost, bound))
                });
            vec![max; parsed.len()]
        }
    }
}
