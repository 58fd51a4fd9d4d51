//! Configuration structures for parsing, scoring, display scaling and batch runs.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

/// Controls how raw cost logs are read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Lines starting with this marker are separators and are skipped.
    pub separator_prefix: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            separator_prefix: "--".to_string(),
        }
    }
}

impl ParseOptions {
    /// Override the separator marker.
    pub fn with_separator_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.separator_prefix = prefix.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.separator_prefix.is_empty() {
            return Err(ScoreError::invalid_option(
                "separator_prefix",
                "an empty marker would skip every line",
            ));
        }
        Ok(())
    }
}

/// Controls the score of a single run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Externally tracked upper bound. `None` normalizes against the run's own start cost.
    pub upper_bound: Option<f64>,
}

impl ScoringOptions {
    /// Supply an upper bound carried over from related runs.
    pub fn with_upper_bound(mut self, upper_bound: f64) -> Self {
        self.upper_bound = Some(upper_bound);
        self
    }
}

/// Appends a synthetic point at the next rounded display-time boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailPadding {
    /// Rounding unit, expressed in display units (time after the divisor is applied).
    pub rounding_unit: u64,
}

impl Default for TailPadding {
    fn default() -> Self {
        Self { rounding_unit: 60 }
    }
}

/// Presentation settings for per-observation trajectories and report records.
///
/// None of these settings affect segment detection or scoring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Raw times and run labels are divided (integer division) by this value for display.
    pub time_divisor: u64,
    /// Optional synthetic trailing point for plotted trajectories.
    pub tail_padding: Option<TailPadding>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            time_divisor: 1,
            tail_padding: None,
        }
    }
}

impl ViewOptions {
    /// Set the display divisor applied to raw times and labels.
    pub fn with_time_divisor(mut self, time_divisor: u64) -> Self {
        self.time_divisor = time_divisor;
        self
    }

    /// Enable the synthetic trailing point.
    pub fn with_tail_padding(mut self, padding: TailPadding) -> Self {
        self.tail_padding = Some(padding);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_time_divisor(self.time_divisor)?;
        if matches!(self.tail_padding, Some(TailPadding { rounding_unit: 0 })) {
            return Err(ScoreError::invalid_option(
                "tail_padding.rounding_unit",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Rejects a zero display divisor.
pub(crate) fn check_time_divisor(time_divisor: u64) -> Result<()> {
    if time_divisor == 0 {
        return Err(ScoreError::invalid_option(
            "time_divisor",
            "must be at least 1",
        ));
    }
    Ok(())
}

/// How the upper bound is shared between the runs of a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpperBoundPolicy {
    /// Each run is normalized against its own start cost.
    #[default]
    PerRun,
    /// Running maximum of start costs in input order, seeded with `initial`.
    Running { initial: Option<f64> },
    /// Maximum start cost over the whole batch (and `initial`), applied to every run.
    BatchMax { initial: Option<f64> },
}

impl UpperBoundPolicy {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Running {
                initial: Some(bound),
            }
            | Self::BatchMax {
                initial: Some(bound),
            } if !bound.is_finite() => Err(ScoreError::invalid_option(
                "upper_bound.initial",
                "must be finite",
            )),
            _ => Ok(()),
        }
    }
}

/// Aggregated configuration used by [`score_batch`](crate::batch::score_batch).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Options forwarded to the trajectory parser.
    pub parse: ParseOptions,
    /// Display scaling for labels and trajectories.
    pub view: ViewOptions,
    /// Sharing of the upper bound across runs.
    pub upper_bound: UpperBoundPolicy,
    /// Whether each scored run also carries its normalized trajectory.
    pub include_trajectories: bool,
}

impl BatchOptions {
    /// Override the parser settings while preserving other defaults.
    pub fn with_parse(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Override the display settings while preserving other defaults.
    pub fn with_view(mut self, view: ViewOptions) -> Self {
        self.view = view;
        self
    }

    /// Choose how the upper bound is shared between runs.
    pub fn with_upper_bound_policy(mut self, policy: UpperBoundPolicy) -> Self {
        self.upper_bound = policy;
        self
    }

    /// Emit the per-observation normalized trajectory for every scored run.
    pub fn with_trajectories(mut self, include: bool) -> Self {
        self.include_trajectories = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_collection_scripts() {
        let options = BatchOptions::default();
        assert_eq!(options.parse.separator_prefix, "--");
        assert_eq!(options.view.time_divisor, 1);
        assert_eq!(options.upper_bound, UpperBoundPolicy::PerRun);
        assert_eq!(TailPadding::default().rounding_unit, 60);
    }

    #[test]
    fn zero_divisor_and_unit_are_rejected() {
        let view = ViewOptions::default().with_time_divisor(0);
        assert!(matches!(
            view.validate(),
            Err(ScoreError::InvalidOption { option: "time_divisor", .. })
        ));
        let view = ViewOptions::default().with_tail_padding(TailPadding { rounding_unit: 0 });
        assert!(view.validate().is_err());
        assert!(UpperBoundPolicy::Running {
            initial: Some(f64::INFINITY)
        }
        .validate()
        .is_err());
        assert!(UpperBoundPolicy::BatchMax { initial: None }.validate().is_ok());
        assert!(ParseOptions::default()
            .with_separator_prefix("")
            .validate()
            .is_err());
    }

    #[test]
    fn batch_options_deserialize_from_partial_json() {
        let json = r#"{
            "view": { "time_divisor": 1000, "tail_padding": { "rounding_unit": 60 } },
            "upper_bound": { "running": { "initial": 120.5 } }
        }"#;
        let options: BatchOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.parse, ParseOptions::default());
        assert_eq!(options.view.time_divisor, 1000);
        assert_eq!(
            options.upper_bound,
            UpperBoundPolicy::Running {
                initial: Some(120.5)
            }
        );
        assert!(!options.include_trajectories);
    }
}
