use thiserror::Error;

/// Unified error type for `convscore` operations.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Raised when a data line of a cost log cannot be parsed.
    #[error("malformed cost log line {line_number} ({reason}): `{content}`")]
    MalformedLogLine {
        /// 1-based position of the offending line in the log.
        line_number: usize,
        /// The trimmed line as it appeared in the log.
        content: String,
        /// Short description of the check that failed.
        reason: &'static str,
    },

    /// Raised when a log contains no data lines at all.
    #[error("cost log contains no observations")]
    EmptyTrajectory,

    /// Raised when an observation carries a negative or non-finite cost.
    #[error("observation {index} has cost {cost}; costs must be finite and non-negative")]
    InvalidCost { index: usize, cost: f64 },

    /// Raised when the normalization span is empty, inverted or not finite.
    #[error("lower bound {lower} must be strictly below upper bound {upper}")]
    DegenerateBounds {
        /// Lower bound supplied by the caller.
        lower: f64,
        /// Effective upper bound after combining the run's start cost.
        upper: f64,
    },

    /// Raised when the log for a run could not be obtained.
    #[error("run `{label}` is unavailable: {reason}")]
    RunUnavailable { label: u64, reason: String },

    /// Raised when an option value cannot be used.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: &'static str,
    },
}

impl ScoreError {
    /// Helper to build a [`MalformedLogLine`](ScoreError::MalformedLogLine) error.
    pub fn malformed(line_number: usize, content: &str, reason: &'static str) -> Self {
        Self::MalformedLogLine {
            line_number,
            content: content.to_string(),
            reason,
        }
    }

    /// Helper to raise when the bound span cannot be divided by.
    pub fn degenerate_bounds(lower: f64, upper: f64) -> Self {
        Self::DegenerateBounds { lower, upper }
    }

    /// Helper for rejecting zero divisors and similar option values.
    pub fn invalid_option(option: &'static str, reason: &'static str) -> Self {
        Self::InvalidOption { option, reason }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ScoreError>;
