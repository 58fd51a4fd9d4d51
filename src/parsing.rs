//! Reads tab-separated `time<TAB>cost` logs into a validated [`Trajectory`].
//!
//! Separator and blank lines are skipped. Any other line that fails to parse
//! aborts the whole log with [`ScoreError::MalformedLogLine`].

use crate::data::{Observation, Trajectory};
use crate::error::{Result, ScoreError};
use crate::options::ParseOptions;

/// Parses a cost log using the default separator marker.
pub fn parse_trajectory(text: &str) -> Result<Trajectory> {
    parse_trajectory_with_options(text, &ParseOptions::default())
}

/// Parses a cost log, skipping blank lines and separator lines.
pub fn parse_trajectory_with_options(text: &str, options: &ParseOptions) -> Result<Trajectory> {
    options.validate()?;

    let mut observations = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(options.separator_prefix.as_str()) {
            continue;
        }
        observations.push(parse_line(index + 1, line)?);
    }

    log::trace!("parsed {} observations", observations.len());
    Trajectory::new(observations)
}

/// Parses a single data line. `line_number` is 1-based and only used for errors.
pub fn parse_line(line_number: usize, line: &str) -> Result<Observation> {
    let mut fields = line.split('\t');
    let (time, cost) = match (fields.next(), fields.next(), fields.next()) {
        (Some(time), Some(cost), None) => (time, cost),
        _ => {
            return Err(ScoreError::malformed(
                line_number,
                line,
                "expected exactly two tab-separated fields",
            ))
        }
    };

    let time = time.trim().parse::<u64>().map_err(|_| {
        ScoreError::malformed(line_number, line, "timestamp is not a non-negative integer")
    })?;
    let cost = cost
        .trim()
        .parse::<f64>()
        .map_err(|_| ScoreError::malformed(line_number, line, "cost is not a real number"))?;
    if !cost.is_finite() || cost < 0.0 {
        return Err(ScoreError::malformed(
            line_number,
            line,
            "cost must be finite and non-negative",
        ));
    }

    Ok(Observation::new(time, cost))
}
