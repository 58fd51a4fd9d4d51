//! Bound-relative normalization primitives.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

/// Validated normalization span: `lower < upper`, both finite, finite width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    lower: f64,
    upper: f64,
}

impl Bounds {
    /// Creates a span, rejecting empty, inverted or non-finite bounds.
    ///
    /// The span `upper - lower` must itself be finite, otherwise every
    /// normalized cost would be NaN.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite()
            || !upper.is_finite()
            || lower >= upper
            || !(upper - lower).is_finite()
        {
            return Err(ScoreError::degenerate_bounds(lower, upper));
        }
        Ok(Self { lower, upper })
    }

    /// Builds the span for a run from its start cost and an optional carried-over bound.
    pub fn for_run(lower: f64, start_cost: f64, incoming: Option<f64>) -> Result<Self> {
        match incoming {
            Some(bound) if !bound.is_finite() => Err(ScoreError::degenerate_bounds(lower, bound)),
            _ => Self::new(lower, effective_upper_bound(start_cost, incoming)),
        }
    }

    /// The normalization floor.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// The normalization ceiling.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Maps `cost` to `1 - (cost - lower) / (upper - lower)`.
    ///
    /// The result is not clamped. Costs above the ceiling score below zero
    /// and costs below the floor score above one.
    pub fn normalize(&self, cost: f64) -> f64 {
        1.0 - (cost - self.lower) / (self.upper - self.lower)
    }
}

/// Combines a carried-over upper bound with a run's own start cost.
///
/// The result is never below `start_cost`, so folding it over a batch yields
/// a non-decreasing bound.
pub fn effective_upper_bound(start_cost: f64, incoming: Option<f64>) -> f64 {
    match incoming {
        Some(bound) if bound > start_cost => bound,
        _ => start_cost,
    }
}

/// Running minimum of `costs`, element by element.
pub fn running_best<I>(costs: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut best = f64::INFINITY;
    costs
        .into_iter()
        .map(|cost| {
            best = best.min(cost);
            best
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn normalize_maps_bounds_to_unit_interval() {
        let bounds = Bounds::new(50.0, 100.0).unwrap();
        assert_eq!(bounds.normalize(50.0), 1.0);
        assert_eq!(bounds.normalize(100.0), 0.0);
        assert_relative_eq!(bounds.normalize(60.0), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn out_of_range_costs_are_not_clamped() {
        let bounds = Bounds::new(0.0, 10.0).unwrap();
        assert_relative_eq!(bounds.normalize(15.0), -0.5, epsilon = 1e-12);
        let bounds = Bounds::new(-10.0, 10.0).unwrap();
        assert_relative_eq!(bounds.normalize(-20.0), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_spans_are_rejected() {
        assert!(matches!(
            Bounds::new(5.0, 5.0),
            Err(ScoreError::DegenerateBounds { .. })
        ));
        assert!(Bounds::new(6.0, 5.0).is_err());
        assert!(Bounds::new(f64::NEG_INFINITY, 5.0).is_err());
        assert!(Bounds::new(0.0, f64::NAN).is_err());
        assert!(Bounds::for_run(0.0, 10.0, Some(f64::NAN)).is_err());
    }

    #[test]
    fn overflowing_span_is_rejected() {
        assert!(matches!(
            Bounds::new(-1.7e308, 1.7e308),
            Err(ScoreError::DegenerateBounds { .. })
        ));
        assert!(Bounds::for_run(-1.7e308, 1.7e308, None).is_err());
        assert!(Bounds::new(-1e307, 1e307).is_ok());
    }

    #[test]
    fn effective_upper_bound_never_drops_below_start_cost() {
        assert_eq!(effective_upper_bound(90.0, None), 90.0);
        assert_eq!(effective_upper_bound(90.0, Some(200.0)), 200.0);
        assert_eq!(effective_upper_bound(90.0, Some(10.0)), 90.0);
    }

    #[test]
    fn running_best_is_monotone() {
        assert_eq!(
            running_best([5.0, 7.0, 3.0, 4.0, 1.0]),
            vec![5.0, 5.0, 3.0, 3.0, 1.0]
        );
        assert!(running_best(std::iter::empty::<f64>()).is_empty());
    }
}
