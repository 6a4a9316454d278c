//! Piecewise-linear interpolation over sorted knots.
//!
//! Evaluation outside the knot range continues the first or last segment
//! in a straight line. Whether that is acceptable is the caller's decision.

/// Index `i` of the segment `[xs[i], xs[i + 1]]` used to evaluate at `x`.
///
/// `xs` must be strictly increasing with at least two knots.
pub fn segment_index(xs: &[f64], x: f64) -> usize {
    debug_assert!(xs.len() >= 2);
    let above = xs.partition_point(|&k| k <= x);
    above.saturating_sub(1).min(xs.len() - 2)
}

/// Fractional position of `x` along segment `i`; outside `[0, 1]` when extrapolating.
pub fn segment_weight(xs: &[f64], i: usize, x: f64) -> f64 {
    (x - xs[i]) / (xs[i + 1] - xs[i])
}

/// Whether `xs` has at least two knots and is strictly increasing and finite.
pub fn is_valid_axis(xs: &[f64]) -> bool {
    xs.len() >= 2 && xs.iter().all(|x| x.is_finite()) && xs.windows(2).all(|w| w[0] < w[1])
}

/// A fitted 1-D linear interpolant.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterp {
    knots: Vec<f64>,
    values: Vec<f64>,
}

impl LinearInterp {
    /// Returns `None` unless `knots` is a valid axis of the same length as `values`.
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> Option<Self> {
        if knots.len() != values.len() || !is_valid_axis(&knots) {
            return None;
        }
        Some(Self { knots, values })
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn eval(&self, x: f64) -> f64 {
        let i = segment_index(&self.knots, x);
        let u = segment_weight(&self.knots, i, x);
        self.values[i] + u * (self.values[i + 1] - self.values[i])
    }
}
