//! Covariate transformations and reference values.
//!
//! Transforms are applied to the assigned column, after assignment. The
//! reference value comes from the transformed covariate download itself,
//! not from the values that ended up attached to measurements.

use log::warn;

use crate::domain::{Assignment, Transform};

/// Apply `transform` to one value. May return a non-finite result outside its domain.
pub fn apply(transform: Transform, x: f64) -> f64 {
    match transform {
        Transform::Identity => x,
        Transform::Ln => x.ln(),
        Transform::Logit => (x / (1.0 - x)).ln(),
        Transform::Squared => x * x,
        Transform::Sqrt => x.sqrt(),
        Transform::Scale1000 => x * 1000.0,
    }
}

/// Transform an assigned column, keeping each row's tag.
///
/// Rows whose transformed value is not finite become missing.
pub fn transform_column(transform: Transform, column: &[Assignment]) -> Vec<Assignment> {
    let mut dropped = 0usize;
    let out = column
        .iter()
        .map(|a| {
            let t = a.map(|v| apply(transform, v));
            match t.value() {
                Some(v) if !v.is_finite() => {
                    dropped += 1;
                    Assignment::Missing
                }
                _ => t,
            }
        })
        .collect();
    if dropped > 0 {
        warn!(
            "{dropped} row(s) fall outside the domain of the {} transform and are set to missing",
            transform.name()
        );
    }
    out
}

/// Mean of the transformed covariate values; non-finite results are skipped.
pub fn reference_value(transform: Transform, values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.into_iter().map(|v| apply(transform, v)).filter(|v| v.is_finite()) {
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

/// Output column name for a covariate and transform, e.g. `x_ldi_ln`.
pub fn column_name(covariate: &str, transform: Transform) -> String {
    format!("x_{covariate}_{}", transform.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_match_their_definitions() {
        assert_eq!(apply(Transform::Identity, 0.3), 0.3);
        assert!((apply(Transform::Ln, std::f64::consts::E) - 1.0).abs() < 1e-12);
        assert!(apply(Transform::Logit, 0.5).abs() < 1e-12);
        assert_eq!(apply(Transform::Squared, -3.0), 9.0);
        assert_eq!(apply(Transform::Sqrt, 16.0), 4.0);
        assert_eq!(apply(Transform::Scale1000, 0.002), 2.0);
    }

    #[test]
    fn out_of_domain_rows_become_missing_and_tags_survive() {
        let column = [
            Assignment::Interpolated(1.0),
            Assignment::Extrapolated(-1.0),
            Assignment::Missing,
            Assignment::Nearest(0.0),
        ];
        let out = transform_column(Transform::Ln, &column);
        assert_eq!(out[0], Assignment::Interpolated(0.0));
        assert_eq!(out[1], Assignment::Missing);
        assert_eq!(out[2], Assignment::Missing);
        assert_eq!(out[3], Assignment::Missing);
    }

    #[test]
    fn reference_is_mean_of_transformed_values() {
        let r = reference_value(Transform::Squared, [1.0, 2.0, 3.0]).unwrap();
        assert!((r - 14.0 / 3.0).abs() < 1e-12);
        assert_eq!(reference_value(Transform::Ln, [0.0, -1.0]), None);
    }

    #[test]
    fn column_names_carry_transform() {
        assert_eq!(column_name("ldi", Transform::Scale1000), "x_ldi_scale1000");
    }
}
