//! Fitting and evaluating one interpolant over a covariate's (age, time) grid.
//!
//! Dimensionality is decided once per covariate from the shared grid
//! descriptor:
//!
//! - several ages and several times: bilinear over the rectilinear grid
//! - only one of the two axes varies: linear over that axis
//! - neither varies: configuration error
//!
//! Evaluation continues the edge segment (or edge cell) linearly outside the
//! fitted extent. Deciding when that is allowed belongs to the range classifier.

use log::debug;
use nalgebra::DMatrix;

use crate::data::{AXIS_EPS, GridDescriptor, GridPoint, distinct_sorted};
use crate::domain::{Dimensionality, Sex};
use crate::error::{Axis, ConfigurationError};
use crate::math::{LinearInterp, RectilinearGrid};

/// Pick the axes to interpolate over.
pub fn select_dimensionality(grid: &GridDescriptor) -> Result<Dimensionality, ConfigurationError> {
    let age_varies = grid.by_age && grid.n_ages() > 1;
    let time_varies = grid.n_times() > 1;
    match (age_varies, time_varies) {
        (true, true) => Ok(Dimensionality::AgeTime),
        (true, false) => Ok(Dimensionality::Age),
        (false, true) => Ok(Dimensionality::Time),
        (false, false) => Err(ConfigurationError::NoInterpolationAxis),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisInterpolator {
    Age(LinearInterp),
    Time(LinearInterp),
    AgeTime(RectilinearGrid),
}

impl AxisInterpolator {
    /// Fit on the points of one sex (`Sex::Both` for a pooled covariate).
    ///
    /// Several points on the same vertex are averaged.
    pub fn fit(points: &[GridPoint], dims: Dimensionality, sex: Sex) -> Result<Self, ConfigurationError> {
        match dims {
            Dimensionality::Age => {
                let pairs = points.iter().filter_map(|p| p.age.map(|a| (a, p.value))).collect();
                fit_line(pairs, sex, Axis::Age).map(AxisInterpolator::Age)
            }
            Dimensionality::Time => {
                let pairs = points.iter().map(|p| (p.time, p.value)).collect();
                fit_line(pairs, sex, Axis::Time).map(AxisInterpolator::Time)
            }
            Dimensionality::AgeTime => fit_grid(points, sex).map(AxisInterpolator::AgeTime),
        }
    }

    pub fn dimensionality(&self) -> Dimensionality {
        match self {
            AxisInterpolator::Age(_) => Dimensionality::Age,
            AxisInterpolator::Time(_) => Dimensionality::Time,
            AxisInterpolator::AgeTime(_) => Dimensionality::AgeTime,
        }
    }

    /// Evaluate at `(age, time)`; the axis a 1-D fit does not use is ignored.
    pub fn eval(&self, age: f64, time: f64) -> f64 {
        match self {
            AxisInterpolator::Age(f) => f.eval(age),
            AxisInterpolator::Time(f) => f.eval(time),
            AxisInterpolator::AgeTime(g) => g.eval(age, time),
        }
    }
}

fn fit_line(mut pairs: Vec<(f64, f64)>, sex: Sex, axis: Axis) -> Result<LinearInterp, ConfigurationError> {
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut knots: Vec<f64> = Vec::with_capacity(pairs.len());
    let mut sums: Vec<(f64, usize)> = Vec::with_capacity(pairs.len());
    for (x, v) in pairs {
        match (knots.last(), sums.last_mut()) {
            (Some(&k), Some(acc)) if (x - k).abs() <= AXIS_EPS => {
                acc.0 += v;
                acc.1 += 1;
            }
            _ => {
                knots.push(x);
                sums.push((v, 1));
            }
        }
    }
    let merged = sums.iter().filter(|(_, n)| *n > 1).count();
    if merged > 0 {
        debug!("{sex}: averaged duplicate values on {merged} {axis} knot(s)");
    }
    let values = sums.iter().map(|(s, n)| s / *n as f64).collect();

    LinearInterp::new(knots, values).ok_or(ConfigurationError::DegenerateAxis { sex, axis })
}

fn fit_grid(points: &[GridPoint], sex: Sex) -> Result<RectilinearGrid, ConfigurationError> {
    let ages = distinct_sorted(points.iter().filter_map(|p| p.age));
    let times = distinct_sorted(points.iter().map(|p| p.time));
    if ages.len() < 2 {
        return Err(ConfigurationError::DegenerateAxis { sex, axis: Axis::Age });
    }
    if times.len() < 2 {
        return Err(ConfigurationError::DegenerateAxis { sex, axis: Axis::Time });
    }

    let mut sums = DMatrix::<f64>::zeros(ages.len(), times.len());
    let mut counts = DMatrix::<usize>::zeros(ages.len(), times.len());
    for p in points {
        let Some(age) = p.age else { continue };
        if let (Some(i), Some(j)) = (axis_position(&ages, age), axis_position(&times, p.time)) {
            sums[(i, j)] += p.value;
            counts[(i, j)] += 1;
        }
    }

    for i in 0..ages.len() {
        for j in 0..times.len() {
            if counts[(i, j)] == 0 {
                return Err(ConfigurationError::IncompleteGrid {
                    sex,
                    age: ages[i],
                    time: times[j],
                });
            }
        }
    }
    if counts.iter().any(|&n| n > 1) {
        debug!("{sex}: averaged duplicate values on shared grid vertices");
    }

    let values = sums.zip_map(&counts, |s, n| s / n as f64);
    RectilinearGrid::new(ages, times, values).ok_or(ConfigurationError::NoInterpolationAxis)
}

fn axis_position(axis: &[f64], x: f64) -> Option<usize> {
    let i = axis.partition_point(|&k| k < x - AXIS_EPS);
    axis.get(i).filter(|&&k| (k - x).abs() <= AXIS_EPS).map(|_| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AgeCoverage;

    fn descriptor(ages: Vec<f64>, times: Vec<f64>, by_age: bool) -> GridDescriptor {
        GridDescriptor {
            ages,
            times,
            by_age,
            by_sex: false,
            age_coverage: AgeCoverage::default(),
        }
    }

    fn pt(age: f64, time: f64, value: f64) -> GridPoint {
        GridPoint {
            age: Some(age),
            time,
            value,
        }
    }

    #[test]
    fn dimensionality_follows_varying_axes() {
        let d = |a: Vec<f64>, t: Vec<f64>, by_age| select_dimensionality(&descriptor(a, t, by_age));
        assert_eq!(d(vec![1.0, 2.0], vec![2000.0, 2001.0], true), Ok(Dimensionality::AgeTime));
        assert_eq!(d(vec![1.0, 2.0], vec![2000.0], true), Ok(Dimensionality::Age));
        assert_eq!(d(vec![], vec![2000.0, 2001.0], false), Ok(Dimensionality::Time));
        assert_eq!(d(vec![1.0], vec![2000.0, 2001.0], true), Ok(Dimensionality::Time));
    }

    #[test]
    fn single_age_bucket_single_time_is_a_configuration_error() {
        let grid = descriptor(vec![], vec![2000.5], false);
        assert_eq!(select_dimensionality(&grid), Err(ConfigurationError::NoInterpolationAxis));
    }

    #[test]
    fn two_d_fit_reproduces_vertices() {
        let mut points = Vec::new();
        for (i, &a) in [0.5, 3.0, 7.5, 20.0].iter().enumerate() {
            for (j, &t) in [1990.5, 1995.5, 2010.5].iter().enumerate() {
                points.push(pt(a, t, (i * 10 + j) as f64 + 0.25 * a));
            }
        }
        let f = AxisInterpolator::fit(&points, Dimensionality::AgeTime, Sex::Female).unwrap();
        for p in &points {
            assert!((f.eval(p.age.unwrap(), p.time) - p.value).abs() < 1e-9);
        }
    }

    #[test]
    fn one_d_time_fit_extrapolates_past_last_year() {
        let points = vec![
            GridPoint { age: None, time: 2000.5, value: 1.0 },
            GridPoint { age: None, time: 2001.5, value: 2.0 },
        ];
        let f = AxisInterpolator::fit(&points, Dimensionality::Time, Sex::Both).unwrap();
        assert_eq!(f.dimensionality(), Dimensionality::Time);
        assert!((f.eval(f64::NAN, 2003.5) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_knots_are_averaged() {
        let points = vec![pt(10.0, 2000.0, 1.0), pt(10.0, 2000.0, 3.0), pt(30.0, 2000.0, 5.0)];
        let f = AxisInterpolator::fit(&points, Dimensionality::Age, Sex::Both).unwrap();
        assert!((f.eval(10.0, 0.0) - 2.0).abs() < 1e-12);
        assert!((f.eval(20.0, 0.0) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn sparse_grid_reports_missing_vertex() {
        let points = vec![pt(1.0, 2000.0, 1.0), pt(2.0, 2000.0, 1.0), pt(1.0, 2001.0, 1.0)];
        let err = AxisInterpolator::fit(&points, Dimensionality::AgeTime, Sex::Male).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::IncompleteGrid {
                sex: Sex::Male,
                age: 2.0,
                time: 2001.0
            }
        );
    }

    #[test]
    fn subset_with_one_knot_is_degenerate() {
        let points = vec![pt(1.0, 2000.0, 1.0)];
        let err = AxisInterpolator::fit(&points, Dimensionality::Age, Sex::Female).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DegenerateAxis {
                sex: Sex::Female,
                axis: Axis::Age
            }
        );
    }
}
