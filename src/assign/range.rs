//! Per-row boundary policy for the interpolation-grid strategy.
//!
//! Age and time are treated differently:
//!
//! - age: a row whose ages do not touch any covered age bucket is missing.
//!   Ages inside an edge bucket but past the outermost midpoint take the edge
//!   midpoint, so the interpolant is never extended along age. A covariate
//!   with a single age midpoint and no bucket bounds cannot miss on age.
//! - time: there is no missing policy. A time midpoint outside the grid extent
//!   is evaluated by linear continuation and tagged as extrapolated.

use crate::data::GridDescriptor;
use crate::domain::MeasurementRecord;

/// What to do with one measurement row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowClass {
    Evaluate { age: f64, time: f64 },
    Extrapolate { age: f64, time: f64 },
    Missing,
}

#[derive(Debug, Clone, Copy)]
pub struct RangeClassifier<'a> {
    grid: &'a GridDescriptor,
}

impl<'a> RangeClassifier<'a> {
    pub fn new(grid: &'a GridDescriptor) -> Self {
        Self { grid }
    }

    pub fn classify(&self, m: &MeasurementRecord) -> RowClass {
        let age = match self.grid.age_extent() {
            // Not age-specific: the fit ignores age.
            None => m.age_midpoint(),
            // One age midpoint of unknown width: age does not apply.
            Some((lo, hi)) if self.grid.age_coverage.is_unknown() => m.age_midpoint().clamp(lo, hi),
            Some((lo, hi)) => {
                if !self.grid.age_coverage.overlaps(m.age_lower, m.age_upper) {
                    return RowClass::Missing;
                }
                m.age_midpoint().clamp(lo, hi)
            }
        };

        let time = m.time_midpoint();
        let (t_lo, t_hi) = self.grid.time_extent();
        if time < t_lo || time > t_hi {
            RowClass::Extrapolate { age, time }
        } else {
            RowClass::Evaluate { age, time }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AgeCoverage;
    use crate::domain::Sex;

    fn grid() -> GridDescriptor {
        let ages = vec![2.5, 7.5, 12.5, 17.5];
        GridDescriptor {
            age_coverage: AgeCoverage::from_midpoints(&ages),
            ages,
            times: vec![1990.5, 2000.5, 2010.5],
            by_age: true,
            by_sex: false,
        }
    }

    fn row(age_lower: f64, age_upper: f64, time_lower: f64, time_upper: f64) -> MeasurementRecord {
        MeasurementRecord {
            age_lower,
            age_upper,
            time_lower,
            time_upper,
            sex: Sex::Both,
        }
    }

    #[test]
    fn ages_outside_coverage_are_missing_regardless_of_time() {
        let g = grid();
        let c = RangeClassifier::new(&g);
        assert_eq!(c.classify(&row(40.0, 45.0, 2000.0, 2001.0)), RowClass::Missing);
        assert_eq!(c.classify(&row(40.0, 45.0, 2030.0, 2031.0)), RowClass::Missing);
    }

    #[test]
    fn late_years_are_extrapolated_not_missing() {
        let g = grid();
        let c = RangeClassifier::new(&g);
        assert_eq!(
            c.classify(&row(5.0, 10.0, 2015.0, 2016.0)),
            RowClass::Extrapolate { age: 7.5, time: 2015.5 }
        );
    }

    #[test]
    fn edge_bucket_ages_are_held_at_the_outer_midpoint() {
        let g = grid();
        let c = RangeClassifier::new(&g);
        assert_eq!(
            c.classify(&row(18.0, 25.0, 2000.0, 2001.0)),
            RowClass::Evaluate { age: 17.5, time: 2000.5 }
        );
        assert_eq!(
            c.classify(&row(0.0, 1.0, 1990.0, 1991.0)),
            RowClass::Evaluate { age: 2.5, time: 1990.5 }
        );
    }

    #[test]
    fn non_age_specific_covariate_never_misses_on_age() {
        let g = GridDescriptor {
            ages: Vec::new(),
            times: vec![2000.5, 2001.5],
            by_age: false,
            by_sex: false,
            age_coverage: AgeCoverage::default(),
        };
        let c = RangeClassifier::new(&g);
        assert_eq!(
            c.classify(&row(80.0, 100.0, 2001.0, 2001.0)),
            RowClass::Evaluate { age: 90.0, time: 2001.0 }
        );
    }

    #[test]
    fn single_unbounded_age_midpoint_never_misses() {
        let g = GridDescriptor {
            ages: vec![50.0],
            times: vec![2000.5, 2001.5],
            by_age: true,
            by_sex: false,
            age_coverage: AgeCoverage::from_midpoints(&[50.0]),
        };
        let c = RangeClassifier::new(&g);
        assert_eq!(
            c.classify(&row(10.0, 15.0, 2000.0, 2001.0)),
            RowClass::Evaluate { age: 50.0, time: 2000.5 }
        );
    }
}
