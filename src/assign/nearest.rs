//! Nearest-neighbour assignment in (age, time, sex) space.
//!
//! Every covariate record becomes a point `(age * age_scale, time, sex_code)`.
//! A measurement takes the value of the closest point to its own midpoints.
//! This strategy never reports missing or extrapolated values.

use nalgebra::Point3;

use crate::data::CovariateDataset;
use crate::domain::{DistanceMetric, MeasurementRecord, Sex};
use crate::math::KdTree;

/// Positions of each sex on the third axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SexCodes {
    pub female: f64,
    pub male: f64,
    pub both: f64,
}

impl Default for SexCodes {
    /// `Both` sits half-way between `Female` and `Male`.
    fn default() -> Self {
        Self {
            female: -0.5,
            male: 0.5,
            both: 0.0,
        }
    }
}

impl SexCodes {
    pub fn code(&self, sex: Sex) -> f64 {
        match sex {
            Sex::Female => self.female,
            Sex::Male => self.male,
            Sex::Both => self.both,
        }
    }
}

/// Default age scale. With ages divided by 240, the closest age in the same
/// year is nearer than any age in the neighbouring year.
pub const DEFAULT_AGE_SCALE: f64 = 1.0 / 240.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestOptions {
    pub age_scale: f64,
    pub metric: DistanceMetric,
    pub sex_codes: SexCodes,
}

impl Default for NearestOptions {
    fn default() -> Self {
        Self {
            age_scale: DEFAULT_AGE_SCALE,
            metric: DistanceMetric::Euclidean,
            sex_codes: SexCodes::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NearestAssigner {
    tree: KdTree,
    values: Vec<f64>,
    by_age: bool,
    opts: NearestOptions,
}

impl NearestAssigner {
    pub fn build(dataset: &CovariateDataset, opts: NearestOptions) -> Self {
        let by_age = dataset.by_age();
        let records = dataset.records();
        let points = records
            .iter()
            .map(|r| encode(by_age, r.age_midpoint, r.time_midpoint, r.sex, &opts))
            .collect();
        let values = records.iter().map(|r| r.value).collect();

        Self {
            tree: KdTree::build(points, opts.metric),
            values,
            by_age,
            opts,
        }
    }

    /// Value of the nearest covariate point; `None` only for an empty index.
    pub fn eval(&self, m: &MeasurementRecord) -> Option<f64> {
        let q = encode(self.by_age, Some(m.age_midpoint()), m.time_midpoint(), m.sex, &self.opts);
        self.tree.nearest(&q).map(|idx| self.values[idx])
    }
}

fn encode(by_age: bool, age: Option<f64>, time: f64, sex: Sex, opts: &NearestOptions) -> Point3<f64> {
    // A covariate without ages puts every point at age 0, and so does the query.
    let age = if by_age { age.unwrap_or(0.0) * opts.age_scale } else { 0.0 };
    Point3::new(age, time, opts.sex_codes.code(sex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CovariateMeta, CovariateRecord};

    fn measurement(age: f64, year: f64, sex: Sex) -> MeasurementRecord {
        MeasurementRecord {
            age_lower: age,
            age_upper: age,
            time_lower: year,
            time_upper: year + 1.0,
            sex,
        }
    }

    fn dataset() -> CovariateDataset {
        let mut records = Vec::new();
        for year in [2000.0, 2001.0, 2002.0] {
            for age in [2.5, 12.5, 40.0, 80.0] {
                for (sex, offset) in [(Sex::Female, 0.0), (Sex::Male, 1000.0)] {
                    records.push(CovariateRecord::new(Some(age), year + 0.5, sex, year + age + offset));
                }
            }
        }
        let meta = CovariateMeta {
            by_age: true,
            by_sex: true,
            dichotomous: false,
        };
        CovariateDataset::new(records, meta).unwrap()
    }

    #[test]
    fn prefers_same_year_over_closer_age() {
        let nn = NearestAssigner::build(&dataset(), NearestOptions::default());
        // Age 75 in 2001: the 2001 age-80 female point wins over anything in 2000/2002.
        assert_eq!(nn.eval(&measurement(75.0, 2001.0, Sex::Female)), Some(2081.0));
        assert_eq!(nn.eval(&measurement(75.0, 2001.0, Sex::Male)), Some(3081.0));
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let nn = NearestAssigner::build(&dataset(), NearestOptions::default());
        let m = measurement(30.0, 2010.0, Sex::Both);
        let first = nn.eval(&m);
        for _ in 0..10 {
            assert_eq!(nn.eval(&m), first);
        }
    }

    #[test]
    fn both_sexes_tie_resolves_to_first_seen_record() {
        // Both is equidistant from female and male; the female record is listed first.
        let nn = NearestAssigner::build(&dataset(), NearestOptions::default());
        assert_eq!(nn.eval(&measurement(12.5, 2000.0, Sex::Both)), Some(2012.5));
    }

    #[test]
    fn non_age_specific_covariate_ignores_measurement_age() {
        let records = vec![
            CovariateRecord::new(None, 2000.5, Sex::Both, 1.0),
            CovariateRecord::new(None, 2005.5, Sex::Both, 2.0),
        ];
        let ds = CovariateDataset::new(records, CovariateMeta::default()).unwrap();
        let nn = NearestAssigner::build(&ds, NearestOptions::default());
        assert_eq!(nn.eval(&measurement(90.0, 2004.0, Sex::Female)), Some(2.0));
        assert_eq!(nn.eval(&measurement(0.0, 1950.0, Sex::Male)), Some(1.0));
    }
}
