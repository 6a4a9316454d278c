//! How many interpolators a covariate needs, and how `Both` is answered.
//!
//! A by-sex covariate gets independent female and male fits. A `Both` query
//! evaluates each of them at the query point and averages the two results;
//! raw values are never pooled before fitting, so the two sexes keep their
//! own edge trends when extrapolating.

use log::info;

use crate::assign::interpolator::{AxisInterpolator, select_dimensionality};
use crate::data::{CovariateDataset, GridPoint};
use crate::domain::{Dimensionality, Sex};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq)]
pub enum SexResolver {
    /// One fit over all records, used for every sex.
    Shared(AxisInterpolator),
    BySex {
        female: AxisInterpolator,
        male: AxisInterpolator,
    },
}

impl SexResolver {
    pub fn build(dataset: &CovariateDataset) -> Result<Self, ConfigurationError> {
        let dims = select_dimensionality(dataset.grid())?;

        if !dataset.by_sex() {
            let points: Vec<GridPoint> = dataset.values_for(Sex::Both).collect();
            let shared = AxisInterpolator::fit(&points, dims, Sex::Both)?;
            info!("interpolating {} with one shared fit", dims.display_name());
            return Ok(SexResolver::Shared(shared));
        }

        let female_points: Vec<GridPoint> = dataset.values_for(Sex::Female).collect();
        let male_points: Vec<GridPoint> = dataset.values_for(Sex::Male).collect();
        if female_points.len() != male_points.len() {
            info!(
                "female and male covariate grids differ in size ({} vs {} points)",
                female_points.len(),
                male_points.len()
            );
        }

        let female = AxisInterpolator::fit(&female_points, dims, Sex::Female)?;
        let male = AxisInterpolator::fit(&male_points, dims, Sex::Male)?;
        info!("interpolating {} with separate female and male fits", dims.display_name());
        Ok(SexResolver::BySex { female, male })
    }

    pub fn dimensionality(&self) -> Dimensionality {
        match self {
            SexResolver::Shared(f) => f.dimensionality(),
            SexResolver::BySex { female, .. } => female.dimensionality(),
        }
    }

    pub fn eval(&self, sex: Sex, age: f64, time: f64) -> f64 {
        match self {
            SexResolver::Shared(f) => f.eval(age, time),
            SexResolver::BySex { female, male } => match sex {
                Sex::Female => female.eval(age, time),
                Sex::Male => male.eval(age, time),
                Sex::Both => 0.5 * (female.eval(age, time) + male.eval(age, time)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CovariateMeta, CovariateRecord};

    fn by_age_sex() -> CovariateMeta {
        CovariateMeta {
            by_age: true,
            by_sex: true,
            dichotomous: false,
        }
    }

    #[test]
    fn both_sexes_average_the_two_evaluations() {
        let records = vec![
            CovariateRecord::new(Some(10.0), 2000.0, Sex::Female, 1.0),
            CovariateRecord::new(Some(30.0), 2000.0, Sex::Female, 3.0),
            CovariateRecord::new(Some(10.0), 2000.0, Sex::Male, 2.0),
            CovariateRecord::new(Some(30.0), 2000.0, Sex::Male, 4.0),
        ];
        let ds = CovariateDataset::new(records, by_age_sex()).unwrap();
        let resolver = SexResolver::build(&ds).unwrap();

        assert_eq!(resolver.dimensionality(), Dimensionality::Age);
        assert!((resolver.eval(Sex::Both, 10.0, 2000.0) - 1.5).abs() < 1e-12);
        assert!((resolver.eval(Sex::Female, 20.0, 2000.0) - 2.0).abs() < 1e-12);
        assert!((resolver.eval(Sex::Male, 20.0, 2000.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn both_sexes_extrapolate_each_sex_before_averaging() {
        // Female grid covers 2000..2010, male only 2000..2005. Each sex keeps its own slope.
        let records = vec![
            CovariateRecord::new(None, 2000.0, Sex::Female, 0.0),
            CovariateRecord::new(None, 2010.0, Sex::Female, 10.0),
            CovariateRecord::new(None, 2000.0, Sex::Male, 0.0),
            CovariateRecord::new(None, 2005.0, Sex::Male, 10.0),
        ];
        let meta = CovariateMeta {
            by_sex: true,
            ..CovariateMeta::default()
        };
        let ds = CovariateDataset::new(records, meta).unwrap();
        let resolver = SexResolver::build(&ds).unwrap();
        // female(2020) = 20, male(2020) = 40
        assert!((resolver.eval(Sex::Both, 0.0, 2020.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn pooled_covariate_shares_one_fit() {
        let records = vec![
            CovariateRecord::new(None, 2000.0, Sex::Both, 1.0),
            CovariateRecord::new(None, 2002.0, Sex::Both, 3.0),
        ];
        let ds = CovariateDataset::new(records, CovariateMeta::default()).unwrap();
        let resolver = SexResolver::build(&ds).unwrap();
        assert!(matches!(resolver, SexResolver::Shared(_)));
        for sex in Sex::ALL {
            assert!((resolver.eval(sex, 0.0, 2001.0) - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn asymmetric_sex_grid_fails_for_the_degenerate_sex() {
        let records = vec![
            CovariateRecord::new(Some(10.0), 2000.0, Sex::Female, 1.0),
            CovariateRecord::new(Some(30.0), 2000.0, Sex::Female, 3.0),
            CovariateRecord::new(Some(10.0), 2000.0, Sex::Male, 2.0),
        ];
        let ds = CovariateDataset::new(records, by_age_sex()).unwrap();
        let err = SexResolver::build(&ds).unwrap_err();
        assert!(matches!(err, ConfigurationError::DegenerateAxis { sex: Sex::Male, .. }));
    }
}
