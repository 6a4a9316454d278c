//! Top-level assignment: build once, evaluate every row.
//!
//! The lookup structure (kd-tree or per-sex interpolators) is built before
//! any row is evaluated and is read-only afterwards, so rows are evaluated in
//! parallel. The output column is aligned by position with the input rows.

use log::info;
use rayon::prelude::*;

use crate::assign::nearest::{NearestAssigner, NearestOptions};
use crate::assign::range::{RangeClassifier, RowClass};
use crate::assign::sex::SexResolver;
use crate::data::CovariateDataset;
use crate::domain::{Assignment, AssignmentCounts, Dimensionality, MeasurementRecord, Strategy};
use crate::error::ConfigurationError;

/// Engine options that are not covariate metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssignOptions {
    pub nearest: NearestOptions,
}

#[derive(Debug, Clone)]
enum Engine<'a> {
    Nearest(NearestAssigner),
    Grid {
        resolver: SexResolver,
        classifier: RangeClassifier<'a>,
    },
}

/// A built lookup structure for one covariate.
#[derive(Debug, Clone)]
pub struct Assigner<'a> {
    engine: Engine<'a>,
}

impl<'a> Assigner<'a> {
    pub fn build(
        dataset: &'a CovariateDataset,
        strategy: Strategy,
        opts: &AssignOptions,
    ) -> Result<Self, ConfigurationError> {
        let engine = match strategy {
            Strategy::Nearest => Engine::Nearest(NearestAssigner::build(dataset, opts.nearest)),
            Strategy::Interpolate => Engine::Grid {
                resolver: SexResolver::build(dataset)?,
                classifier: RangeClassifier::new(dataset.grid()),
            },
        };
        Ok(Self { engine })
    }

    /// Axes of the fitted interpolant; `None` for the nearest strategy.
    pub fn dimensionality(&self) -> Option<Dimensionality> {
        match &self.engine {
            Engine::Nearest(_) => None,
            Engine::Grid { resolver, .. } => Some(resolver.dimensionality()),
        }
    }

    pub fn assign_row(&self, m: &MeasurementRecord) -> Assignment {
        match &self.engine {
            Engine::Nearest(nn) => nn.eval(m).map_or(Assignment::Missing, Assignment::Nearest),
            Engine::Grid { resolver, classifier } => match classifier.classify(m) {
                RowClass::Missing => Assignment::Missing,
                RowClass::Evaluate { age, time } => Assignment::Interpolated(resolver.eval(m.sex, age, time)),
                RowClass::Extrapolate { age, time } => Assignment::Extrapolated(resolver.eval(m.sex, age, time)),
            },
        }
    }

    /// Evaluate every row in parallel and log the per-outcome counts.
    pub fn assign_all(&self, measurements: &[MeasurementRecord]) -> Vec<Assignment> {
        let column: Vec<Assignment> = measurements.par_iter().map(|m| self.assign_row(m)).collect();

        let counts = AssignmentCounts::tally(&column);
        info!(
            "assigned {} row(s): {} interpolated, {} extrapolated, {} nearest, {} missing",
            counts.total(),
            counts.interpolated,
            counts.extrapolated,
            counts.nearest,
            counts.missing
        );
        column
    }
}

/// Assign one covariate value (or missing) to every measurement row.
pub fn assign(
    dataset: &CovariateDataset,
    measurements: &[MeasurementRecord],
    strategy: Strategy,
    opts: &AssignOptions,
) -> Result<Vec<Assignment>, ConfigurationError> {
    assign_with_dimensionality(dataset, measurements, strategy, opts).map(|(column, _)| column)
}

/// Like [`assign`], also returning the interpolant's axes (`None` for nearest).
pub fn assign_with_dimensionality(
    dataset: &CovariateDataset,
    measurements: &[MeasurementRecord],
    strategy: Strategy,
    opts: &AssignOptions,
) -> Result<(Vec<Assignment>, Option<Dimensionality>), ConfigurationError> {
    let assigner = Assigner::build(dataset, strategy, opts)?;
    Ok((assigner.assign_all(measurements), assigner.dimensionality()))
}
