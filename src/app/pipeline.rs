//! Shared "assign pipeline" logic.
//!
//! load covariates -> validate dataset -> build lookup -> assign rows ->
//! transform columns -> summarize
//!
//! Writing files is left to the caller.

use chrono::Utc;

use crate::assign::{AssignOptions, NearestOptions, SexResolver, assign_with_dimensionality};
use crate::data::CovariateDataset;
use crate::domain::{AssignConfig, Assignment, AssignmentCounts, CovariateMeta, RunSummary, TransformSummary};
use crate::error::AppError;
use crate::io::export::OutputColumn;
use crate::io::ingest::{CovariateTable, MeasurementTable, load_covariates, load_measurements};
use crate::models::{column_name, reference_value, transform_column};

/// All computed outputs of a single `covassign assign` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub covariates: CovariateTable,
    pub measurements: MeasurementTable,
    pub raw: Vec<Assignment>,
    pub columns: Vec<OutputColumn>,
    pub summary: RunSummary,
}

/// Load both tables and run the assignment.
pub fn run_assign(config: &AssignConfig) -> Result<RunOutput, AppError> {
    let covariates = load_covariates(&config.covariates_path)?;
    let measurements = load_measurements(&config.measurements_path)?;
    run_assign_with_tables(config, covariates, measurements)
}

/// Run the assignment on already-loaded tables.
pub fn run_assign_with_tables(
    config: &AssignConfig,
    covariates: CovariateTable,
    measurements: MeasurementTable,
) -> Result<RunOutput, AppError> {
    if !(config.age_scale.is_finite() && config.age_scale > 0.0) {
        return Err(AppError::input(format!("Invalid age scale {} (must be finite and > 0).", config.age_scale)));
    }

    let dataset = CovariateDataset::new(covariates.records.clone(), config.meta)?;
    let opts = AssignOptions {
        nearest: NearestOptions {
            age_scale: config.age_scale,
            metric: config.metric,
            ..NearestOptions::default()
        },
    };

    let (raw, dimensionality) = assign_with_dimensionality(&dataset, &measurements.records, config.strategy, &opts)?;
    let counts = AssignmentCounts::tally(&raw);

    let mut columns = Vec::with_capacity(config.transforms.len());
    let mut transforms = Vec::with_capacity(config.transforms.len());
    for &transform in &config.transforms {
        let name = column_name(&config.name, transform);
        let values = transform_column(transform, &raw);
        transforms.push(TransformSummary {
            transform,
            column: name.clone(),
            reference: reference_value(transform, dataset.records().iter().map(|r| r.value)),
            counts: AssignmentCounts::tally(&values),
        });
        columns.push(OutputColumn { name, values });
    }

    let summary = RunSummary {
        tool: "covassign".to_string(),
        generated_at: Utc::now(),
        covariate: config.name.clone(),
        strategy: config.strategy,
        meta: config.meta,
        dimensionality,
        covariate_rows: dataset.len(),
        measurement_rows: measurements.records.len(),
        counts,
        transforms,
    };

    Ok(RunOutput {
        covariates,
        measurements,
        raw,
        columns,
        summary,
    })
}

/// Load a covariate and build its interpolators without assigning anything.
pub fn inspect_covariate(
    covariates: &CovariateTable,
    meta: CovariateMeta,
) -> Result<(CovariateDataset, SexResolver), AppError> {
    let dataset = CovariateDataset::new(covariates.records.clone(), meta)?;
    let resolver = SexResolver::build(&dataset)?;
    Ok((dataset, resolver))
}
