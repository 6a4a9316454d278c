//! Shared domain types.
//!
//! These types are kept small and plain so they can be:
//!
//! - built by the CSV loader or directly by library callers
//! - shared read-only across worker threads during assignment
//! - exported to JSON alongside the assigned column

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sex category of a covariate record or a measurement row.
///
/// Covariate records are only ever `Female` or `Male` for a by-sex covariate;
/// measurements may also ask for `Both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
    Both,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Female, Sex::Male, Sex::Both];
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sex::Female => "female",
            Sex::Male => "male",
            Sex::Both => "both",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Sex {
    type Err = String;

    /// Accepts names (`female`), initials (`f`) and GBD sex ids (`1` male,
    /// `2` female, `3` both).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" | "2" => Ok(Sex::Female),
            "male" | "m" | "1" => Ok(Sex::Male),
            "both" | "b" | "3" => Ok(Sex::Both),
            other => Err(format!("Unrecognized sex '{other}' (expected female/male/both or sex_id 1/2/3).")),
        }
    }
}

/// A half-open age bucket `[lower, upper)` in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBucket {
    pub lower: f64,
    pub upper: f64,
}

impl AgeBucket {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

/// One normalized covariate observation.
#[derive(Debug, Clone, PartialEq)]
pub struct CovariateRecord {
    /// `None` when the covariate is not age-specific.
    pub age_midpoint: Option<f64>,
    pub time_midpoint: f64,
    pub sex: Sex,
    pub value: f64,
    /// The age bucket this record was reported for, when the source had one.
    pub age_bucket: Option<AgeBucket>,
}

impl CovariateRecord {
    pub fn new(age_midpoint: Option<f64>, time_midpoint: f64, sex: Sex, value: f64) -> Self {
        Self {
            age_midpoint,
            time_midpoint,
            sex,
            value,
            age_bucket: None,
        }
    }

    /// Build a record from interval bounds, taking midpoints of both axes.
    pub fn from_bounds(age: Option<AgeBucket>, time_lower: f64, time_upper: f64, sex: Sex, value: f64) -> Self {
        Self {
            age_midpoint: age.map(|a| a.midpoint()),
            time_midpoint: 0.5 * (time_lower + time_upper),
            sex,
            value,
            age_bucket: age,
        }
    }
}

/// One row of bundle data that needs a covariate value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRecord {
    pub age_lower: f64,
    pub age_upper: f64,
    pub time_lower: f64,
    pub time_upper: f64,
    pub sex: Sex,
}

impl MeasurementRecord {
    pub fn age_midpoint(&self) -> f64 {
        0.5 * (self.age_lower + self.age_upper)
    }

    pub fn time_midpoint(&self) -> f64 {
        0.5 * (self.time_lower + self.time_upper)
    }
}

/// Covariate metadata supplied by the caller. Never inferred from values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CovariateMeta {
    pub by_age: bool,
    pub by_sex: bool,
    /// Recorded only. The upstream flag is unreliable, so values are not checked.
    pub dichotomous: bool,
}

/// How covariate values are assigned to measurement rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Nearest covariate point in (age, time, sex) space.
    Nearest,
    /// Per-sex linear interpolation over the (age, time) grid.
    Interpolate,
}

/// Distance used by the nearest-neighbour strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
}

/// Which axes the interpolation-grid strategy fits over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimensionality {
    Age,
    Time,
    AgeTime,
}

impl Dimensionality {
    pub fn display_name(self) -> &'static str {
        match self {
            Dimensionality::Age => "1-D over age",
            Dimensionality::Time => "1-D over time",
            Dimensionality::AgeTime => "2-D over age x time",
        }
    }
}

/// Transformation applied to an assigned covariate column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Identity,
    Ln,
    Logit,
    Squared,
    Sqrt,
    Scale1000,
}

impl Transform {
    pub fn name(self) -> &'static str {
        match self {
            Transform::Identity => "identity",
            Transform::Ln => "ln",
            Transform::Logit => "logit",
            Transform::Squared => "squared",
            Transform::Sqrt => "sqrt",
            Transform::Scale1000 => "scale1000",
        }
    }
}

/// The value assigned to one measurement row.
///
/// Missing is a tag, never a numeric sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment {
    /// Evaluated inside the covariate's grid extent.
    Interpolated(f64),
    /// Evaluated past the time extent by linear continuation.
    Extrapolated(f64),
    /// Copied from the nearest covariate point.
    Nearest(f64),
    /// The row's ages are not covered by the covariate.
    Missing,
}

impl Assignment {
    pub fn value(&self) -> Option<f64> {
        match *self {
            Assignment::Interpolated(v) | Assignment::Extrapolated(v) | Assignment::Nearest(v) => Some(v),
            Assignment::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Assignment::Missing)
    }

    /// Apply `f` to the carried value, keeping the tag.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Assignment::Interpolated(v) => Assignment::Interpolated(f(v)),
            Assignment::Extrapolated(v) => Assignment::Extrapolated(f(v)),
            Assignment::Nearest(v) => Assignment::Nearest(f(v)),
            Assignment::Missing => Assignment::Missing,
        }
    }
}

/// Per-outcome row counts for one assigned column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentCounts {
    pub interpolated: usize,
    pub extrapolated: usize,
    pub nearest: usize,
    pub missing: usize,
}

impl AssignmentCounts {
    pub fn tally(assignments: &[Assignment]) -> Self {
        let mut counts = Self::default();
        for a in assignments {
            match a {
                Assignment::Interpolated(_) => counts.interpolated += 1,
                Assignment::Extrapolated(_) => counts.extrapolated += 1,
                Assignment::Nearest(_) => counts.nearest += 1,
                Assignment::Missing => counts.missing += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.interpolated + self.extrapolated + self.nearest + self.missing
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AssignConfig {
    pub covariates_path: PathBuf,
    pub measurements_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,

    pub name: String,
    pub meta: CovariateMeta,
    pub strategy: Strategy,
    pub transforms: Vec<Transform>,

    /// Scale applied to ages before nearest-neighbour distances.
    pub age_scale: f64,
    pub metric: DistanceMetric,
}

/// Reference value and output column for one transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSummary {
    pub transform: Transform,
    pub column: String,
    /// Mean of the transformed covariate values; `None` if none are finite.
    pub reference: Option<f64>,
    pub counts: AssignmentCounts,
}

/// Saved run summary (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub covariate: String,
    pub strategy: Strategy,
    pub meta: CovariateMeta,
    /// Only set for the interpolation strategy.
    pub dimensionality: Option<Dimensionality>,
    pub covariate_rows: usize,
    pub measurement_rows: usize,
    pub counts: AssignmentCounts,
    pub transforms: Vec<TransformSummary>,
}
