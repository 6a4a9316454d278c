//! Command-line parsing for the covariate assigner.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! assignment engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::assign::DEFAULT_AGE_SCALE;
use crate::domain::{DistanceMetric, Strategy, Transform};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covassign", version, about = "Assign country covariate values to measurement rows")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assign covariate values and write the measurements with the new column(s).
    Assign(AssignArgs),
    /// Load the covariate, report its grid and fit, but assign nothing.
    Inspect(InspectArgs),
}

/// Covariate input and metadata flags shared by all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct CovariateArgs {
    /// Covariate CSV (`value`, `time_lower`/`time_upper` or `year_id`, optional ages and sex).
    #[arg(long, value_name = "CSV")]
    pub covariates: PathBuf,

    /// Short covariate name used in output column names.
    #[arg(long, default_value = "covariate")]
    pub name: String,

    /// The covariate varies by age group.
    #[arg(long)]
    pub by_age: bool,

    /// The covariate has separate female and male values.
    #[arg(long)]
    pub by_sex: bool,

    /// The covariate is a 0/1 indicator (recorded only; values are not checked).
    #[arg(long)]
    pub dichotomous: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct AssignArgs {
    #[command(flatten)]
    pub covariate: CovariateArgs,

    /// Measurement (bundle) CSV with `age_lower`, `age_upper`, time columns and sex.
    #[arg(long, value_name = "CSV")]
    pub measurements: PathBuf,

    /// Output CSV. Prints the summary only when omitted.
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Assignment strategy.
    #[arg(long, value_enum, default_value_t = Strategy::Interpolate)]
    pub strategy: Strategy,

    /// Transform(s) applied to the assigned column; one output column each.
    #[arg(long = "transform", value_enum, default_values_t = [Transform::Identity])]
    pub transforms: Vec<Transform>,

    /// Age scale for nearest-neighbour distances.
    #[arg(long, default_value_t = DEFAULT_AGE_SCALE)]
    pub age_scale: f64,

    /// Distance metric for nearest-neighbour lookup.
    #[arg(long, value_enum, default_value_t = DistanceMetric::Euclidean)]
    pub metric: DistanceMetric,

    /// Write a JSON run summary.
    #[arg(long, value_name = "JSON")]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub covariate: CovariateArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_defaults_to_interpolation_with_identity() {
        let cli = Cli::parse_from([
            "covassign",
            "assign",
            "--covariates",
            "cov.csv",
            "--measurements",
            "bundle.csv",
            "--by-age",
        ]);
        let Command::Assign(args) = cli.command else {
            panic!("expected assign");
        };
        assert_eq!(args.strategy, Strategy::Interpolate);
        assert_eq!(args.transforms, vec![Transform::Identity]);
        assert!(args.covariate.by_age);
        assert!(!args.covariate.by_sex);
        assert_eq!(args.age_scale, DEFAULT_AGE_SCALE);
    }

    #[test]
    fn repeated_transforms_are_collected() {
        let cli = Cli::parse_from([
            "covassign",
            "assign",
            "--covariates",
            "c.csv",
            "--measurements",
            "m.csv",
            "--strategy",
            "nearest",
            "--transform",
            "ln",
            "--transform",
            "scale1000",
        ]);
        let Command::Assign(args) = cli.command else {
            panic!("expected assign");
        };
        assert_eq!(args.strategy, Strategy::Nearest);
        assert_eq!(args.transforms, vec![Transform::Ln, Transform::Scale1000]);
    }
}
