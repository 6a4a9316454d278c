//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the covariate and measurement tables
//! - runs the assignment and column transforms
//! - prints the report
//! - writes optional outputs

use clap::Parser;

use crate::cli::{AssignArgs, Command, InspectArgs};
use crate::domain::{AssignConfig, CovariateMeta};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `covassign` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Assign(args) => handle_assign(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn handle_assign(args: AssignArgs) -> Result<(), AppError> {
    let config = assign_config_from_args(&args);
    let run = pipeline::run_assign(&config)?;

    println!("{}", crate::report::format_run_summary(&run.summary, &run.covariates));

    if let Some(path) = &config.output_path {
        crate::io::export::write_assigned_csv(path, &run.measurements, &run.columns)?;
        log::info!("wrote {}", path.display());
    }
    if let Some(path) = &config.summary_path {
        crate::io::summary::write_summary_json(path, &run.summary)?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let meta = meta_from_args(&args.covariate);
    let covariates = crate::io::ingest::load_covariates(&args.covariate.covariates)?;
    let (dataset, resolver) = pipeline::inspect_covariate(&covariates, meta)?;
    let grid = dataset.grid();

    println!("=== covassign inspect - {} ===", args.covariate.name);
    println!(
        "Covariate rows: {} used / {} read ({} skipped)",
        dataset.len(),
        covariates.rows_read,
        covariates.row_errors.len()
    );
    match grid.age_extent() {
        Some((lo, hi)) => println!("Ages: {} midpoint(s) in [{lo}, {hi}]", grid.n_ages()),
        None => println!("Ages: not by age"),
    }
    let (t_lo, t_hi) = grid.time_extent();
    println!("Times: {} midpoint(s) in [{t_lo}, {t_hi}]", grid.n_times());
    if grid.by_age && grid.age_coverage.is_unknown() {
        println!("  age coverage unknown (one midpoint, no bucket bounds)");
    }
    for bucket in grid.age_coverage.intervals() {
        println!("  age coverage [{}, {})", bucket.lower, bucket.upper);
    }
    println!("Interpolation: {}", resolver.dimensionality().display_name());
    Ok(())
}

fn meta_from_args(args: &crate::cli::CovariateArgs) -> CovariateMeta {
    CovariateMeta {
        by_age: args.by_age,
        by_sex: args.by_sex,
        dichotomous: args.dichotomous,
    }
}

pub fn assign_config_from_args(args: &AssignArgs) -> AssignConfig {
    AssignConfig {
        covariates_path: args.covariate.covariates.clone(),
        measurements_path: args.measurements.clone(),
        output_path: args.output.clone(),
        summary_path: args.summary.clone(),
        name: args.covariate.name.clone(),
        meta: meta_from_args(&args.covariate),
        strategy: args.strategy,
        transforms: args.transforms.clone(),
        age_scale: args.age_scale,
        metric: args.metric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{Strategy, Transform};

    #[test]
    fn assign_args_map_onto_config() {
        let cli = Cli::parse_from([
            "covassign",
            "assign",
            "--covariates",
            "ldi.csv",
            "--name",
            "ldi",
            "--by-sex",
            "--measurements",
            "bundle.csv",
            "-o",
            "out.csv",
            "--transform",
            "ln",
        ]);
        let Command::Assign(args) = cli.command else {
            panic!("expected assign");
        };
        let config = assign_config_from_args(&args);
        assert_eq!(config.name, "ldi");
        assert!(config.meta.by_sex);
        assert!(!config.meta.by_age);
        assert_eq!(config.strategy, Strategy::Interpolate);
        assert_eq!(config.transforms, vec![Transform::Ln]);
        assert_eq!(config.output_path.as_deref(), Some(std::path::Path::new("out.csv")));
        assert!(config.summary_path.is_none());
    }
}
