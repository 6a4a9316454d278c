//! Formatted terminal output.
//!
//! Formatting lives in one place so the engine stays free of presentation.

use crate::domain::{AssignmentCounts, RunSummary, Strategy};
use crate::io::ingest::CovariateTable;

/// Format the run summary (inputs, grid shape, per-outcome counts, references).
pub fn format_run_summary(summary: &RunSummary, covariates: &CovariateTable) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== covassign - {} ===\n", summary.covariate));
    out.push_str(&format!(
        "Covariate rows: {} used / {} read ({} skipped)\n",
        covariates.records.len(),
        covariates.rows_read,
        covariates.row_errors.len()
    ));
    out.push_str(&format!("Measurement rows: {}\n", summary.measurement_rows));
    out.push_str(&format!(
        "Flags: by_age={} by_sex={} dichotomous={}\n",
        summary.meta.by_age, summary.meta.by_sex, summary.meta.dichotomous
    ));

    match summary.strategy {
        Strategy::Nearest => out.push_str("Strategy: nearest neighbour\n"),
        Strategy::Interpolate => {
            let dims = summary.dimensionality.map(|d| d.display_name()).unwrap_or("-");
            out.push_str(&format!("Strategy: interpolation grid ({dims})\n"));
        }
    }

    out.push_str("\nAssigned:\n");
    out.push_str(&format_counts(&summary.counts));

    if !summary.transforms.is_empty() {
        out.push_str("\nColumns:\n");
        for t in &summary.transforms {
            let reference = t.reference.map(|r| format!("{r:.6}")).unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "  {:<32} reference={reference:<14} missing={}\n",
                t.column, t.counts.missing
            ));
        }
    }

    out
}

fn format_counts(counts: &AssignmentCounts) -> String {
    let total = counts.total().max(1) as f64;
    let mut out = String::new();
    for (label, n) in [
        ("interpolated", counts.interpolated),
        ("extrapolated", counts.extrapolated),
        ("nearest", counts.nearest),
        ("missing", counts.missing),
    ] {
        if n > 0 {
            out.push_str(&format!("  {label:<13} {n:>8} ({:.1}%)\n", 100.0 * n as f64 / total));
        }
    }
    if out.is_empty() {
        out.push_str("  (no rows)\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_show_only_present_outcomes() {
        let counts = AssignmentCounts {
            interpolated: 3,
            missing: 1,
            ..AssignmentCounts::default()
        };
        let text = format_counts(&counts);
        assert!(text.contains("interpolated"));
        assert!(text.contains("(25.0%)"));
        assert!(!text.contains("nearest"));
    }
}
