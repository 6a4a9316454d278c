//! Run summary JSON.
//!
//! The schema is defined by `domain::RunSummary`.

use std::fs::File;
use std::path::Path;

use crate::domain::RunSummary;
use crate::error::AppError;

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::output(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
