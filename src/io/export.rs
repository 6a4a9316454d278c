//! Export the measurement table with the assigned covariate columns appended.
//!
//! Input rows are written back unchanged and in order. Missing values are
//! empty cells, so they can never be confused with a real zero.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Assignment;
use crate::error::AppError;
use crate::io::ingest::MeasurementTable;

/// One appended output column.
#[derive(Debug, Clone)]
pub struct OutputColumn {
    pub name: String,
    pub values: Vec<Assignment>,
}

pub fn write_assigned_csv(path: &Path, table: &MeasurementTable, columns: &[OutputColumn]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create output CSV '{}': {e}", path.display())))?;
    write_assigned(file, table, columns)
}

pub fn write_assigned<W: Write>(output: W, table: &MeasurementTable, columns: &[OutputColumn]) -> Result<(), AppError> {
    if let Some(c) = columns.iter().find(|c| c.values.len() != table.rows.len()) {
        return Err(AppError::output(format!(
            "Column `{}` has {} values for {} measurement rows.",
            c.name,
            c.values.len(),
            table.rows.len()
        )));
    }

    let mut writer = csv::Writer::from_writer(output);

    let mut header: Vec<&str> = table.headers.iter().collect();
    header.extend(columns.iter().map(|c| c.name.as_str()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::output(format!("Failed to write output CSV header: {e}")))?;

    for (i, row) in table.rows.iter().enumerate() {
        let mut fields: Vec<String> = row.iter().map(str::to_string).collect();
        fields.extend(columns.iter().map(|c| format_cell(c.values[i])));
        writer
            .write_record(&fields)
            .map_err(|e| AppError::output(format!("Failed to write output CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush output CSV: {e}")))?;
    Ok(())
}

fn format_cell(a: Assignment) -> String {
    a.value().map(|v| v.to_string()).unwrap_or_default()
}
