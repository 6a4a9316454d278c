//! CSV ingest and normalization.
//!
//! This module turns the covariate and measurement CSVs into the records the
//! engine consumes. No assignment logic lives here.
//!
//! - Covariate rows that fail to parse are skipped and reported as row errors.
//! - Measurement rows must all parse and match the header width: every input
//!   row is re-emitted with appended columns, so a bad or ragged measurement
//!   row rejects the whole file.
//! - A `year_id` column is read as the interval `[year, year + 1)`.
//! - Sex is read from `sex` or `sex_id`; a table without either is both sexes.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::warn;

use crate::domain::{AgeBucket, CovariateRecord, MeasurementRecord, Sex};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed covariate table.
#[derive(Debug, Clone)]
pub struct CovariateTable {
    pub records: Vec<CovariateRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Parsed measurement table. Raw rows are kept so the export can re-emit them.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    pub records: Vec<MeasurementRecord>,
}

pub fn load_covariates(path: &Path) -> Result<CovariateTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open covariate CSV '{}': {e}", path.display())))?;
    read_covariates(file)
}

pub fn load_measurements(path: &Path) -> Result<MeasurementTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open measurement CSV '{}': {e}", path.display())))?;
    read_measurements(file)
}

pub fn read_covariates<R: Read>(input: R) -> Result<CovariateTable, AppError> {
    let mut reader = csv_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read covariate CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key("value") && !header_map.contains_key("mean_value") {
        return Err(AppError::input("Missing required covariate column: `value` (or `mean_value`)"));
    }
    ensure_time_columns(&header_map, "covariate")?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header line, then 1-based lines.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_covariate_row(&record, &header_map));
        match parsed {
            Ok(r) => records.push(r),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(
            "skipped {} of {} covariate row(s); first error on line {}: {}",
            row_errors.len(),
            rows_read,
            row_errors[0].line,
            row_errors[0].message
        );
    }
    if records.is_empty() {
        return Err(AppError::input("No valid covariate rows."));
    }

    Ok(CovariateTable {
        records,
        row_errors,
        rows_read,
    })
}

pub fn read_measurements<R: Read>(input: R) -> Result<MeasurementTable, AppError> {
    let mut reader = csv_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read measurement CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in ["age_lower", "age_upper"] {
        if !header_map.contains_key(name) {
            return Err(AppError::input(format!("Missing required measurement column: `{name}`")));
        }
    }
    ensure_time_columns(&header_map, "measurement")?;

    let mut rows = Vec::new();
    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let row = result.map_err(|e| AppError::input(format!("Measurement CSV line {line}: {e}")))?;
        if row.len() != headers.len() {
            return Err(AppError::input(format!(
                "Measurement CSV line {line}: {} field(s), header has {}.",
                row.len(),
                headers.len()
            )));
        }
        let record = parse_measurement_row(&row, &header_map)
            .map_err(|e| AppError::input(format!("Measurement CSV line {line}: {e}")))?;
        rows.push(row);
        records.push(record);
    }

    Ok(MeasurementTable { headers, rows, records })
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_time_columns(header_map: &HashMap<String, usize>, table: &str) -> Result<(), AppError> {
    let bounds = header_map.contains_key("time_lower") && header_map.contains_key("time_upper");
    if bounds || header_map.contains_key("year_id") {
        Ok(())
    } else {
        Err(AppError::input(format!(
            "Missing {table} time columns: need `time_lower` + `time_upper`, or `year_id`."
        )))
    }
}

fn parse_covariate_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<CovariateRecord, String> {
    let value = match get_optional(record, header_map, "value") {
        Some(s) => parse_f64(s, "value")?,
        None => parse_f64(get_required(record, header_map, "mean_value")?, "mean_value")?,
    };
    let (time_lower, time_upper) = parse_time(record, header_map)?;
    let sex = parse_sex(record, header_map)?;

    let age_lower = get_optional(record, header_map, "age_lower");
    let age_upper = get_optional(record, header_map, "age_upper");
    let age = match (age_lower, age_upper) {
        (Some(lo), Some(hi)) => {
            let bucket = AgeBucket::new(parse_f64(lo, "age_lower")?, parse_f64(hi, "age_upper")?);
            if bucket.lower > bucket.upper {
                return Err("`age_lower` is greater than `age_upper`.".to_string());
            }
            Some(bucket)
        }
        (None, None) => None,
        _ => return Err("Only one of `age_lower` / `age_upper` is set.".to_string()),
    };

    Ok(CovariateRecord::from_bounds(age, time_lower, time_upper, sex, value))
}

fn parse_measurement_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<MeasurementRecord, String> {
    let age_lower = parse_f64(get_required(record, header_map, "age_lower")?, "age_lower")?;
    let age_upper = parse_f64(get_required(record, header_map, "age_upper")?, "age_upper")?;
    if age_lower > age_upper {
        return Err("`age_lower` is greater than `age_upper`.".to_string());
    }
    let (time_lower, time_upper) = parse_time(record, header_map)?;
    let sex = parse_sex(record, header_map)?;

    Ok(MeasurementRecord {
        age_lower,
        age_upper,
        time_lower,
        time_upper,
        sex,
    })
}

fn parse_time(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<(f64, f64), String> {
    if let (Some(lo), Some(hi)) = (
        get_optional(record, header_map, "time_lower"),
        get_optional(record, header_map, "time_upper"),
    ) {
        let lo = parse_f64(lo, "time_lower")?;
        let hi = parse_f64(hi, "time_upper")?;
        if lo > hi {
            return Err("`time_lower` is greater than `time_upper`.".to_string());
        }
        return Ok((lo, hi));
    }
    let year = parse_f64(get_required(record, header_map, "year_id")?, "year_id")?;
    Ok((year, year + 1.0))
}

fn parse_sex(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Sex, String> {
    match get_optional(record, header_map, "sex").or_else(|| get_optional(record, header_map, "sex_id")) {
        Some(s) => s.parse(),
        None if header_map.contains_key("sex") || header_map.contains_key("sex_id") => {
            Err("Missing required value: `sex`".to_string())
        }
        None => Ok(Sex::Both),
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number '{s}' in `{name}`.")),
    }
}
