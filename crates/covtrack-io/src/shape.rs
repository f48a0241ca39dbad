//! Turn the cached CSV into a validated [`Dataset`].

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use covtrack_core::{
    ColumnSet, CovError, CovResult, DataOrigin, Dataset, Metric, Record, REQUIRED_COLUMNS,
};
use polars::prelude::*;
use tracing::debug;

/// Read a CSV file with polars and convert it into records.
pub fn read_dataset(path: &Path, origin: DataOrigin) -> CovResult<Dataset> {
    let df = read_csv_frame(path)?;
    frame_to_dataset(&df, origin)
}

/// Load the raw frame. Schema inference scans the whole file because sparse
/// columns (vaccinations) are empty for the first few thousand rows.
pub fn read_csv_frame(path: &Path) -> CovResult<DataFrame> {
    let file = File::open(path)?;
    CsvReader::new(file)
        .has_header(true)
        .infer_schema(None)
        .finish()
        .map_err(|err| CovError::Parse(format!("reading {}: {err}", path.display())))
}

/// Columns from [`REQUIRED_COLUMNS`] that `df` lacks.
pub fn missing_required_columns(df: &DataFrame) -> Vec<String> {
    let names: HashSet<&str> = df.get_column_names().into_iter().collect();
    REQUIRED_COLUMNS
        .iter()
        .filter(|column| !names.contains(*column))
        .map(|column| column.to_string())
        .collect()
}

/// Validate the schema, parse dates and derive `death_rate` for every row.
pub fn frame_to_dataset(df: &DataFrame, origin: DataOrigin) -> CovResult<Dataset> {
    let missing = missing_required_columns(df);
    if !missing.is_empty() {
        return Err(CovError::Schema(missing));
    }
    if df.height() == 0 {
        return Err(CovError::Parse("dataset contains no rows".into()));
    }

    let names: HashSet<&str> = df.get_column_names().into_iter().collect();
    let dates = string_column(df, "date")?;
    let locations = string_column(df, "location")?;
    let iso_codes = if names.contains("iso_code") {
        Some(string_column(df, "iso_code")?)
    } else {
        None
    };

    let present: Vec<Metric> = Metric::source_metrics()
        .filter(|metric| names.contains(metric.column()))
        .collect();
    let mut metric_values = Vec::with_capacity(present.len());
    for metric in &present {
        metric_values.push((*metric, numeric_column(df, metric.column())?));
    }
    debug!(
        rows = df.height(),
        metrics = present.len(),
        has_iso = iso_codes.is_some(),
        "shaping frame"
    );

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let line = row + 2;
        let date_text = dates[row]
            .as_deref()
            .ok_or_else(|| CovError::Parse(format!("line {line}: missing date")))?;
        let date = parse_date(date_text)
            .map_err(|err| CovError::Parse(format!("line {line}: {err}")))?;
        let location = locations[row]
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| CovError::Parse(format!("line {line}: missing location")))?;

        let mut record = Record::new(location, date);
        record.iso_code = iso_codes
            .as_ref()
            .and_then(|codes| codes[row].clone())
            .filter(|code| !code.trim().is_empty());
        for (metric, values) in &metric_values {
            record.set_value(*metric, values[row]);
        }
        record.refresh_death_rate();
        records.push(record);
    }

    Ok(Dataset::new(
        records,
        ColumnSet::new(iso_codes.is_some(), present),
        origin,
    ))
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
pub fn parse_date(text: &str) -> CovResult<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(stamp.date());
        }
    }
    Err(CovError::Parse(format!("invalid date \"{text}\"")))
}

fn string_column(df: &DataFrame, name: &str) -> CovResult<Vec<Option<String>>> {
    let series = df
        .column(name)
        .and_then(|s| s.cast(&DataType::Utf8))
        .map_err(|err| polars_error(name, err))?;
    let values = series.utf8().map_err(|err| polars_error(name, err))?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn numeric_column(df: &DataFrame, name: &str) -> CovResult<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .and_then(|s| s.cast(&DataType::Float64))
        .map_err(|err| polars_error(name, err))?;
    let values = series.f64().map_err(|err| polars_error(name, err))?;
    Ok(values
        .into_iter()
        .map(|value| value.filter(|v| v.is_finite()))
        .collect())
}

fn polars_error(column: &str, err: PolarsError) -> CovError {
    CovError::Parse(format!("column {column}: {err}"))
}
