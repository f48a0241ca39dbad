use std::fs::{self, File};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use covtrack_core::Dataset;
use polars::prelude::*;
use tracing::debug;
#[cfg(feature = "parquet")]
use polars::prelude::ParquetWriter;

/// Columnar copy of `dataset`: date, location, iso_code (when present), then
/// every present metric in canonical order.
pub fn to_frame(dataset: &Dataset) -> Result<DataFrame> {
    let mut columns = vec![
        Series::new(
            "date",
            dataset
                .iter()
                .map(|r| r.date.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "location",
            dataset
                .iter()
                .map(|r| r.location.clone())
                .collect::<Vec<_>>(),
        ),
    ];
    if dataset.columns().has_iso_code() {
        columns.push(Series::new(
            "iso_code",
            dataset
                .iter()
                .map(|r| r.iso_code.clone())
                .collect::<Vec<Option<String>>>(),
        ));
    }
    for metric in dataset.columns().metrics() {
        if metric.is_derived() {
            columns.push(Series::new(
                metric.column(),
                dataset.iter().map(|r| r.death_rate).collect::<Vec<f64>>(),
            ));
        } else {
            columns.push(Series::new(
                metric.column(),
                dataset
                    .iter()
                    .map(|r| r.value(metric))
                    .collect::<Vec<Option<f64>>>(),
            ));
        }
    }
    DataFrame::new(columns).context("building data frame")
}

/// Write `df` to `path`, choosing the format from the extension.
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    match extension.as_str() {
        "csv" => {
            let mut file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .context("writing CSV file")
        }
        #[cfg(feature = "parquet")]
        "parquet" => {
            let mut file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            ParquetWriter::new(&mut file)
                .finish(df)
                .map(|_| ())
                .context("writing Parquet file")
        }
        #[cfg(not(feature = "parquet"))]
        "parquet" => Err(anyhow!(
            "parquet support is disabled; rebuild with the 'parquet' feature"
        )),
        _ => Err(anyhow!(
            "unsupported output extension for {}; use .csv or .parquet",
            path.display()
        )),
    }
}

/// Convenience wrapper: convert and write in one step.
pub fn export_dataset(dataset: &Dataset, path: &Path) -> Result<usize> {
    let mut df = to_frame(dataset)?;
    debug!(rows = df.height(), columns = df.width(), path = %path.display(), "writing frame");
    write_frame(&mut df, path)?;
    Ok(df.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use covtrack_core::{ColumnSet, DataOrigin, Metric, Record};
    use tempfile::tempdir;

    fn dataset() -> Dataset {
        let day = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap();
        Dataset::new(
            vec![
                Record::new("United States", day)
                    .with_iso_code("USA")
                    .with(Metric::TotalCases, 200.0)
                    .with(Metric::TotalDeaths, 20.0),
                Record::new("World", day).with(Metric::TotalCases, 900.0),
            ],
            ColumnSet::new(true, [Metric::TotalCases, Metric::TotalDeaths]),
            DataOrigin::Sample,
        )
    }

    #[test]
    fn frame_has_schema_columns_only() {
        let df = to_frame(&dataset()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names(),
            vec!["date", "location", "iso_code", "total_cases", "total_deaths", "death_rate"]
        );
    }

    #[test]
    fn csv_export_writes_rows() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out/snapshot.csv");
        let rows = export_dataset(&dataset(), &out).unwrap();
        assert_eq!(rows, 2);
        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,location,iso_code,total_cases,total_deaths,death_rate")
        );
        assert!(text.contains("United States"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let err = export_dataset(&dataset(), &dir.path().join("out.xlsx")).unwrap_err();
        assert!(err.to_string().contains("unsupported output extension"));
    }
}
