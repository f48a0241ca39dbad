use std::io::{self, Write};

use anyhow::Result;
use covtrack_cli::{FilterArgs, Session};
use covtrack_core::{Dataset, Metric};
use covtrack_io::LoadOutcome;
use covtrack_ts::{
    comparison_view, global_totals, latest_per_location, vaccination_view, Overview,
};
use covtrack_viz::{format_count, DashboardRequest};
use tabwriter::TabWriter;

const NOT_AVAILABLE: &str = "Data not available";
const VACCINATION_ROWS: usize = 10;

pub fn handle(session: &Session, filters: &FilterArgs) -> Result<()> {
    let outcome = session.load();
    let request = session.request(filters, &outcome.dataset)?;
    let stdout = io::stdout();
    write_summary(&mut stdout.lock(), &outcome, &request)
}

/// Overview, global totals, the selected period, the comparison table and
/// vaccination progress as aligned text.
///
/// Totals and the comparison use each location's latest record in the whole
/// dataset; the period and vaccination sections follow `request.filter`.
pub fn write_summary<W: Write>(
    out: &mut W,
    outcome: &LoadOutcome,
    request: &DashboardRequest,
) -> Result<()> {
    let dataset = &outcome.dataset;
    writeln!(out, "Data source: {}", dataset.origin())?;
    for notice in &outcome.notices {
        writeln!(out, "Note: {notice}")?;
    }

    writeln!(out, "\nDataset Overview")?;
    write_overview(out, &Overview::of(dataset))?;

    let snapshot = latest_per_location(dataset);
    let totals = global_totals(
        &snapshot,
        &request.excluded_locations,
        &request.total_metrics,
    );
    writeln!(
        out,
        "\nGlobal Overview (latest data, excluding {})",
        request.excluded_locations.join(", ")
    )?;
    let mut rows: Vec<(&str, String)> = totals
        .iter()
        .map(|(metric, value)| {
            let text = value
                .map(format_count)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            (metric.label(), text)
        })
        .collect();
    let rate = totals
        .death_rate()
        .map(|rate| format!("{rate:.2}%"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    rows.push((Metric::DeathRate.label(), rate));
    write_pairs(out, &rows)?;

    let filtered = request.filter.apply(dataset);
    writeln!(out, "\nSelected Period")?;
    write_overview(out, &Overview::of(&filtered))?;

    let selected = &request.filter.locations;
    if !selected.is_empty() {
        writeln!(out, "\nCountry Comparison (latest data)")?;
        let view = comparison_view(&snapshot, selected);
        if view.is_empty() {
            writeln!(out, "No data available for the selected countries.")?;
        } else {
            write_comparison(out, &view, &request.metrics)?;
        }
    }

    writeln!(out, "\nVaccination Progress (latest in period)")?;
    match vaccination_view(&filtered) {
        None => writeln!(
            out,
            "Vaccination data (people_vaccinated_per_hundred) is not available in the dataset."
        )?,
        Some(view) if view.is_empty() => {
            writeln!(out, "No vaccination data in the selected period.")?
        }
        Some(view) => write_vaccination(out, &view)?,
    }
    Ok(())
}

fn write_overview<W: Write>(out: &mut W, overview: &Overview) -> Result<()> {
    let span = overview
        .date_range
        .map(|(start, end)| format!("{start} to {end}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    write_pairs(
        out,
        &[
            ("Countries/Regions", overview.locations.to_string()),
            ("Date Range", span),
            ("Total Records", format_count(overview.records as f64)),
        ],
    )
}

fn write_pairs<W: Write>(out: &mut W, rows: &[(&str, String)]) -> Result<()> {
    let mut table = TabWriter::new(out);
    for (label, value) in rows {
        writeln!(table, "  {label}\t{value}")?;
    }
    table.flush()?;
    Ok(())
}

fn write_comparison<W: Write>(out: &mut W, view: &Dataset, metrics: &[Metric]) -> Result<()> {
    let metrics: Vec<Metric> = metrics
        .iter()
        .copied()
        .filter(|metric| view.has_column(*metric))
        .collect();
    let mut table = TabWriter::new(out);
    write!(table, "COUNTRY\tDATE")?;
    for metric in &metrics {
        write!(table, "\t{}", metric.label())?;
    }
    writeln!(table)?;
    for record in view {
        write!(table, "{}\t{}", record.location, record.date)?;
        for metric in &metrics {
            write!(table, "\t{}", format_value(*metric, record.value(*metric)))?;
        }
        writeln!(table)?;
    }
    table.flush()?;
    Ok(())
}

/// Top locations by vaccination share, highest first.
fn write_vaccination<W: Write>(out: &mut W, view: &Dataset) -> Result<()> {
    let metric = Metric::PeopleVaccinatedPerHundred;
    let mut table = TabWriter::new(out);
    writeln!(table, "COUNTRY\tDATE\t{}", metric.label())?;
    for record in view.iter().take(VACCINATION_ROWS) {
        writeln!(
            table,
            "{}\t{}\t{}",
            record.location,
            record.date,
            format_value(metric, record.value(metric))
        )?;
    }
    table.flush()?;
    Ok(())
}

/// Percentages keep two decimals; counts get thousands separators.
fn format_value(metric: Metric, value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if metric.label().ends_with("(%)") => format!("{v:.2}"),
        Some(v) => format_count(v),
    }
}
