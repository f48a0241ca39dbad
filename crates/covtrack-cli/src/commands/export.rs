use std::path::Path;

use anyhow::{anyhow, Result};
use covtrack_cli::{ExportView, FilterArgs, Session};
use covtrack_ts::{comparison_view, export_dataset, latest_per_location, vaccination_view};
use tracing::info;

pub fn handle(session: &Session, filters: &FilterArgs, view: ExportView, out: &Path) -> Result<()> {
    let outcome = session.load();
    let dataset = &outcome.dataset;
    let filter = session.filter(filters, dataset)?;

    let table = match view {
        ExportView::Filtered => filter.apply(dataset),
        ExportView::Snapshot => comparison_view(&latest_per_location(dataset), &filter.locations),
        ExportView::Vaccination => vaccination_view(&filter.apply(dataset)).ok_or_else(|| {
            anyhow!("vaccination data (people_vaccinated_per_hundred) is not available in the dataset")
        })?,
    };
    info!(?view, rows = table.len(), "exporting view");
    let rows = export_dataset(&table, out)?;
    println!("Exported {rows} rows to {}", out.display());
    Ok(())
}
