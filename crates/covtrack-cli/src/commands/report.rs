use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use covtrack_cli::{FilterArgs, Session};
use covtrack_core::Metric;
use covtrack_viz::{build_dashboard, render_html};
use tracing::info;

pub fn handle(
    session: &Session,
    filters: &FilterArgs,
    map_metric: Option<Metric>,
    out: &Path,
) -> Result<()> {
    let outcome = session.load();
    let mut request = session.request(filters, &outcome.dataset)?;
    if let Some(metric) = map_metric {
        request.map_metric = metric;
    }

    let dashboard = build_dashboard(&outcome.dataset, &request, &outcome.notices);
    let charts = dashboard.charts().count();
    let warnings = dashboard.warnings().count();
    info!(charts, warnings, "dashboard built");

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(out, render_html(&dashboard))
        .with_context(|| format!("writing {}", out.display()))?;
    println!(
        "Wrote dashboard with {charts} charts and {warnings} warnings to {}",
        out.display()
    );
    Ok(())
}
