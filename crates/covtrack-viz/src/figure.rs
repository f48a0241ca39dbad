//! Plotly figure specifications built from dataset views.
//!
//! Builders return [`CovError::Render`] with a user-facing message when a view
//! cannot be drawn; callers turn that into an inline warning.

use std::collections::BTreeSet;

use covtrack_core::{CovError, CovResult, Dataset, Metric};
use covtrack_ts::series_by_location;
use serde::Serialize;
use serde_json::{json, Value};

/// Metrics added to the map hover box when the schema has them.
const MAP_HOVER_METRICS: [Metric; 3] = [Metric::TotalCases, Metric::TotalDeaths, Metric::DeathRate];

/// A Plotly figure: traces plus layout, serialisable as-is for `Plotly.newPlot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn title(&self) -> Option<&str> {
        self.layout["title"]["text"].as_str()
    }

    pub fn to_json(&self) -> String {
        // Serialising Value trees cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// World map coloured by `metric`, one country per snapshot row.
pub fn choropleth(snapshot: &Dataset, metric: Metric) -> CovResult<Figure> {
    if !snapshot.has_column(metric) {
        return Err(render_error(format!(
            "Data for {} is not available for the world map visualization.",
            metric.label()
        )));
    }
    if !snapshot.columns().has_iso_code() {
        return Err(render_error(
            "ISO country codes are missing in the dataset, which are required for the world map visualization.",
        ));
    }
    if !snapshot.has_iso_codes() {
        return Err(render_error("No valid ISO country codes found in the dataset."));
    }

    let hover: Vec<Metric> = MAP_HOVER_METRICS
        .into_iter()
        .filter(|m| *m != metric && snapshot.has_column(*m))
        .collect();

    let mut locations = Vec::new();
    let mut values = Vec::new();
    let mut names = Vec::new();
    let mut custom = Vec::new();
    for record in snapshot.iter() {
        let (Some(iso), Some(value)) = (record.iso_code.as_deref(), record.value(metric)) else {
            continue;
        };
        locations.push(iso.to_string());
        values.push(value);
        names.push(record.location.clone());
        custom.push(hover.iter().map(|m| record.value(*m)).collect::<Vec<_>>());
    }
    if locations.is_empty() {
        return Err(render_error(format!(
            "No data available for {} with valid ISO codes.",
            metric.label()
        )));
    }

    let mut template = format!("<b>%{{text}}</b><br>{}: %{{z:,}}", metric.label());
    for (idx, m) in hover.iter().enumerate() {
        template.push_str(&format!("<br>{}: %{{customdata[{idx}]:,}}", m.label()));
    }
    template.push_str("<extra></extra>");

    let title = format!("Global {} Distribution", metric.label());
    Ok(Figure {
        data: vec![json!({
            "type": "choropleth",
            "locations": locations,
            "locationmode": "ISO-3",
            "z": values,
            "text": names,
            "customdata": custom,
            "hovertemplate": template,
            "colorscale": "Viridis",
            "colorbar": { "title": { "text": metric.label() } },
        })],
        layout: json!({
            "title": { "text": title },
            "height": 700,
            "margin": { "r": 0, "t": 30, "l": 0, "b": 0 },
            "geo": { "showframe": false, "projection": { "type": "natural earth" } },
        }),
    })
}

/// One bar per location for the latest value of `metric`.
pub fn comparison_bar(view: &Dataset, metric: Metric) -> CovResult<Figure> {
    if !view.has_values(metric) {
        return Err(render_error(format!(
            "Data for {} is not available for some or all selected countries.",
            metric.label()
        )));
    }
    let title = format!("{} by Country (Latest Data)", metric.label());
    Ok(bar_figure(view, metric, &title))
}

/// One line per selected location showing `metric` over time.
pub fn time_series(
    filtered: &Dataset,
    selected: &BTreeSet<String>,
    metric: Metric,
) -> CovResult<Figure> {
    if !filtered.has_values(metric) {
        return Err(render_error(format!(
            "Time series data for {} is not available for some or all selected countries.",
            metric.label()
        )));
    }
    let title = format!("{} Over Time", metric.label());
    line_figure(filtered, selected, metric, &title).ok_or_else(|| {
        render_error(format!(
            "No time series data available for {} for the selected countries.",
            metric.label()
        ))
    })
}

/// Latest vaccination share per location (expects [`covtrack_ts::vaccination_view`]).
pub fn vaccination_bar(view: &Dataset) -> CovResult<Figure> {
    let metric = Metric::PeopleVaccinatedPerHundred;
    if !view.has_values(metric) {
        return Err(render_error(
            "Vaccination data is not available for the selected countries or time period.",
        ));
    }
    Ok(bar_figure(
        view,
        metric,
        "Vaccination Rate by Country (% of Population)",
    ))
}

/// Vaccination share over time for the selected locations.
pub fn vaccination_progress(filtered: &Dataset, selected: &BTreeSet<String>) -> CovResult<Figure> {
    line_figure(
        filtered,
        selected,
        Metric::PeopleVaccinatedPerHundred,
        "Vaccination Progress Over Time (% of Population)",
    )
    .ok_or_else(|| render_error("No vaccination data available for the selected countries."))
}

fn bar_figure(view: &Dataset, metric: Metric, title: &str) -> Figure {
    let data = view
        .iter()
        .filter_map(|record| {
            record.value(metric).map(|value| {
                json!({
                    "type": "bar",
                    "name": record.location,
                    "x": [record.location],
                    "y": [value],
                })
            })
        })
        .collect();
    Figure {
        data,
        layout: json!({
            "title": { "text": title },
            "xaxis": { "title": { "text": "Country" }, "tickangle": -45 },
            "yaxis": { "title": { "text": metric.label() } },
            "legend": { "title": { "text": "Country" } },
        }),
    }
}

fn line_figure(
    filtered: &Dataset,
    selected: &BTreeSet<String>,
    metric: Metric,
    title: &str,
) -> Option<Figure> {
    let series = series_by_location(filtered, metric, selected);
    if series.is_empty() {
        return None;
    }
    let data = series
        .into_iter()
        .map(|(location, points)| {
            let (dates, values): (Vec<String>, Vec<f64>) = points
                .into_iter()
                .map(|(date, value)| (date.format("%Y-%m-%d").to_string(), value))
                .unzip();
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": location,
                "x": dates,
                "y": values,
            })
        })
        .collect();
    Some(Figure {
        data,
        layout: json!({
            "title": { "text": title },
            "xaxis": { "title": { "text": "Date" }, "tickangle": -45 },
            "yaxis": { "title": { "text": metric.label() } },
            "legend": { "title": { "text": "Country" } },
        }),
    })
}

fn render_error(message: impl Into<String>) -> CovError {
    CovError::Render(message.into())
}
