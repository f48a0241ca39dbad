use covtrack_core::{CovResult, DataOrigin, Dataset, Metric, AGGREGATE_LOCATIONS};
use covtrack_ts::{
    comparison_view, global_totals, latest_per_location, vaccination_view, Filter, GlobalTotals,
    Overview, DEFAULT_TOTAL_METRICS,
};
use tracing::{debug, warn};

use crate::figure::{
    choropleth, comparison_bar, time_series, vaccination_bar, vaccination_progress, Figure,
};

pub const DASHBOARD_TITLE: &str = "COVID-19 Global Data Tracker";

/// Metrics charted when the user has not picked any.
pub const DEFAULT_METRICS: [Metric; 4] = [
    Metric::TotalCases,
    Metric::TotalDeaths,
    Metric::DeathRate,
    Metric::PeopleVaccinatedPerHundred,
];

/// Closing notes shown under "Key Insights" at the end of every page.
pub const KEY_INSIGHTS: [&str; 5] = [
    "Global case distribution: the United States, India and Brazil have consistently reported the highest case counts.",
    "Death rate variations: some countries with high case counts kept death rates low, reflecting differences in healthcare capacity, testing and demographics.",
    "Vaccination progress: countries such as the United Kingdom and the United States reached higher vaccination shares than most others.",
    "Waves of infection: most countries went through several waves with different timing and intensity.",
    "Vaccination and mortality: earlier vaccine rollout tends to go with lower death rates in later waves.",
];

/// What the user asked to see.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub filter: Filter,
    pub metrics: Vec<Metric>,
    pub map_metric: Metric,
    pub excluded_locations: Vec<String>,
    pub total_metrics: Vec<Metric>,
}

impl DashboardRequest {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            metrics: DEFAULT_METRICS.to_vec(),
            map_metric: Metric::TotalCases,
            excluded_locations: AGGREGATE_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            total_metrics: DEFAULT_TOTAL_METRICS.to_vec(),
        }
    }
}

/// A rendered chart or the warning shown in its place.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Chart(Figure),
    Warning(String),
}

impl Panel {
    /// A failed chart becomes a warning; the rest of the dashboard still renders.
    fn from_result(result: CovResult<Figure>) -> Self {
        match result {
            Ok(figure) => Panel::Chart(figure),
            Err(err) => {
                let message = match err {
                    covtrack_core::CovError::Render(message) => message,
                    other => format!("Error creating chart: {other}"),
                };
                warn!(%message, "chart skipped");
                Panel::Warning(message)
            }
        }
    }

    pub fn is_chart(&self) -> bool {
        matches!(self, Panel::Chart(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub description: Option<String>,
    /// Numbered text items rendered after the panels.
    pub points: Vec<String>,
    pub panels: Vec<Panel>,
}

impl Section {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            points: Vec::new(),
            panels: Vec::new(),
        }
    }
}

/// Everything one page shows, computed from a single pass over the dataset.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub origin: DataOrigin,
    pub notices: Vec<String>,
    pub overview: Overview,
    pub totals: GlobalTotals,
    pub sections: Vec<Section>,
}

impl Dashboard {
    pub fn charts(&self) -> impl Iterator<Item = &Figure> {
        self.sections
            .iter()
            .flat_map(|section| section.panels.iter())
            .filter_map(|panel| match panel {
                Panel::Chart(figure) => Some(figure),
                Panel::Warning(_) => None,
            })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|section| section.panels.iter())
            .filter_map(|panel| match panel {
                Panel::Warning(message) => Some(message.as_str()),
                Panel::Chart(_) => None,
            })
    }
}

/// Recompute every view for `request` from the base dataset.
pub fn build_dashboard(
    dataset: &Dataset,
    request: &DashboardRequest,
    notices: &[String],
) -> Dashboard {
    let filtered = request.filter.apply(dataset);
    let snapshot = latest_per_location(dataset);
    let totals = global_totals(
        &snapshot,
        &request.excluded_locations,
        &request.total_metrics,
    );
    let selected = &request.filter.locations;
    debug!(
        base = dataset.len(),
        filtered = filtered.len(),
        snapshot = snapshot.len(),
        selected = selected.len(),
        "building dashboard"
    );

    let mut sections = Vec::new();

    let mut map = Section::new("Global COVID-19 Map");
    map.description = Some(
        "Distribution of the selected metric across countries, using each country's latest record."
            .to_string(),
    );
    map.panels
        .push(Panel::from_result(choropleth(&snapshot, request.map_metric)));
    sections.push(map);

    if !selected.is_empty() {
        let view = comparison_view(&snapshot, selected);
        let mut comparison = Section::new("Country Comparison");
        let mut series = Section::new("Time Series Analysis");
        if view.is_empty() {
            comparison.panels.push(Panel::Warning(
                "No data available for the selected countries.".to_string(),
            ));
        } else {
            for metric in &request.metrics {
                comparison
                    .panels
                    .push(Panel::from_result(comparison_bar(&view, *metric)));
                series
                    .panels
                    .push(Panel::from_result(time_series(&filtered, selected, *metric)));
            }
        }
        sections.push(comparison);
        if !series.panels.is_empty() {
            sections.push(series);
        }
    }

    let mut vaccination = Section::new("Vaccination Progress");
    match vaccination_view(&filtered) {
        None => vaccination.panels.push(Panel::Warning(
            "Vaccination data (people_vaccinated_per_hundred) is not available in the dataset."
                .to_string(),
        )),
        Some(view) => {
            vaccination
                .panels
                .push(Panel::from_result(vaccination_bar(&view)));
            if !view.is_empty() && !selected.is_empty() {
                vaccination
                    .panels
                    .push(Panel::from_result(vaccination_progress(&filtered, selected)));
            }
        }
    }
    sections.push(vaccination);

    let mut insights = Section::new("Key Insights");
    insights.description =
        Some("Key insights from the COVID-19 data analysis.".to_string());
    insights.points = KEY_INSIGHTS.iter().map(|point| point.to_string()).collect();
    sections.push(insights);

    Dashboard {
        title: DASHBOARD_TITLE.to_string(),
        origin: dataset.origin(),
        notices: notices.to_vec(),
        overview: Overview::of(dataset),
        totals,
        sections,
    }
}
