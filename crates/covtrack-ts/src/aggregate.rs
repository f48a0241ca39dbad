//! Snapshots and totals derived from a (filtered) dataset.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use covtrack_core::{round2, Dataset, Metric, Record};

/// Columns summed for the headline cards.
pub const DEFAULT_TOTAL_METRICS: [Metric; 6] = [
    Metric::TotalCases,
    Metric::TotalDeaths,
    Metric::NewCases,
    Metric::NewDeaths,
    Metric::TotalVaccinations,
    Metric::PeopleVaccinated,
];

/// The most recent record for every location, ordered by location name.
///
/// On equal dates the record appearing later in the input wins.
pub fn latest_per_location(dataset: &Dataset) -> Dataset {
    let mut latest: BTreeMap<&str, &Record> = BTreeMap::new();
    for record in dataset.iter() {
        match latest.entry(record.location.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.date >= slot.get().date {
                    slot.insert(record);
                }
            }
        }
    }
    dataset.derive(latest.into_values().cloned().collect())
}

/// Sums over a snapshot, keyed by metric.
///
/// `None` means the column does not exist in the source schema; a present
/// column whose values are all missing sums to `Some(0.0)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalTotals {
    values: BTreeMap<Metric, Option<f64>>,
}

impl GlobalTotals {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        self.values.iter().map(|(metric, value)| (*metric, *value))
    }

    /// Headline case-fatality ratio; `None` unless both totals exist and cases > 0.
    pub fn death_rate(&self) -> Option<f64> {
        let cases = self.get(Metric::TotalCases)?;
        let deaths = self.get(Metric::TotalDeaths)?;
        (cases > 0.0).then(|| round2(deaths / cases * 100.0))
    }
}

/// Sum `metrics` over `snapshot`, skipping rows whose location is excluded.
pub fn global_totals<S: AsRef<str>>(
    snapshot: &Dataset,
    excluded: &[S],
    metrics: &[Metric],
) -> GlobalTotals {
    let excluded: BTreeSet<&str> = excluded.iter().map(|name| name.as_ref()).collect();
    let rows: Vec<&Record> = snapshot
        .iter()
        .filter(|record| !excluded.contains(record.location.as_str()))
        .collect();

    let values = metrics
        .iter()
        .map(|metric| {
            let total = snapshot.has_column(*metric).then(|| {
                rows.iter()
                    .filter_map(|record| record.value(*metric))
                    .sum::<f64>()
            });
            (*metric, total)
        })
        .collect();
    GlobalTotals { values }
}

/// Snapshot rows for the selected locations, largest `total_cases` first.
///
/// An empty selection keeps every location.
pub fn comparison_view(snapshot: &Dataset, selected: &BTreeSet<String>) -> Dataset {
    let mut rows: Vec<Record> = snapshot
        .iter()
        .filter(|record| selected.is_empty() || selected.contains(&record.location))
        .cloned()
        .collect();
    if snapshot.has_column(Metric::TotalCases) {
        sort_descending(&mut rows, Metric::TotalCases);
    }
    snapshot.derive(rows)
}

/// Latest vaccination share per location, highest first.
///
/// Returns `None` when the feed has no `people_vaccinated_per_hundred` column.
pub fn vaccination_view(filtered: &Dataset) -> Option<Dataset> {
    let metric = Metric::PeopleVaccinatedPerHundred;
    if !filtered.has_column(metric) {
        return None;
    }
    let with_values = filtered.derive(
        filtered
            .iter()
            .filter(|record| record.value(metric).is_some())
            .cloned()
            .collect(),
    );
    let latest = latest_per_location(&with_values);
    let mut rows = latest.records().to_vec();
    sort_descending(&mut rows, metric);
    Some(latest.derive(rows))
}

/// `(date, value)` points per location in date order, dropping missing values.
///
/// With an empty `selected` set every location is included.
pub fn series_by_location(
    dataset: &Dataset,
    metric: Metric,
    selected: &BTreeSet<String>,
) -> BTreeMap<String, Vec<(NaiveDate, f64)>> {
    let mut series: BTreeMap<String, Vec<(NaiveDate, f64)>> = BTreeMap::new();
    if !dataset.has_column(metric) {
        return series;
    }
    for record in dataset.iter() {
        if !selected.is_empty() && !selected.contains(&record.location) {
            continue;
        }
        if let Some(value) = record.value(metric) {
            series
                .entry(record.location.clone())
                .or_default()
                .push((record.date, value));
        }
    }
    for points in series.values_mut() {
        points.sort_by_key(|(date, _)| *date);
    }
    series
}

/// Headline facts about the base dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub locations: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub records: usize,
}

impl Overview {
    pub fn of(dataset: &Dataset) -> Self {
        Self {
            locations: dataset.locations().len(),
            date_range: dataset.date_bounds(),
            records: dataset.len(),
        }
    }
}

fn sort_descending(rows: &mut [Record], metric: Metric) {
    rows.sort_by(|a, b| {
        let a = a.value(metric).unwrap_or(f64::NEG_INFINITY);
        let b = b.value(metric).unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
}
