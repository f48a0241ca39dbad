use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CovError;

/// A displayable numeric attribute of a [`Record`](crate::Record).
///
/// The serde representation is the source column name, so metrics round-trip
/// through config files using the same spelling as the CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalCases,
    NewCases,
    TotalDeaths,
    NewDeaths,
    DeathRate,
    TotalVaccinations,
    PeopleVaccinated,
    PeopleFullyVaccinated,
    PeopleVaccinatedPerHundred,
    PeopleFullyVaccinatedPerHundred,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::TotalCases,
        Metric::NewCases,
        Metric::TotalDeaths,
        Metric::NewDeaths,
        Metric::DeathRate,
        Metric::TotalVaccinations,
        Metric::PeopleVaccinated,
        Metric::PeopleFullyVaccinated,
        Metric::PeopleVaccinatedPerHundred,
        Metric::PeopleFullyVaccinatedPerHundred,
    ];

    /// Column name in the OWID feed.
    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalCases => "total_cases",
            Metric::NewCases => "new_cases",
            Metric::TotalDeaths => "total_deaths",
            Metric::NewDeaths => "new_deaths",
            Metric::DeathRate => "death_rate",
            Metric::TotalVaccinations => "total_vaccinations",
            Metric::PeopleVaccinated => "people_vaccinated",
            Metric::PeopleFullyVaccinated => "people_fully_vaccinated",
            Metric::PeopleVaccinatedPerHundred => "people_vaccinated_per_hundred",
            Metric::PeopleFullyVaccinatedPerHundred => "people_fully_vaccinated_per_hundred",
        }
    }

    /// Human-facing label used for chart titles and axis names.
    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalCases => "Total Cases",
            Metric::NewCases => "New Cases",
            Metric::TotalDeaths => "Total Deaths",
            Metric::NewDeaths => "New Deaths",
            Metric::DeathRate => "Death Rate (%)",
            Metric::TotalVaccinations => "Total Vaccinations",
            Metric::PeopleVaccinated => "People Vaccinated",
            Metric::PeopleFullyVaccinated => "People Fully Vaccinated",
            Metric::PeopleVaccinatedPerHundred => "People Vaccinated (%)",
            Metric::PeopleFullyVaccinatedPerHundred => "People Fully Vaccinated (%)",
        }
    }

    /// Derived metrics are computed during shaping and never read from the feed.
    pub fn is_derived(self) -> bool {
        matches!(self, Metric::DeathRate)
    }

    /// Metrics read directly from source columns.
    pub fn source_metrics() -> impl Iterator<Item = Metric> {
        Self::ALL.into_iter().filter(|m| !m.is_derived())
    }

    pub fn from_column(column: &str) -> Option<Metric> {
        Self::ALL.into_iter().find(|m| m.column() == column)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = CovError;

    /// Accepts either the column name or the label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| {
                m.column().eq_ignore_ascii_case(needle) || m.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let available = Metric::ALL
                    .iter()
                    .map(|m| m.column())
                    .collect::<Vec<_>>()
                    .join(", ");
                CovError::Config(format!(
                    "unknown metric \"{needle}\". Available metrics: {available}"
                ))
            })
    }
}

/// Optional columns carried by a dataset's source schema.
///
/// A column listed here may still hold missing values on individual records;
/// a column absent from the set means the feed never had it at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    iso_code: bool,
    metrics: BTreeSet<Metric>,
}

impl ColumnSet {
    pub fn new(iso_code: bool, metrics: impl IntoIterator<Item = Metric>) -> Self {
        Self {
            iso_code,
            metrics: metrics.into_iter().filter(|m| !m.is_derived()).collect(),
        }
    }

    /// Every optional column the OWID feed is known to carry.
    pub fn full() -> Self {
        Self::new(true, Metric::source_metrics())
    }

    pub fn has_iso_code(&self) -> bool {
        self.iso_code
    }

    /// `death_rate` is derived during shaping, so it is always present.
    pub fn contains(&self, metric: Metric) -> bool {
        metric.is_derived() || self.metrics.contains(&metric)
    }

    /// Present metrics in canonical order, derived ones included.
    pub fn metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.contains(*m))
            .collect()
    }
}
