use chrono::NaiveDate;

use crate::metric::Metric;

/// One (location, date) observation from the feed.
///
/// Every source metric is optional: `None` means the value was missing for this
/// row, which aggregations treat differently from an explicit zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub location: String,
    pub iso_code: Option<String>,
    pub date: NaiveDate,
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_deaths: Option<f64>,
    pub total_vaccinations: Option<f64>,
    pub people_vaccinated: Option<f64>,
    pub people_fully_vaccinated: Option<f64>,
    pub people_vaccinated_per_hundred: Option<f64>,
    pub people_fully_vaccinated_per_hundred: Option<f64>,
    /// Derived from `total_deaths / total_cases`; see [`death_rate`].
    pub death_rate: f64,
}

impl Record {
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            location: location.into(),
            iso_code: None,
            date,
            total_cases: None,
            new_cases: None,
            total_deaths: None,
            new_deaths: None,
            total_vaccinations: None,
            people_vaccinated: None,
            people_fully_vaccinated: None,
            people_vaccinated_per_hundred: None,
            people_fully_vaccinated_per_hundred: None,
            death_rate: 0.0,
        }
    }

    pub fn with_iso_code(mut self, iso_code: impl Into<String>) -> Self {
        self.iso_code = Some(iso_code.into());
        self
    }

    /// Builder-style setter; keeps `death_rate` in sync.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set_value(metric, Some(value));
        self
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalCases => self.total_cases,
            Metric::NewCases => self.new_cases,
            Metric::TotalDeaths => self.total_deaths,
            Metric::NewDeaths => self.new_deaths,
            Metric::DeathRate => Some(self.death_rate),
            Metric::TotalVaccinations => self.total_vaccinations,
            Metric::PeopleVaccinated => self.people_vaccinated,
            Metric::PeopleFullyVaccinated => self.people_fully_vaccinated,
            Metric::PeopleVaccinatedPerHundred => self.people_vaccinated_per_hundred,
            Metric::PeopleFullyVaccinatedPerHundred => self.people_fully_vaccinated_per_hundred,
        }
    }

    /// Sets a source metric. Writes to `DeathRate` are ignored since the rate is
    /// always recomputed from cases and deaths.
    pub fn set_value(&mut self, metric: Metric, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        let slot = match metric {
            Metric::TotalCases => &mut self.total_cases,
            Metric::NewCases => &mut self.new_cases,
            Metric::TotalDeaths => &mut self.total_deaths,
            Metric::NewDeaths => &mut self.new_deaths,
            Metric::DeathRate => return,
            Metric::TotalVaccinations => &mut self.total_vaccinations,
            Metric::PeopleVaccinated => &mut self.people_vaccinated,
            Metric::PeopleFullyVaccinated => &mut self.people_fully_vaccinated,
            Metric::PeopleVaccinatedPerHundred => &mut self.people_vaccinated_per_hundred,
            Metric::PeopleFullyVaccinatedPerHundred => {
                &mut self.people_fully_vaccinated_per_hundred
            }
        };
        *slot = value;
        if matches!(metric, Metric::TotalCases | Metric::TotalDeaths) {
            self.refresh_death_rate();
        }
    }

    pub fn refresh_death_rate(&mut self) {
        self.death_rate = death_rate(self.total_deaths, self.total_cases);
    }
}

/// Case fatality ratio in percent, rounded to two decimals.
///
/// Returns 0 when cases are zero, negative or missing, when deaths are missing,
/// or when the division is not finite. The result is clamped to `[0, 100]`.
pub fn death_rate(total_deaths: Option<f64>, total_cases: Option<f64>) -> f64 {
    match (total_deaths, total_cases) {
        (Some(deaths), Some(cases)) if cases > 0.0 => {
            let rate = round2(deaths / cases * 100.0);
            if rate.is_finite() {
                rate.clamp(0.0, 100.0)
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Round to two decimal places, ties to even (0.125 becomes 0.12).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
