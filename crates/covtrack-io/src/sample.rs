//! Synthetic stand-in for the OWID feed.
//!
//! Used whenever the real dataset cannot be acquired, parsed or validated. The
//! countries are real so that every record carries a mappable ISO code.

use chrono::{Months, NaiveDate};
use covtrack_core::{ColumnSet, DataOrigin, Dataset, Metric, Record};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// (name, ISO 3166-1 alpha-3) pairs; position + 1 scales the generated counts.
pub const SAMPLE_COUNTRIES: [(&str, &str); 10] = [
    ("United States", "USA"),
    ("India", "IND"),
    ("Brazil", "BRA"),
    ("United Kingdom", "GBR"),
    ("Russia", "RUS"),
    ("Germany", "DEU"),
    ("France", "FRA"),
    ("Italy", "ITA"),
    ("Spain", "ESP"),
    ("China", "CHN"),
];

/// Month index at which vaccination figures start to ramp up.
pub const VACCINATION_START_MONTH: usize = 12;

const FIRST_MONTH: (i32, u32) = (2020, 1);
const MONTHS: u32 = 36;

/// Month-end dates from January 2020 through December 2022.
pub fn sample_dates() -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(FIRST_MONTH.0, FIRST_MONTH.1, 1) else {
        return Vec::new();
    };
    (0..MONTHS)
        .filter_map(|offset| {
            first
                .checked_add_months(Months::new(offset + 1))?
                .pred_opt()
        })
        .collect()
}

/// Schema of the synthetic feed: everything except `total_vaccinations`.
pub fn sample_columns() -> ColumnSet {
    ColumnSet::new(
        true,
        Metric::source_metrics().filter(|m| *m != Metric::TotalVaccinations),
    )
}

/// Generate the fallback dataset. `None` seeds from OS entropy.
pub fn generate_sample(seed: Option<u64>) -> Dataset {
    let mut rng = seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy);
    let dates = sample_dates();

    let mut records = Vec::with_capacity(SAMPLE_COUNTRIES.len() * dates.len());
    for (position, (name, iso)) in SAMPLE_COUNTRIES.iter().enumerate() {
        let scale = (position + 1) as f64;
        for (month, date) in dates.iter().enumerate() {
            let factor: f64 = rng.gen_range(0.9..1.1);
            records.push(sample_record(name, iso, *date, month, scale, factor));
        }
    }

    Dataset::new(records, sample_columns(), DataOrigin::Sample)
}

fn sample_record(
    name: &str,
    iso: &str,
    date: NaiveDate,
    month: usize,
    scale: f64,
    factor: f64,
) -> Record {
    let i = month as f64;
    let started = month > 0;
    let vaccinating = month > VACCINATION_START_MONTH;

    let people_vaccinated = if vaccinating {
        (i * 5000.0 * scale * factor).trunc()
    } else {
        0.0
    };
    let vaccinated_pct = if vaccinating {
        ((month - VACCINATION_START_MONTH) as f64 * scale * factor).min(100.0)
    } else {
        0.0
    };

    Record::new(name, date)
        .with_iso_code(iso)
        .with(Metric::TotalCases, (i * 10_000.0 * scale * factor).trunc())
        .with(Metric::TotalDeaths, (i * 500.0 * scale * factor).trunc())
        .with(
            Metric::NewCases,
            if started {
                (5000.0 * scale * factor).trunc()
            } else {
                0.0
            },
        )
        .with(
            Metric::NewDeaths,
            if started {
                (250.0 * scale * factor).trunc()
            } else {
                0.0
            },
        )
        .with(Metric::PeopleVaccinated, people_vaccinated)
        .with(Metric::PeopleVaccinatedPerHundred, vaccinated_pct)
        .with(
            Metric::PeopleFullyVaccinated,
            (people_vaccinated * 0.8).trunc(),
        )
        .with(Metric::PeopleFullyVaccinatedPerHundred, vaccinated_pct * 0.8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn dates_are_month_ends() {
        let dates = sample_dates();
        assert_eq!(dates.len(), 36);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2020, 1, 31).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(dates[35], NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    }

    #[test]
    fn every_record_has_a_valid_iso_code() {
        let data = generate_sample(Some(7));
        assert_eq!(data.len(), 360);
        assert!(data.iter().all(|r| {
            r.iso_code
                .as_deref()
                .is_some_and(|code| code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()))
        }));
        assert_eq!(data.origin(), DataOrigin::Sample);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        assert_eq!(generate_sample(Some(42)), generate_sample(Some(42)));
    }

    #[test]
    fn counts_stay_within_ten_percent() {
        let data = generate_sample(Some(3));
        for record in data.iter() {
            let (position, _) = SAMPLE_COUNTRIES
                .iter()
                .enumerate()
                .find(|(_, (name, _))| *name == record.location)
                .unwrap();
            let month = sample_dates().iter().position(|d| *d == record.date).unwrap();
            let base = month as f64 * 10_000.0 * (position + 1) as f64;
            let cases = record.total_cases.unwrap();
            assert!(cases >= (base * 0.9).floor() && cases <= base * 1.1);
        }
    }

    #[test]
    fn vaccination_starts_after_offset() {
        let data = generate_sample(Some(11));
        let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in data.iter().filter(|r| r.location == "India") {
            by_month.insert(record.date, record.people_vaccinated.unwrap());
        }
        let values: Vec<f64> = by_month.into_values().collect();
        assert!(values[..=VACCINATION_START_MONTH].iter().all(|v| *v == 0.0));
        assert!(values[VACCINATION_START_MONTH + 1..].iter().all(|v| *v > 0.0));
    }

    #[test]
    fn sample_schema_lacks_total_vaccinations() {
        let data = generate_sample(Some(1));
        assert!(!data.has_column(Metric::TotalVaccinations));
        assert!(data.has_column(Metric::PeopleFullyVaccinatedPerHundred));
        assert!(data
            .iter()
            .all(|r| (0.0..=100.0).contains(&r.death_rate)));
    }
}
