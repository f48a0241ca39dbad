use std::collections::BTreeSet;

use chrono::NaiveDate;
use covtrack_core::{CovError, CovResult, Dataset, Record};

/// Countries pre-selected when the user has not chosen any.
pub const DEFAULT_COUNTRIES: [&str; 10] = [
    "United States",
    "India",
    "Brazil",
    "United Kingdom",
    "Russia",
    "France",
    "Germany",
    "South Africa",
    "Kenya",
    "China",
];

/// Closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CovResult<Self> {
        if start > end {
            return Err(CovError::Config(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The full span of `dataset`, or `None` when it is empty.
    pub fn of(dataset: &Dataset) -> Option<Self> {
        dataset
            .date_bounds()
            .map(|(start, end)| Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// User selections applied to the base dataset.
///
/// An unset range keeps every date; an empty location set keeps every location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub range: Option<DateRange>,
    pub locations: BTreeSet<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Whole date span plus whichever `preferred` countries the dataset has.
    pub fn defaults_for<S: AsRef<str>>(dataset: &Dataset, preferred: &[S]) -> Self {
        let known: BTreeSet<String> = dataset.locations().into_iter().collect();
        Self {
            range: DateRange::of(dataset),
            locations: preferred
                .iter()
                .map(|name| name.as_ref())
                .filter(|name| known.contains(*name))
                .map(String::from)
                .collect(),
        }
    }

    pub fn selects_all_locations(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let in_range = self
            .range
            .map_or(true, |range| range.contains(record.date));
        in_range && (self.locations.is_empty() || self.locations.contains(&record.location))
    }

    /// Matching records in their original order. The base dataset is untouched.
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        dataset.derive(
            dataset
                .iter()
                .filter(|record| self.matches(record))
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covtrack_core::{ColumnSet, DataOrigin, Metric};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let rows = [
            ("Kenya", day(2021, 1, 1)),
            ("Chile", day(2021, 1, 15)),
            ("Kenya", day(2021, 2, 1)),
            ("India", day(2021, 3, 1)),
            ("Chile", day(2021, 3, 31)),
        ];
        Dataset::new(
            rows.iter()
                .map(|(loc, date)| Record::new(*loc, *date).with(Metric::TotalCases, 1.0))
                .collect(),
            ColumnSet::new(false, [Metric::TotalCases, Metric::TotalDeaths]),
            DataOrigin::Cached,
        )
    }

    #[test]
    fn range_is_closed_on_both_ends() {
        let range = DateRange::new(day(2021, 1, 15), day(2021, 3, 1)).unwrap();
        let view = Filter::new().with_range(range).apply(&dataset());
        let dates: Vec<_> = view.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2021, 1, 15), day(2021, 2, 1), day(2021, 3, 1)]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(DateRange::new(day(2021, 2, 1), day(2021, 1, 1)).is_err());
    }

    #[test]
    fn empty_selection_keeps_every_location() {
        let base = dataset();
        let view = Filter::new().apply(&base);
        assert_eq!(view, base);
    }

    #[test]
    fn selection_preserves_order() {
        let view = Filter::new()
            .with_locations(["Chile", "Kenya"])
            .apply(&dataset());
        let names: Vec<_> = view.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(names, vec!["Kenya", "Chile", "Kenya", "Chile"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = Filter::new()
            .with_range(DateRange::new(day(2021, 1, 10), day(2021, 12, 31)).unwrap())
            .with_locations(["Kenya", "India"]);
        let once = filter.apply(&dataset());
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn defaults_keep_known_countries_only() {
        let filter = Filter::defaults_for(&dataset(), &DEFAULT_COUNTRIES);
        let expected: BTreeSet<String> = ["India", "Kenya"].into_iter().map(String::from).collect();
        assert_eq!(filter.locations, expected);
        assert_eq!(
            filter.range,
            Some(DateRange::new(day(2021, 1, 1), day(2021, 3, 31)).unwrap())
        );
    }
}
