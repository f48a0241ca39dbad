use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::metric::{ColumnSet, Metric};
use crate::record::Record;

/// Where a dataset's rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// Freshly downloaded from the remote feed.
    Downloaded,
    /// Read from the on-disk cache.
    Cached,
    /// Synthetic fallback data.
    Sample,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DataOrigin::Downloaded => "downloaded",
            DataOrigin::Cached => "cached",
            DataOrigin::Sample => "sample",
        };
        f.write_str(text)
    }
}

/// An unordered collection of [`Record`]s plus the schema they were read with.
///
/// Views (filtered, snapshot, ...) are built with [`Dataset::derive`] and share
/// the base schema so "column absent" survives every transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    columns: ColumnSet,
    origin: DataOrigin,
}

impl Dataset {
    pub fn new(records: Vec<Record>, columns: ColumnSet, origin: DataOrigin) -> Self {
        Self {
            records,
            columns,
            origin,
        }
    }

    /// A new dataset with the same schema and origin but different rows.
    pub fn derive(&self, records: Vec<Record>) -> Self {
        Self {
            records,
            columns: self.columns.clone(),
            origin: self.origin,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn origin(&self) -> DataOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, metric: Metric) -> bool {
        self.columns.contains(metric)
    }

    /// True when the schema has `iso_code` and at least one row carries one.
    pub fn has_iso_codes(&self) -> bool {
        self.columns.has_iso_code() && self.records.iter().any(|r| r.iso_code.is_some())
    }

    /// True when `metric` is in the schema and some row has a value for it.
    pub fn has_values(&self, metric: Metric) -> bool {
        self.has_column(metric) && self.records.iter().any(|r| r.value(metric).is_some())
    }

    /// Distinct location names, sorted.
    pub fn locations(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.location.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Earliest and latest dates, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
