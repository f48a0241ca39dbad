//! # covtrack-core: data model for the COVID-19 tracker
//!
//! Typed records for the Our World in Data COVID-19 feed. Each [`Record`] is one
//! (location, date) observation with optional metrics. A [`Dataset`] pairs the
//! records with the [`ColumnSet`] of its source schema, so that a column the feed
//! never had stays distinguishable from a column whose values are missing.
//!
//! The derived `death_rate` is computed once per record by [`death_rate`] and
//! is always present.

pub mod dataset;
pub mod error;
pub mod metric;
pub mod record;

pub use dataset::{DataOrigin, Dataset};
pub use error::{CovError, CovResult};
pub use metric::{ColumnSet, Metric};
pub use record::{death_rate, round2, Record};

/// Required columns; a feed lacking any of them cannot be displayed.
pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "location", "total_cases", "total_deaths"];

/// Aggregate pseudo-locations in the OWID feed that would double count totals.
pub const AGGREGATE_LOCATIONS: [&str; 2] = ["World", "International"];
