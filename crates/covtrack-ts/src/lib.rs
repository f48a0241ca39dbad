//! Filtering and aggregation over covtrack datasets.
//!
//! Every function here is pure: it takes a [`Dataset`](covtrack_core::Dataset)
//! view and returns a new one (or a summary) without touching its input.

pub mod aggregate;
pub mod filter;
pub mod frame;

pub use aggregate::{
    comparison_view, global_totals, latest_per_location, series_by_location, vaccination_view,
    GlobalTotals, Overview, DEFAULT_TOTAL_METRICS,
};
pub use filter::{DateRange, Filter, DEFAULT_COUNTRIES};
pub use frame::{export_dataset, to_frame, write_frame};
