//! # covtrack-io: acquisition and loading of the OWID COVID-19 feed
//!
//! The loading pipeline never fails. Each stage either hands a dataset to the
//! next or degrades to synthetic sample data:
//!
//! 1. **Acquisition** ([`acquire`]): keep a local CSV copy of the remote feed no
//!    older than a TTL, downloading through a [`Fetcher`] with a bounded timeout.
//! 2. **Shaping** ([`shape`]): read the CSV with polars, check the required
//!    columns, parse dates and derive `death_rate`.
//! 3. **Fallback** ([`sample`]): ten real countries over 36 month-ends with noisy,
//!    growing counts.
//!
//! [`load_dataset`] runs the pipeline; [`DatasetCache`] holds the result in
//! memory for a session and reloads it after its TTL.
//!
//! ```rust,no_run
//! use covtrack_io::{load_dataset, HttpFetcher, LoaderConfig};
//!
//! let config = LoaderConfig::default();
//! let outcome = load_dataset(&config, &HttpFetcher::new(config.timeout));
//! for notice in &outcome.notices {
//!     eprintln!("{notice}");
//! }
//! println!("{} records", outcome.dataset.len());
//! ```

pub mod acquire;
pub mod cache;
pub mod loader;
pub mod sample;
pub mod shape;

pub use acquire::{ensure_cached, Acquired, CachePolicy, Fetcher, HttpFetcher};
pub use cache::DatasetCache;
pub use loader::{load_dataset, LoadFailure, LoadOutcome, LoaderConfig};
pub use sample::generate_sample;
pub use shape::read_dataset;
