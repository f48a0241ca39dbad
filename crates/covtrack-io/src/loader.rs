//! Acquisition → shaping → validation, degrading to sample data on failure.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use covtrack_core::{CovError, Dataset};
use tracing::{info, warn};

use crate::acquire::{
    ensure_cached, CachePolicy, Fetcher, DEFAULT_CACHE_PATH, DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT,
    DEFAULT_TTL,
};
use crate::sample::generate_sample;
use crate::shape::read_dataset;

pub const SAMPLE_NOTICE: &str =
    "Using sample data for demonstration. The actual COVID-19 dataset could not be loaded.";

/// Everything the loading pipeline needs to know.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub url: String,
    pub cache_path: PathBuf,
    pub timeout: Duration,
    pub ttl: Duration,
    pub offline: bool,
    pub force_refresh: bool,
    /// Skip acquisition entirely and serve sample data.
    pub force_sample: bool,
    /// Seed for the fallback generator; `None` is non-deterministic.
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            timeout: DEFAULT_TIMEOUT,
            ttl: DEFAULT_TTL,
            offline: false,
            force_refresh: false,
            force_sample: false,
            seed: None,
        }
    }
}

impl LoaderConfig {
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            ttl: self.ttl,
            force: self.force_refresh,
            offline: self.offline,
        }
    }
}

/// Why the real dataset was replaced by sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// Timeout, HTTP error or transport failure with no local copy.
    Network(String),
    /// Required columns absent from the feed.
    Schema(Vec<String>),
    /// Malformed CSV, dates or unreadable cache file.
    Parse(String),
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailure::Network(msg) => write!(f, "Error downloading the dataset: {msg}"),
            LoadFailure::Schema(missing) => write!(
                f,
                "Dataset is missing required columns: {}",
                missing.join(", ")
            ),
            LoadFailure::Parse(msg) => write!(f, "Error loading the dataset: {msg}"),
        }
    }
}

impl From<CovError> for LoadFailure {
    fn from(err: CovError) -> Self {
        match err {
            CovError::Network(msg) => LoadFailure::Network(msg),
            CovError::Schema(missing) => LoadFailure::Schema(missing),
            other => LoadFailure::Parse(other.to_string()),
        }
    }
}

/// A dataset ready for display, plus what the user should be told about it.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    /// Set when `dataset` is sample data standing in for the real feed.
    pub fallback: Option<LoadFailure>,
    pub notices: Vec<String>,
}

/// Load the dataset. Never fails: every failure degrades to sample data.
pub fn load_dataset(config: &LoaderConfig, fetcher: &dyn Fetcher) -> LoadOutcome {
    if config.force_sample {
        info!("sample data requested; skipping acquisition");
        return LoadOutcome {
            dataset: generate_sample(config.seed),
            fallback: None,
            notices: vec![SAMPLE_NOTICE.to_string()],
        };
    }

    let mut notices = Vec::new();
    match try_load(config, fetcher, &mut notices) {
        Ok(dataset) => {
            info!(
                rows = dataset.len(),
                origin = %dataset.origin(),
                "dataset loaded"
            );
            LoadOutcome {
                dataset,
                fallback: None,
                notices,
            }
        }
        Err(failure) => {
            warn!(%failure, "falling back to sample data");
            notices.push(format!("{failure}. Using sample data instead."));
            notices.push(SAMPLE_NOTICE.to_string());
            LoadOutcome {
                dataset: generate_sample(config.seed),
                fallback: Some(failure),
                notices,
            }
        }
    }
}

fn try_load(
    config: &LoaderConfig,
    fetcher: &dyn Fetcher,
    notices: &mut Vec<String>,
) -> Result<Dataset, LoadFailure> {
    let acquired = ensure_cached(
        &config.url,
        &config.cache_path,
        &config.cache_policy(),
        fetcher,
        SystemTime::now(),
    )?;
    notices.extend(acquired.notice);
    Ok(read_dataset(&acquired.path, acquired.origin)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::tests::StubFetcher;
    use covtrack_core::{DataOrigin, Metric};
    use std::fs;
    use tempfile::tempdir;

    fn config_for(dir: &std::path::Path) -> LoaderConfig {
        LoaderConfig {
            url: "https://example.test/owid.csv".into(),
            cache_path: dir.join("data/owid.csv"),
            seed: Some(5),
            ..LoaderConfig::default()
        }
    }

    #[test]
    fn downloads_and_parses() {
        let dir = tempdir().unwrap();
        let fetcher = StubFetcher::ok(
            "iso_code,location,date,total_cases,total_deaths\nKEN,Kenya,2021-05-01,100,2\n",
        );
        let outcome = load_dataset(&config_for(dir.path()), &fetcher);
        assert!(outcome.fallback.is_none());
        assert_eq!(outcome.dataset.origin(), DataOrigin::Downloaded);
        assert_eq!(outcome.dataset.records()[0].death_rate, 2.0);
    }

    #[test]
    fn network_failure_falls_back() {
        let dir = tempdir().unwrap();
        let outcome = load_dataset(&config_for(dir.path()), &StubFetcher::failing());
        assert!(matches!(outcome.fallback, Some(LoadFailure::Network(_))));
        assert_eq!(outcome.dataset.origin(), DataOrigin::Sample);
        assert!(outcome.notices.iter().any(|n| n == SAMPLE_NOTICE));
    }

    #[test]
    fn missing_columns_fall_back() {
        let dir = tempdir().unwrap();
        let fetcher = StubFetcher::ok("location,date\nKenya,2021-05-01\n");
        let outcome = load_dataset(&config_for(dir.path()), &fetcher);
        assert_eq!(
            outcome.fallback,
            Some(LoadFailure::Schema(vec![
                "total_cases".to_string(),
                "total_deaths".to_string()
            ]))
        );
        assert!(outcome.notices[0].contains("missing required columns: total_cases, total_deaths"));
    }

    #[test]
    fn malformed_cache_falls_back() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        fs::create_dir_all(config.cache_path.parent().unwrap()).unwrap();
        fs::write(
            &config.cache_path,
            "location,date,total_cases,total_deaths\nKenya,yesterday,1,1\n",
        )
        .unwrap();
        let fetcher = StubFetcher::ok("unused");
        let outcome = load_dataset(&config, &fetcher);
        assert!(matches!(outcome.fallback, Some(LoadFailure::Parse(_))));
        assert_eq!(fetcher.calls.get(), 0);
    }

    #[test]
    fn forced_sample_skips_network() {
        let dir = tempdir().unwrap();
        let config = LoaderConfig {
            force_sample: true,
            ..config_for(dir.path())
        };
        let fetcher = StubFetcher::ok("unused");
        let outcome = load_dataset(&config, &fetcher);
        assert_eq!(fetcher.calls.get(), 0);
        assert!(outcome.fallback.is_none());
        assert!(!outcome.dataset.has_column(Metric::TotalVaccinations));
    }
}
