//! Configuration for the covtrack CLI.
//! Default location: `<config dir>/covtrack/config.toml`.

use anyhow::{anyhow, Context, Result};
use covtrack_core::{Metric, AGGREGATE_LOCATIONS};
use covtrack_io::acquire::{DEFAULT_CACHE_PATH, DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT, DEFAULT_TTL};
use covtrack_io::LoaderConfig;
use covtrack_ts::DEFAULT_COUNTRIES;
use covtrack_viz::DEFAULT_METRICS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CovtrackConfig {
    /// Where the dataset comes from and how long it stays cached
    #[serde(default)]
    pub source: SourceConfig,
    /// Default selections for the dashboard views
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Sample data generator settings
    #[serde(default)]
    pub sample: SampleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Local CSV copy of the feed
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Age in seconds after which the cached copy is refreshed
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            cache_path: default_cache_path(),
            timeout_secs: default_timeout(),
            ttl_secs: default_ttl(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_cache_path() -> String {
    DEFAULT_CACHE_PATH.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_ttl() -> u64 {
    DEFAULT_TTL.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Countries selected when none are given on the command line
    #[serde(default = "default_countries")]
    pub default_countries: Vec<String>,
    #[serde(default = "default_metrics")]
    pub default_metrics: Vec<Metric>,
    /// Locations left out of the global totals
    #[serde(default = "default_excluded")]
    pub excluded_locations: Vec<String>,
    #[serde(default = "default_map_metric")]
    pub map_metric: Metric,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_countries: default_countries(),
            default_metrics: default_metrics(),
            excluded_locations: default_excluded(),
            map_metric: default_map_metric(),
        }
    }
}

fn default_countries() -> Vec<String> {
    DEFAULT_COUNTRIES.iter().map(|s| s.to_string()).collect()
}

fn default_metrics() -> Vec<Metric> {
    DEFAULT_METRICS.to_vec()
}

fn default_excluded() -> Vec<String> {
    AGGREGATE_LOCATIONS.iter().map(|s| s.to_string()).collect()
}

fn default_map_metric() -> Metric {
    Metric::TotalCases
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SampleConfig {
    /// Fixed seed for reproducible sample data; unset means random
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CovtrackConfig {
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow!("invalid log level \"{}\" in config", self.logging.level))
    }

    /// Loader settings before command-line overrides.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            url: self.source.url.clone(),
            cache_path: PathBuf::from(&self.source.cache_path),
            timeout: Duration::from_secs(self.source.timeout_secs),
            ttl: Duration::from_secs(self.source.ttl_secs),
            seed: self.sample.seed,
            ..LoaderConfig::default()
        }
    }
}

/// Location: `<config dir>/covtrack/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow!("no configuration directory"))?;
    Ok(base.join("covtrack").join("config.toml"))
}

/// Load `explicit` if given (it must exist), otherwise the default file.
/// A missing default file yields the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<CovtrackConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Ok(path) if path.exists() => path,
            _ => return Ok(CovtrackConfig::default()),
        },
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<CovtrackConfig> {
    Ok(toml::from_str(contents)?)
}
