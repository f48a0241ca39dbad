//! Global flags and configuration merged into the settings every command uses.

use anyhow::Result;
use covtrack_core::Dataset;
use covtrack_io::{load_dataset, HttpFetcher, LoadOutcome, LoaderConfig};
use covtrack_ts::{DateRange, Filter};
use covtrack_viz::DashboardRequest;
use std::collections::BTreeSet;
use tracing::warn;

use crate::cli::{Cli, FilterArgs};
use crate::config::CovtrackConfig;

#[derive(Debug, Clone)]
pub struct Session {
    pub config: CovtrackConfig,
    pub loader: LoaderConfig,
}

impl Session {
    pub fn new(cli: &Cli, config: CovtrackConfig) -> Self {
        let mut loader = config.loader_config();
        loader.offline = cli.offline;
        loader.force_sample = cli.force_sample;
        if cli.seed.is_some() {
            loader.seed = cli.seed;
        }
        Self { config, loader }
    }

    pub fn fetcher(&self) -> HttpFetcher {
        HttpFetcher::new(self.loader.timeout)
    }

    /// Run the loading pipeline. Notices are logged as well as returned.
    pub fn load(&self) -> LoadOutcome {
        let outcome = load_dataset(&self.loader, &self.fetcher());
        for notice in &outcome.notices {
            warn!("{notice}");
        }
        outcome
    }

    /// Turn command-line selections into a dashboard request against `dataset`.
    pub fn request(&self, args: &FilterArgs, dataset: &Dataset) -> Result<DashboardRequest> {
        let mut request = DashboardRequest::new(self.filter(args, dataset)?);
        request.metrics = if args.metrics.is_empty() {
            self.config.dashboard.default_metrics.clone()
        } else {
            args.metrics.clone()
        };
        request.map_metric = self.config.dashboard.map_metric;
        request
            .excluded_locations
            .clone_from(&self.config.dashboard.excluded_locations);
        Ok(request)
    }

    /// Date range defaults to the dataset span; countries default to the
    /// configured list, keeping only those present in the data.
    pub fn filter(&self, args: &FilterArgs, dataset: &Dataset) -> Result<Filter> {
        let defaults = Filter::defaults_for(dataset, &self.config.dashboard.default_countries);
        let range = match (args.start, args.end, defaults.range) {
            (None, None, range) => range,
            (start, end, Some(span)) => Some(DateRange::new(
                start.unwrap_or(span.start()),
                end.unwrap_or(span.end()),
            )?),
            (Some(start), Some(end), None) => Some(DateRange::new(start, end)?),
            (Some(day), None, None) | (None, Some(day), None) => {
                Some(DateRange::new(day, day)?)
            }
        };

        let locations: BTreeSet<String> = if args.all_countries {
            BTreeSet::new()
        } else if args.countries.is_empty() {
            defaults.locations
        } else {
            let known: BTreeSet<String> = dataset.locations().into_iter().collect();
            for name in args.countries.iter().filter(|name| !known.contains(*name)) {
                warn!(country = %name, "no records for selected country");
            }
            args.countries.iter().cloned().collect()
        };

        let mut filter = Filter::new();
        filter.range = range;
        filter.locations = locations;
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::Parser;
    use covtrack_core::Metric;
    use covtrack_io::generate_sample;

    fn session(args: &[&str]) -> Session {
        let mut argv = vec!["covtrack"];
        argv.extend_from_slice(args);
        argv.push("metrics");
        Session::new(&Cli::parse_from(argv), CovtrackConfig::default())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn flags_override_config() {
        let s = session(&["--offline", "--seed", "9", "--force-sample"]);
        assert!(s.loader.offline);
        assert!(s.loader.force_sample);
        assert_eq!(s.loader.seed, Some(9));
    }

    #[test]
    fn defaults_cover_dataset_and_known_countries() {
        let data = generate_sample(Some(1));
        let filter = session(&[]).filter(&FilterArgs::default(), &data).unwrap();
        let range = filter.range.unwrap();
        assert_eq!(range.start(), day(2020, 1, 31));
        assert_eq!(range.end(), day(2022, 12, 31));
        // South Africa and Kenya are not in the sample
        assert_eq!(filter.locations.len(), 8);
        assert!(!filter.locations.contains("Kenya"));
    }

    #[test]
    fn partial_range_is_completed_from_data() {
        let data = generate_sample(Some(1));
        let args = FilterArgs {
            start: Some(day(2021, 6, 1)),
            countries: vec!["Kenya".into(), "Atlantis".into()],
            ..FilterArgs::default()
        };
        let filter = session(&[]).filter(&args, &data).unwrap();
        let range = filter.range.unwrap();
        assert_eq!(range.start(), day(2021, 6, 1));
        assert_eq!(range.end(), day(2022, 12, 31));
        assert_eq!(filter.locations.len(), 2);
    }

    #[test]
    fn inverted_range_is_an_error() {
        let data = generate_sample(Some(1));
        let args = FilterArgs {
            start: Some(day(2022, 1, 1)),
            end: Some(day(2021, 1, 1)),
            ..FilterArgs::default()
        };
        assert!(session(&[]).filter(&args, &data).is_err());
    }

    #[test]
    fn request_uses_configured_metrics_unless_given() {
        let data = generate_sample(Some(1));
        let s = session(&[]);
        let request = s.request(&FilterArgs::default(), &data).unwrap();
        assert_eq!(request.metrics.len(), 4);

        let args = FilterArgs {
            metrics: vec![Metric::NewCases],
            all_countries: true,
            ..FilterArgs::default()
        };
        let request = s.request(&args, &data).unwrap();
        assert_eq!(request.metrics, vec![Metric::NewCases]);
        assert!(request.filter.selects_all_locations());
    }
}
