use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use covtrack_core::Metric;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "covtrack", author, version, about = "COVID-19 global data tracker", long_about = None)]
pub struct Cli {
    /// Set the logging level (falls back to the config file, then "info")
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Read configuration from this TOML file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Never touch the network; use the cached dataset or sample data
    #[arg(long, global = true)]
    pub offline: bool,

    /// Seed for the sample data generator
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Skip the real dataset and use generated sample data
    #[arg(long, global = true)]
    pub force_sample: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the dataset into the local cache
    Fetch {
        /// Download even if the cached copy is still fresh
        #[arg(long)]
        force: bool,
    },
    /// Print the overview, global totals and a country comparison table
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write the HTML dashboard
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        /// Metric coloured on the world map
        #[arg(long)]
        map_metric: Option<Metric>,
        /// Output file
        #[arg(short, long, default_value = "covtrack-report.html", value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Export a table view as CSV (or Parquet)
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Which view to export
        #[arg(long, value_enum, default_value_t = ExportView::Filtered)]
        view: ExportView,
        /// Output file; the extension picks the format
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Write the synthetic sample dataset as CSV
    Sample {
        /// Output file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// List the metrics that can be charted
    Metrics,
    /// Interactive session reading commands from stdin
    Explore,
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Date range, country and metric selections shared by the dashboard commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// First day to include (YYYY-MM-DD); defaults to the earliest date in the data
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD); defaults to the latest date in the data
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Comma-separated countries to compare
    #[arg(long, value_delimiter = ',', conflicts_with = "all_countries")]
    pub countries: Vec<String>,

    /// Include every location instead of a country selection
    #[arg(long)]
    pub all_countries: bool,

    /// Comma-separated metrics (column names or labels)
    #[arg(long, value_delimiter = ',')]
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportView {
    /// Records matching the date range and countries
    Filtered,
    /// Latest record per location
    Snapshot,
    /// Latest vaccination share per location
    Vaccination,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn filters_split_on_commas() {
        let cli = Cli::parse_from([
            "covtrack",
            "summary",
            "--countries",
            "Kenya,United States",
            "--metrics",
            "total_cases,Death Rate (%)",
            "--start",
            "2021-01-01",
        ]);
        let Commands::Summary { filters } = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(filters.countries, vec!["Kenya", "United States"]);
        assert_eq!(filters.metrics, vec![Metric::TotalCases, Metric::DeathRate]);
        assert_eq!(filters.start, NaiveDate::from_ymd_opt(2021, 1, 1));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["covtrack", "sample", "-o", "out.csv", "--seed", "7"]);
        assert_eq!(cli.seed, Some(7));
        assert!(matches!(cli.command, Commands::Sample { .. }));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = Cli::try_parse_from(["covtrack", "summary", "--metrics", "bogus"]).unwrap_err();
        assert!(err.to_string().contains("unknown metric"));
    }

    #[test]
    fn countries_conflict_with_all() {
        assert!(Cli::try_parse_from([
            "covtrack",
            "summary",
            "--countries",
            "Kenya",
            "--all-countries"
        ])
        .is_err());
    }
}
