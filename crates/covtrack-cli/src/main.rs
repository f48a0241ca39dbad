use clap::Parser;
use covtrack_cli::{load_config, Cli, Commands, CovtrackConfig, Session};
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::{completions, explore, export, fetch, metrics, report, sample, summary};

fn run(cli: &Cli, config: CovtrackConfig) -> anyhow::Result<()> {
    let session = Session::new(cli, config);
    debug!(
        url = %session.loader.url,
        cache = %session.loader.cache_path.display(),
        offline = session.loader.offline,
        force_sample = session.loader.force_sample,
        "session ready"
    );

    match &cli.command {
        Commands::Fetch { force } => fetch::handle(&session, *force),
        Commands::Summary { filters } => summary::handle(&session, filters),
        Commands::Report {
            filters,
            map_metric,
            out,
        } => report::handle(&session, filters, *map_metric, out),
        Commands::Export { filters, view, out } => export::handle(&session, filters, *view, out),
        Commands::Sample { out } => sample::handle(&session, out),
        Commands::Metrics => metrics::handle(),
        Commands::Explore => explore::handle(&session),
        Commands::Completions { shell, out } => completions::handle(*shell, out.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let level = match (&cli.log_level, &config) {
        (Some(level), _) => *level,
        (None, Ok(config)) => config.log_level().unwrap_or(tracing::Level::INFO),
        (None, Err(_)) => tracing::Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    if let Err(err) = config.and_then(|config| run(&cli, config)) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
