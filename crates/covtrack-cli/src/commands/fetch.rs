use std::time::SystemTime;

use anyhow::{Context, Result};
use covtrack_cli::Session;
use covtrack_io::{ensure_cached, read_dataset, CachePolicy};
use tracing::{info, warn};

/// Refresh the on-disk copy of the feed and check that it loads.
pub fn handle(session: &Session, force: bool) -> Result<()> {
    let loader = &session.loader;
    let policy = CachePolicy {
        force,
        ..loader.cache_policy()
    };
    info!(url = %loader.url, force, "fetching dataset");
    let acquired = ensure_cached(
        &loader.url,
        &loader.cache_path,
        &policy,
        &session.fetcher(),
        SystemTime::now(),
    )
    .context("fetching dataset")?;
    if let Some(notice) = &acquired.notice {
        warn!("{notice}");
        println!("{notice}");
    }

    let dataset = read_dataset(&acquired.path, acquired.origin)
        .with_context(|| format!("reading {}", acquired.path.display()))?;
    println!(
        "Dataset {} at {}: {} records, {} locations",
        acquired.origin,
        acquired.path.display(),
        dataset.len(),
        dataset.locations().len()
    );
    Ok(())
}
