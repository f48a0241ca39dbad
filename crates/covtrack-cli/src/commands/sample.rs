use std::path::Path;

use anyhow::Result;
use covtrack_cli::Session;
use covtrack_io::generate_sample;
use covtrack_ts::export_dataset;
use tracing::info;

pub fn handle(session: &Session, out: &Path) -> Result<()> {
    let seed = session.loader.seed;
    info!(?seed, "generating sample dataset");
    let dataset = generate_sample(seed);
    let rows = export_dataset(&dataset, out)?;
    println!("Wrote {rows} sample records to {}", out.display());
    Ok(())
}
