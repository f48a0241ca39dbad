use std::io::{self, Write};

use anyhow::Result;
use covtrack_core::Metric;
use tabwriter::TabWriter;

pub fn handle() -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "LABEL\tCOLUMN\tSOURCE")?;
    for metric in Metric::ALL {
        let source = if metric.is_derived() {
            "derived"
        } else {
            "feed"
        };
        writeln!(writer, "{}\t{}\t{}", metric.label(), metric.column(), source)?;
    }
    writer.flush()?;
    Ok(())
}
