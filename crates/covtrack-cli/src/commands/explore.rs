//! Line-oriented interactive session.
//!
//! Each command updates the selections; `show` recomputes every view from the
//! dataset held in a [`DatasetCache`], so repeated views within the TTL reuse
//! one load.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use covtrack_cli::{FilterArgs, Session};
use covtrack_core::Metric;
use covtrack_io::{DatasetCache, LoadOutcome};
use covtrack_ts::DateRange;
use tracing::debug;

use super::summary::write_summary;

const HELP: &str = "\
Commands:
  countries NAME[,NAME...]   compare these countries
  countries all              include every location
  countries default          reset to the configured countries
  dates START END            restrict to a date range (YYYY-MM-DD)
  dates all                  use the full date range
  metrics NAME[,NAME...]     metrics for the comparison table
  show                       print the summary for the current selections
  reload                     drop the cached dataset
  help                       this text
  quit                       leave";

#[derive(Debug, Clone, PartialEq)]
enum ExploreCommand {
    Countries(Vec<String>),
    AllCountries,
    DefaultCountries,
    Dates(DateRange),
    AllDates,
    Metrics(Vec<Metric>),
    Show,
    Reload,
    Help,
    Quit,
}

impl ExploreCommand {
    /// `Ok(None)` for blank lines.
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));
        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "countries" => match rest.to_ascii_lowercase().as_str() {
                "all" => ExploreCommand::AllCountries,
                "" | "default" => ExploreCommand::DefaultCountries,
                _ => ExploreCommand::Countries(split_list(rest)),
            },
            "dates" => {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                match parts.as_slice() {
                    ["all"] | [] => ExploreCommand::AllDates,
                    [start, end] => {
                        let start: NaiveDate = start.parse()?;
                        let end: NaiveDate = end.parse()?;
                        ExploreCommand::Dates(DateRange::new(start, end)?)
                    }
                    _ => return Err(anyhow!("usage: dates START END")),
                }
            }
            "metrics" => {
                let metrics = split_list(rest)
                    .iter()
                    .map(|name| name.parse::<Metric>())
                    .collect::<Result<Vec<_>, _>>()?;
                if metrics.is_empty() {
                    return Err(anyhow!("usage: metrics NAME[,NAME...]"));
                }
                ExploreCommand::Metrics(metrics)
            }
            "show" => ExploreCommand::Show,
            "reload" => ExploreCommand::Reload,
            "help" | "?" => ExploreCommand::Help,
            "quit" | "exit" => ExploreCommand::Quit,
            other => return Err(anyhow!("unknown command \"{other}\"; try help")),
        };
        Ok(Some(command))
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn handle(session: &Session) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(session, stdin.lock(), &mut stdout.lock(), || session.load())
}

/// Drive a session from `input` until `quit` or end of input.
fn run<R, W, F>(session: &Session, input: R, out: &mut W, mut load: F) -> Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut() -> LoadOutcome,
{
    let mut cache = DatasetCache::new(session.loader.ttl);
    let mut filters = FilterArgs::default();
    writeln!(out, "covtrack explore: type help for commands")?;

    for line in input.lines() {
        let line = line?;
        let command = match ExploreCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err:#}")?;
                continue;
            }
        };
        debug!(?command, "explore command");
        match command {
            ExploreCommand::Countries(names) => {
                writeln!(out, "Countries: {}", names.join(", "))?;
                filters.all_countries = false;
                filters.countries = names;
            }
            ExploreCommand::AllCountries => {
                writeln!(out, "Countries: all locations")?;
                filters.all_countries = true;
                filters.countries.clear();
            }
            ExploreCommand::DefaultCountries => {
                writeln!(out, "Countries: defaults")?;
                filters.all_countries = false;
                filters.countries.clear();
            }
            ExploreCommand::Dates(range) => {
                writeln!(out, "Dates: {} to {}", range.start(), range.end())?;
                filters.start = Some(range.start());
                filters.end = Some(range.end());
            }
            ExploreCommand::AllDates => {
                writeln!(out, "Dates: full range")?;
                filters.start = None;
                filters.end = None;
            }
            ExploreCommand::Metrics(metrics) => {
                let labels: Vec<&str> = metrics.iter().map(|m| m.label()).collect();
                writeln!(out, "Metrics: {}", labels.join(", "))?;
                filters.metrics = metrics;
            }
            ExploreCommand::Show => {
                let outcome = cache.get_or_load(Instant::now(), &mut load);
                match session.request(&filters, &outcome.dataset) {
                    Ok(request) => write_summary(out, &outcome, &request)?,
                    Err(err) => writeln!(out, "error: {err:#}")?,
                }
            }
            ExploreCommand::Reload => {
                cache.invalidate();
                writeln!(out, "Dataset will be reloaded on the next show.")?;
            }
            ExploreCommand::Help => writeln!(out, "{HELP}")?,
            ExploreCommand::Quit => break,
        }
    }
    Ok(())
}
