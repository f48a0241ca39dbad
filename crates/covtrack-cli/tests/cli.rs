use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// A `covtrack` command isolated in `dir` with an empty config file.
fn covtrack(dir: &Path) -> Command {
    let config = dir.join("config.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::cargo_bin("covtrack").unwrap();
    cmd.current_dir(dir)
        .arg("--config")
        .arg(&config)
        .arg("--log-level")
        .arg("warn");
    cmd
}

#[test]
fn covtrack_metrics_lists_columns() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .arg("metrics")
        .assert()
        .success()
        .stdout(predicate::str::contains("people_vaccinated_per_hundred"))
        .stdout(predicate::str::contains("Death Rate (%)"));
}

#[test]
fn covtrack_sample_is_reproducible() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a.csv");
    let second = dir.path().join("b.csv");
    for out in [&first, &second] {
        covtrack(dir.path())
            .args(["sample", "--seed", "11", "-o"])
            .arg(out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 360 sample records"));
    }
    let a = fs::read_to_string(&first).unwrap();
    assert!(a.starts_with("date,location,iso_code,total_cases"));
    assert_eq!(a, fs::read_to_string(&second).unwrap());
}

#[test]
fn covtrack_summary_on_sample_data() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .args([
            "--force-sample",
            "--seed",
            "3",
            "summary",
            "--countries",
            "India,China",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Data source: sample"))
        .stdout(predicate::str::contains("Global Overview"))
        .stdout(predicate::str::contains("Country Comparison"))
        .stdout(predicate::str::contains("India"));
}

#[test]
fn covtrack_summary_follows_date_range() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .args([
            "--force-sample",
            "--seed",
            "3",
            "summary",
            "--countries",
            "India",
            "--start",
            "2021-01-01",
            "--end",
            "2021-06-30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected Period"))
        .stdout(predicate::str::contains("2021-01-31 to 2021-06-30"));
}

#[test]
fn covtrack_offline_without_cache_falls_back() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .args(["--offline", "--seed", "1", "summary", "--all-countries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Using sample data instead"));
}

#[test]
fn covtrack_reads_cached_feed() {
    let dir = tempdir().unwrap();
    let cache = dir.path().join("data/owid-covid-data.csv");
    fs::create_dir_all(cache.parent().unwrap()).unwrap();
    fs::write(
        &cache,
        "iso_code,location,date,total_cases,total_deaths\n\
         KEN,Kenya,2021-01-01,100,5\n\
         KEN,Kenya,2021-02-01,200,20\n\
         OWID_WRL,World,2021-02-01,1000,30\n",
    )
    .unwrap();
    covtrack(dir.path())
        .args(["--offline", "summary", "--countries", "Kenya"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Data source: cached"))
        .stdout(predicate::str::contains("10.00%"));
}

#[test]
fn covtrack_report_writes_html() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out/report.html");
    covtrack(dir.path())
        .args([
            "--force-sample",
            "--seed",
            "2",
            "report",
            "--countries",
            "Brazil,India",
            "--map-metric",
            "people_vaccinated_per_hundred",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote dashboard"));
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("COVID-19 Global Data Tracker"));
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("Global People Vaccinated (%) Distribution"));
}

#[test]
fn covtrack_export_snapshot_view() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("snapshot.csv");
    covtrack(dir.path())
        .args([
            "--force-sample",
            "--seed",
            "4",
            "export",
            "--view",
            "snapshot",
            "--all-countries",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 10 rows"));
    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 11);
}

#[test]
fn covtrack_rejects_inverted_range() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .args([
            "--force-sample",
            "summary",
            "--start",
            "2022-01-01",
            "--end",
            "2021-01-01",
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn covtrack_fetch_offline_without_cache_fails() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .args(["--offline", "fetch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline mode"));
}

#[test]
fn covtrack_explore_reads_stdin() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .args(["--force-sample", "--seed", "8", "explore"])
        .write_stdin("countries Brazil\nshow\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Countries: Brazil"))
        .stdout(predicate::str::contains("Country Comparison"));
}

#[test]
fn covtrack_completions_bash() {
    let dir = tempdir().unwrap();
    covtrack(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("covtrack"));
}
