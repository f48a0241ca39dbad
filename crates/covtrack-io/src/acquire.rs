//! Download the OWID feed into a local cache file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use covtrack_core::{CovError, CovResult, DataOrigin};
use tracing::{debug, info, warn};

pub const DEFAULT_SOURCE_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";
pub const DEFAULT_CACHE_PATH: &str = "data/owid-covid-data.csv";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Streams a remote resource into a writer.
pub trait Fetcher {
    /// Returns the number of bytes written. Any transport failure or non-2xx
    /// status must surface as [`CovError::Network`].
    fn fetch_to(&self, url: &str, dest: &mut dyn Write) -> CovResult<u64>;
}

/// Blocking HTTP fetcher with a whole-request timeout.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_to(&self, url: &str, dest: &mut dyn Write) -> CovResult<u64> {
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => {
                CovError::Network(format!("failed to download {url}: HTTP {code}"))
            }
            ureq::Error::Transport(transport) => {
                CovError::Network(format!("requesting {url}: {transport}"))
            }
        })?;
        if !(200..300).contains(&response.status()) {
            return Err(CovError::Network(format!(
                "failed to download {url}: HTTP {}",
                response.status()
            )));
        }
        let mut reader = response.into_reader();
        io::copy(&mut reader, dest)
            .map_err(|err| CovError::Network(format!("reading response from {url}: {err}")))
    }
}

/// How aggressively [`ensure_cached`] may use the network.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// A cache file older than this is refreshed.
    pub ttl: Duration,
    /// Re-download even when the cache is fresh.
    pub force: bool,
    /// Never touch the network.
    pub offline: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            force: false,
            offline: false,
        }
    }
}

/// A usable local copy of the feed.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub path: PathBuf,
    pub origin: DataOrigin,
    /// Set when a degraded path was taken (stale copy, offline mode).
    pub notice: Option<String>,
}

/// Make sure `path` holds a copy of `url` no older than `policy.ttl`.
///
/// A failed refresh of an existing stale copy keeps that copy. Only when no
/// local copy exists does the failure reach the caller.
pub fn ensure_cached(
    url: &str,
    path: &Path,
    policy: &CachePolicy,
    fetcher: &dyn Fetcher,
    now: SystemTime,
) -> CovResult<Acquired> {
    let age = cache_age(path, now);
    let cached = |notice: Option<String>| Acquired {
        path: path.to_path_buf(),
        origin: DataOrigin::Cached,
        notice,
    };

    if let Some(age) = age {
        if !policy.force && age <= policy.ttl {
            debug!(path = %path.display(), age_secs = age.as_secs(), "cache is fresh");
            return Ok(cached(None));
        }
    }

    if policy.offline {
        return match age {
            Some(age) => Ok(cached(Some(format!(
                "Offline mode: using cached dataset ({} old).",
                describe_age(age)
            )))),
            None => Err(CovError::Network(format!(
                "offline mode and no cached dataset at {}",
                path.display()
            ))),
        };
    }

    match download_to_path(url, path, fetcher) {
        Ok(bytes) => {
            info!(url, path = %path.display(), bytes, "download complete");
            Ok(Acquired {
                path: path.to_path_buf(),
                origin: DataOrigin::Downloaded,
                notice: None,
            })
        }
        Err(err) if age.is_some() => {
            warn!(error = %err, path = %path.display(), "refresh failed; keeping stale cache");
            Ok(cached(Some(format!(
                "Error downloading the dataset: {err}. Using the previously cached copy."
            ))))
        }
        Err(err) => Err(err),
    }
}

/// Age of the cache file, or `None` when it does not exist.
pub fn cache_age(path: &Path, now: SystemTime) -> Option<Duration> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(now.duration_since(modified).unwrap_or(Duration::ZERO))
}

/// Write the download next to `dest` first so an interrupted transfer never
/// replaces a good cache file.
fn download_to_path(url: &str, dest: &Path, fetcher: &dyn Fetcher) -> CovResult<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let partial = partial_path(dest);
    let result = (|| -> CovResult<u64> {
        let mut file = File::create(&partial)?;
        let bytes = fetcher.fetch_to(url, &mut file)?;
        file.flush()?;
        Ok(bytes)
    })();
    match result {
        Ok(bytes) => {
            fs::rename(&partial, dest)?;
            Ok(bytes)
        }
        Err(err) => {
            let _ = fs::remove_file(&partial);
            Err(err)
        }
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "download".into());
    name.push(".part");
    dest.with_file_name(name)
}

fn describe_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs >= 86_400 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    /// Serves a canned body (or a canned failure) and counts calls.
    pub(crate) struct StubFetcher {
        pub body: Option<Vec<u8>>,
        pub calls: Cell<usize>,
    }

    impl StubFetcher {
        pub fn ok(body: &str) -> Self {
            Self {
                body: Some(body.as_bytes().to_vec()),
                calls: Cell::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                body: None,
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for StubFetcher {
        fn fetch_to(&self, url: &str, dest: &mut dyn Write) -> CovResult<u64> {
            self.calls.set(self.calls.get() + 1);
            match &self.body {
                Some(body) => {
                    dest.write_all(body)?;
                    Ok(body.len() as u64)
                }
                None => Err(CovError::Network(format!("requesting {url}: timed out"))),
            }
        }
    }

    #[test]
    fn downloads_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/owid.csv");
        let fetcher = StubFetcher::ok("date,location\n");
        let acquired = ensure_cached(
            "https://example.test/owid.csv",
            &path,
            &CachePolicy::default(),
            &fetcher,
            SystemTime::now(),
        )
        .unwrap();
        assert_eq!(acquired.origin, DataOrigin::Downloaded);
        assert_eq!(fs::read_to_string(&path).unwrap(), "date,location\n");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn fresh_cache_skips_network() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("owid.csv");
        fs::write(&path, "cached").unwrap();
        let fetcher = StubFetcher::ok("new");
        let acquired = ensure_cached(
            "u",
            &path,
            &CachePolicy::default(),
            &fetcher,
            SystemTime::now(),
        )
        .unwrap();
        assert_eq!(acquired.origin, DataOrigin::Cached);
        assert_eq!(fetcher.calls.get(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "cached");
    }

    #[test]
    fn expired_cache_is_refreshed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("owid.csv");
        fs::write(&path, "old").unwrap();
        let fetcher = StubFetcher::ok("new");
        let later = SystemTime::now() + Duration::from_secs(7200);
        let acquired =
            ensure_cached("u", &path, &CachePolicy::default(), &fetcher, later).unwrap();
        assert_eq!(acquired.origin, DataOrigin::Downloaded);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn failed_refresh_keeps_stale_copy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("owid.csv");
        fs::write(&path, "old").unwrap();
        let fetcher = StubFetcher::failing();
        let later = SystemTime::now() + Duration::from_secs(7200);
        let acquired =
            ensure_cached("u", &path, &CachePolicy::default(), &fetcher, later).unwrap();
        assert_eq!(acquired.origin, DataOrigin::Cached);
        assert!(acquired.notice.unwrap().contains("timed out"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn failure_without_cache_is_network_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("owid.csv");
        let err = ensure_cached(
            "u",
            &path,
            &CachePolicy::default(),
            &StubFetcher::failing(),
            SystemTime::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CovError::Network(_)));
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn offline_never_fetches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("owid.csv");
        let fetcher = StubFetcher::ok("new");
        let policy = CachePolicy {
            offline: true,
            ..CachePolicy::default()
        };
        let err = ensure_cached("u", &path, &policy, &fetcher, SystemTime::now()).unwrap_err();
        assert!(matches!(err, CovError::Network(_)));
        assert_eq!(fetcher.calls.get(), 0);
    }

    #[test]
    fn force_redownloads_fresh_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("owid.csv");
        fs::write(&path, "old").unwrap();
        let fetcher = StubFetcher::ok("new");
        let policy = CachePolicy {
            force: true,
            ..CachePolicy::default()
        };
        ensure_cached("u", &path, &policy, &fetcher, SystemTime::now()).unwrap();
        assert_eq!(fetcher.calls.get(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
