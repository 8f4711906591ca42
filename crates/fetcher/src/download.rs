//! Download manager with existence-check dedup.
//!
//! Key behaviour:
//! - A destination file that already exists is returned untouched, with no
//!   network request
//! - Bodies are streamed to disk in fixed-size chunks
//! - `download_many` isolates failures per URL and keeps going
//!
//! The exists-then-write check is not atomic. Two processes downloading into
//! the same directory can race; a crash mid-transfer can leave a partial file
//! that later runs will treat as complete.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{debug, error, info, instrument};

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};

/// Create `path` and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> FetchResult<PathBuf> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| FetchError::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Join a base URL and a filename with exactly one `/` between them.
///
/// Trailing slashes on `base_url` are dropped; neither part is validated.
pub fn build_url(base_url: &str, filename: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), filename)
}

/// The last `/`-separated segment of a URL, used as the local filename.
pub fn local_filename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Outcome of a batch download.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Local paths obtained, in input order
    pub downloaded: Vec<PathBuf>,
    /// URLs that failed, with the reason
    pub failures: Vec<DownloadFailure>,
}

impl DownloadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single URL that could not be fetched.
#[derive(Debug)]
pub struct DownloadFailure {
    pub url: String,
    pub error: FetchError,
}

/// Blocking HTTP fetcher.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .tcp_nodelay(true)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Make sure `out_dir/<last segment of url>` exists locally.
    ///
    /// Returns the existing path without touching the network when the file
    /// is already there. Otherwise streams the body to that path. Errors
    /// propagate; a partially written file may remain on failure.
    #[instrument(skip_all, fields(url = %url))]
    pub fn download_one(&self, url: &str, out_dir: impl AsRef<Path>) -> FetchResult<PathBuf> {
        let out_dir = ensure_dir(out_dir)?;
        let filename = local_filename(url);
        if filename.is_empty() {
            return Err(FetchError::NoFilename(url.to_string()));
        }
        let out_path = out_dir.join(filename);

        if out_path.exists() {
            info!(path = %out_path.display(), "File already exists, skipping download");
            return Ok(out_path);
        }

        info!(url = %url, path = %out_path.display(), "Starting download");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Http {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = self.stream_to_file(url, response, &out_path)?;

        info!(path = %out_path.display(), bytes = bytes, "Download completed");
        Ok(out_path)
    }

    /// Download every URL in order, skipping the ones that fail.
    ///
    /// Failures are logged and left out of the result. Only a failure to
    /// create `out_dir` is returned as an error.
    pub fn download_many<I, S>(&self, urls: I, out_dir: impl AsRef<Path>) -> FetchResult<Vec<PathBuf>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.download_many_report(urls, out_dir)?.downloaded)
    }

    /// Like [`download_many`](Self::download_many) but also returns the failures.
    pub fn download_many_report<I, S>(
        &self,
        urls: I,
        out_dir: impl AsRef<Path>,
    ) -> FetchResult<DownloadReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let out_dir = ensure_dir(out_dir)?;
        let mut report = DownloadReport::default();

        for url in urls {
            let url = url.as_ref();
            match self.download_one(url, &out_dir) {
                Ok(path) => report.downloaded.push(path),
                Err(e) => {
                    error!(url = %url, error = %e, "Download failed, skipping");
                    report.failures.push(DownloadFailure {
                        url: url.to_string(),
                        error: e,
                    });
                }
            }
        }

        debug!(
            downloaded = report.downloaded.len(),
            failed = report.failures.len(),
            "Batch download finished"
        );
        Ok(report)
    }

    /// Copy the response body to `path` one chunk at a time.
    fn stream_to_file(
        &self,
        url: &str,
        mut response: reqwest::blocking::Response,
        path: &Path,
    ) -> FetchResult<u64> {
        let mut file = File::create(path).map_err(|e| FetchError::io(path, e))?;
        let mut buf = vec![0u8; self.config.chunk_size.max(1)];
        let mut written = 0u64;

        loop {
            let n = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(FetchError::Body {
                        url: url.to_string(),
                        source: e,
                    })
                }
            };
            file.write_all(&buf[..n])
                .map_err(|e| FetchError::io(path, e))?;
            written += n as u64;
        }

        file.flush().map_err(|e| FetchError::io(path, e))?;
        file.sync_all().map_err(|e| FetchError::io(path, e))?;

        Ok(written)
    }
}

/// [`Fetcher::download_one`] with a default-configured fetcher.
pub fn download_one(url: &str, out_dir: impl AsRef<Path>) -> FetchResult<PathBuf> {
    Fetcher::new(FetchConfig::default())?.download_one(url, out_dir)
}

/// [`Fetcher::download_many`] with a default-configured fetcher.
pub fn download_many<I, S>(urls: I, out_dir: impl AsRef<Path>) -> FetchResult<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Fetcher::new(FetchConfig::default())?.download_many(urls, out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_normalizes_trailing_slash() {
        assert_eq!(
            build_url("https://example.com/data/", "file.nc"),
            "https://example.com/data/file.nc"
        );
        assert_eq!(
            build_url("https://example.com/data", "file.nc"),
            "https://example.com/data/file.nc"
        );
        assert_eq!(
            build_url("https://example.com/data//", "file.nc"),
            "https://example.com/data/file.nc"
        );
    }

    #[test]
    fn test_local_filename() {
        assert_eq!(local_filename("https://example.com/a/b/scene.nc"), "scene.nc");
        assert_eq!(local_filename("scene.nc"), "scene.nc");
        assert_eq!(local_filename("https://example.com/a/"), "");
    }

    #[test]
    fn test_ensure_dir_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a").join("b");
        assert_eq!(ensure_dir(&target).unwrap(), target);
        assert_eq!(ensure_dir(&target).unwrap(), target);
        assert!(target.is_dir());
    }

    #[test]
    fn test_download_one_rejects_url_without_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let err = fetcher
            .download_one("http://127.0.0.1:9/data/", tmp.path())
            .unwrap_err();
        assert!(matches!(err, FetchError::NoFilename(_)));
    }
}
