//! Cached HTTP downloads with a post-request rate-limit pause.

use crate::cache::DownloadCache;
use crate::error::{AbpError, AbpResult};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// User agent sent with every request.
const USER_AGENT: &str = "abp/0.1";

/// Pause after every live network exchange, to stay under the rate-limit
/// tolerance of scraped sites.
const FETCH_PAUSE: Duration = Duration::from_millis(500);

pub struct Fetcher {
    client: reqwest::blocking::Client,
    cache: DownloadCache,
    pause: Duration,
}

impl Fetcher {
    pub fn new(cache: DownloadCache) -> Self {
        Self::with_pause(cache, FETCH_PAUSE)
    }

    /// A fetcher with a custom post-request pause. Tests use zero.
    pub fn with_pause(cache: DownloadCache, pause: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            cache,
            pause,
        }
    }

    pub fn cache(&self) -> &DownloadCache {
        &self.cache
    }

    /// Downloads `url` (with `query` URL-encoded and appended) into the
    /// cache entry `filename`, returning the cached file.
    ///
    /// An existing entry is returned as-is without touching the network.
    /// A non-success status does not create an entry; the error carries
    /// the status and response body.
    pub fn download(&self, url: &str, filename: &str, query: &str) -> AbpResult<PathBuf> {
        log::debug!("    GET '{}{}'", url, query);
        if self.cache.exists(filename) {
            let cache_file = self.cache.path_for(filename);
            log::debug!("        Using cached file: {}", cache_file.display());
            return Ok(cache_file);
        }

        let full_url = format!("{}{}", url, urlencoding::encode(query));
        let result = self.fetch_into_cache(&full_url, filename);
        thread::sleep(self.pause);
        result
    }

    fn fetch_into_cache(&self, url: &str, filename: &str) -> AbpResult<PathBuf> {
        let mut response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AbpError::HttpStatus { status, body });
        }
        self.cache.put_stream(filename, &mut response)
    }

    /// Like [`Fetcher::download`], but decodes the cached file as text.
    pub fn download_text(&self, url: &str, query: &str, filename: &str) -> AbpResult<String> {
        let path = self.download(url, filename, query)?;
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
