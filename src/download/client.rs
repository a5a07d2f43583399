//! HTTP client wrapper for fetching pages and streaming files to disk.
//!
//! This module provides the `HttpClient` struct which handles the page GET and
//! streaming downloads with timeout configuration and error handling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::{FetchError, FilesystemError, StoreError};
use super::filename::resolve_unique_path;
use crate::user_agent;

/// HTTP client for the page fetch and file downloads.
///
/// Created once per run and reused for every request, taking advantage of
/// connection pooling. Requests are only ever issued one at a time.
///
/// # Example
///
/// ```no_run
/// use coursegrab_core::download::HttpClient;
/// use std::path::Path;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let url = Url::parse("https://example.com/_media/notes.pdf")?;
/// let file = client.download_to_file(&url, Path::new("./downloads"), "notes.pdf").await?;
/// println!("Downloaded to: {}", file.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// A file written by [`HttpClient::download_to_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Final output path (after collision avoidance).
    pub path: PathBuf,
    /// Number of body bytes written.
    pub bytes: u64,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes without receiving any data
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// `read_timeout_secs` bounds each read, not the whole request, so a slow
    /// body that keeps arriving is never cut off.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches a page and returns its body decoded as text.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the request fails, times out, the server answers
    /// with a non-2xx status, or the body cannot be read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_page(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.send_get(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;
        debug!(bytes = body.len(), "page body received");
        Ok(body)
    }

    /// Downloads `url` into `output_dir` under `filename`, never overwriting.
    ///
    /// The destination is resolved before the request is sent: if
    /// `output_dir/filename` exists a numeric suffix is inserted before the
    /// extension. The directory is created (recursively) only once the server
    /// has answered successfully. The body is streamed to disk chunk by chunk;
    /// if streaming fails, the partial file is removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` for network/HTTP failures and
    /// `StoreError::Filesystem` when the directory or file cannot be written.
    #[must_use = "download result contains the path to the downloaded file"]
    #[instrument(skip(self, output_dir), fields(url = %url))]
    pub async fn download_to_file(
        &self,
        url: &Url,
        output_dir: &Path,
        filename: &str,
    ) -> Result<DownloadedFile, StoreError> {
        let file_path = resolve_unique_path(output_dir, filename);
        info!(path = %file_path.display(), "downloading");

        let response = self.send_get(url).await?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| FilesystemError::create_dir(output_dir.to_path_buf(), e))?;

        let mut file = File::create(&file_path)
            .await
            .map_err(|e| FilesystemError::write(file_path.clone(), e))?;

        let stream_result = stream_to_file(&mut file, response, url.as_str(), &file_path).await;
        drop(file);

        if stream_result.is_err() {
            debug!(path = %file_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&file_path).await;
        }
        let bytes = stream_result?;

        info!(path = %file_path.display(), bytes, "download complete");

        Ok(DownloadedFile {
            path: file_path,
            bytes,
        })
    }

    async fn send_get(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }

        Ok(response)
    }
}

/// Streams response body to file, returning bytes written.
///
/// Extracted so the caller can clean up on error.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, StoreError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FilesystemError::write(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FilesystemError::write(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
