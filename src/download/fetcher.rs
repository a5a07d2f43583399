//! Per-link fetch: restriction check, then collision-safe download.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use url::Url;

use super::client::HttpClient;
use super::error::StoreError;
use super::filename::filename_from_url;
use crate::restrict::RestrictionFilter;

/// What happened to a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The filename matched a restriction; nothing was requested or written.
    Skipped {
        /// Filename derived from the URL.
        filename: String,
    },
    /// The file was written.
    Downloaded {
        /// Where the file landed.
        path: PathBuf,
        /// Body size in bytes.
        bytes: u64,
    },
}

/// Downloads `file_url` into `output_dir` unless its filename is restricted.
///
/// The filename comes from the URL's last path segment. A restricted file is
/// skipped before any network request. Otherwise the file is streamed to a
/// path that does not exist yet (`name.ext`, `name_1.ext`, …).
///
/// # Errors
///
/// Returns `StoreError` on network/HTTP failure or when the file cannot be
/// written. These errors concern this link only.
#[instrument(skip(client, output_dir, restrictions), fields(url = %file_url))]
pub async fn fetch_and_store(
    client: &HttpClient,
    file_url: &Url,
    output_dir: &Path,
    restrictions: &RestrictionFilter,
) -> Result<FetchOutcome, StoreError> {
    let filename = filename_from_url(file_url);

    if let Some(word) = restrictions.matching_word(&filename) {
        info!(filename = %filename, restriction = word, "Skipping restricted file");
        return Ok(FetchOutcome::Skipped { filename });
    }

    let downloaded = client
        .download_to_file(file_url, output_dir, &filename)
        .await?;

    Ok(FetchOutcome::Downloaded {
        path: downloaded.path,
        bytes: downloaded.bytes,
    })
}
