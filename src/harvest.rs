//! The harvest pipeline: extract links from one page, then fetch each in turn.
//!
//! A failed page fetch aborts the run. A failed download only affects its own
//! link; the failure is logged and the next link is processed.

use tracing::{info, instrument, warn};
use url::Url;

use crate::config::HarvestConfig;
use crate::download::{FetchError, FetchOutcome, HttpClient, fetch_and_store, filename_from_url};
use crate::extract::extract_links;

/// Counts collected over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestStats {
    found: usize,
    downloaded: usize,
    skipped: usize,
    failed: usize,
}

impl HarvestStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct matching links on the page.
    #[must_use]
    pub fn found(&self) -> usize {
        self.found
    }

    /// Returns the number of files written.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Returns the number of links skipped by the restriction filter.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the number of links whose download failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Downloaded { .. } => self.downloaded += 1,
            FetchOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Runs the whole pipeline for `config`.
///
/// Links are processed one at a time in URL order.
///
/// # Errors
///
/// Returns `FetchError` only when the page itself cannot be fetched. Per-link
/// download failures are counted in [`HarvestStats::failed`] instead.
#[instrument(skip_all, fields(page = %config.page_url()))]
pub async fn run_harvest(
    client: &HttpClient,
    config: &HarvestConfig,
) -> Result<HarvestStats, FetchError> {
    let links = extract_links(client, config.page_url(), config.inclusion()).await?;
    let mut stats = HarvestStats::new();
    stats.found = links.len();

    if links.is_empty() {
        warn!("No matching links found");
        return Ok(stats);
    }

    for link in &links {
        match fetch_and_store(client, link, config.output_dir(), config.restrictions()).await {
            Ok(outcome) => stats.record(&outcome),
            Err(error) => {
                warn!(url = %link, error = %error, "Failed to download");
                stats.failed += 1;
            }
        }
    }

    info!(
        found = stats.found,
        downloaded = stats.downloaded,
        skipped = stats.skipped,
        failed = stats.failed,
        "Harvest complete"
    );
    Ok(stats)
}

/// A matched link as it would be handled, without downloading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPreview {
    pub url: Url,
    pub filename: String,
    /// Restriction word that would cause a skip, if any.
    pub restricted_by: Option<String>,
}

impl LinkPreview {
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.restricted_by.is_some()
    }
}

/// Fetches and filters the page like [`run_harvest`] but writes nothing.
///
/// # Errors
///
/// Returns `FetchError` when the page cannot be fetched.
pub async fn preview_harvest(
    client: &HttpClient,
    config: &HarvestConfig,
) -> Result<Vec<LinkPreview>, FetchError> {
    let links = extract_links(client, config.page_url(), config.inclusion()).await?;

    Ok(links
        .into_iter()
        .map(|url| {
            let filename = filename_from_url(&url);
            let restricted_by = config
                .restrictions()
                .matching_word(&filename)
                .map(str::to_string);
            LinkPreview {
                url,
                filename,
                restricted_by,
            }
        })
        .collect())
}
