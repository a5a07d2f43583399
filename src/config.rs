//! Run configuration: the page, the patterns, and where files land.
//!
//! A [`HarvestConfig`] is built once at startup and passed by reference to
//! every component. Nothing in it changes during a run.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use url::Url;

use crate::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::restrict::RestrictionFilter;

/// Default directory downloads are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Default inclusion pattern: PDF files under a wiki `_media` directory.
pub const DEFAULT_PATTERN: &str = r"/_media/.*\.pdf$";

/// Default restriction words.
pub const DEFAULT_RESTRICTIONS: [&str; 3] = ["plenum", "lf-plenum", "oving"];

/// Errors detected while building the configuration, before any request.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The inclusion pattern is not a valid regular expression.
    #[error("invalid regex pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A restriction word is not a valid regular expression.
    #[error("invalid restriction pattern `{word}`: {source}")]
    InvalidRestriction {
        word: String,
        #[source]
        source: regex::Error,
    },

    /// The page URL is not an absolute http(s) URL.
    #[error("invalid page URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ConfigError {
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    pub fn invalid_restriction(word: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidRestriction {
            word: word.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Compiles `pattern` with case-insensitive matching.
pub(crate) fn compile_case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// HTTP timeouts applied to every request of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect_secs: u64,
    /// Longest gap between two reads; the total transfer time is unbounded.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// Immutable configuration for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    page_url: Url,
    inclusion: Regex,
    restrictions: RestrictionFilter,
    output_dir: PathBuf,
    timeouts: HttpTimeouts,
}

impl HarvestConfig {
    /// Course preset: default pattern, default restrictions, `downloads/`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `page_url` is not an absolute http(s) URL.
    pub fn course(page_url: &str) -> Result<Self, ConfigError> {
        Self::custom(page_url, DEFAULT_PATTERN, DEFAULT_RESTRICTIONS)
    }

    /// Fully configurable preset.
    ///
    /// The inclusion pattern is compiled before the restriction words, so an
    /// invalid inclusion pattern is reported first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is invalid or any pattern fails to compile.
    pub fn custom<I, S>(page_url: &str, pattern: &str, restrictions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inclusion = compile_case_insensitive(pattern)
            .map_err(|source| ConfigError::invalid_pattern(pattern, source))?;
        let restrictions = RestrictionFilter::new(restrictions)?;
        let page_url = parse_page_url(page_url)?;

        Ok(Self {
            page_url,
            inclusion,
            restrictions,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeouts: HttpTimeouts::default(),
        })
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the HTTP timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: HttpTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    #[must_use]
    pub fn inclusion(&self) -> &Regex {
        &self.inclusion
    }

    #[must_use]
    pub fn restrictions(&self) -> &RestrictionFilter {
        &self.restrictions
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn timeouts(&self) -> HttpTimeouts {
        self.timeouts
    }
}

fn parse_page_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::invalid_url(raw, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::invalid_url(
            raw,
            format!("unsupported scheme `{other}`"),
        )),
    }
}
