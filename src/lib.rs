//! Coursegrab Core Library
//!
//! Downloads the course material linked from a single web page: links whose
//! href matches an inclusion pattern are collected, filenames matching a
//! restriction are skipped, and the rest are streamed into an output
//! directory without ever overwriting an existing file.
//!
//! # Architecture
//!
//! - [`config`] - Immutable run configuration and pattern compilation
//! - [`extract`] - Page fetch and link extraction
//! - [`restrict`] - Restriction filter over filenames
//! - [`download`] - HTTP client, streaming persistence, per-link fetch
//! - [`harvest`] - The sequential pipeline tying the above together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod extract;
pub mod harvest;
pub mod restrict;
mod user_agent;

// Re-export commonly used types
pub use config::{
    ConfigError, DEFAULT_OUTPUT_DIR, DEFAULT_PATTERN, DEFAULT_RESTRICTIONS, HarvestConfig,
    HttpTimeouts,
};
pub use download::{
    FetchError, FetchOutcome, FilesystemError, HttpClient, StoreError, fetch_and_store,
};
pub use extract::{extract_links, extract_links_from_html};
pub use harvest::{HarvestStats, LinkPreview, preview_harvest, run_harvest};
pub use restrict::{RestrictionFilter, is_restricted};
