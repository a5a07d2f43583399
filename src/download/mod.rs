//! HTTP fetching and streaming file persistence.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Filename taken from the URL's last path segment
//! - Configurable timeouts (30s connect, 5min idle read by default)
//! - Duplicate filename handling (adds numeric suffix, never overwrites)
//! - Restriction check before any request is made
//!
//! # Example
//!
//! ```no_run
//! use coursegrab_core::download::{FetchOutcome, HttpClient, fetch_and_store};
//! use coursegrab_core::restrict::RestrictionFilter;
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let restrictions = RestrictionFilter::new(["plenum"])?;
//! let url = Url::parse("https://example.com/_media/notes.pdf")?;
//! match fetch_and_store(&client, &url, Path::new("./downloads"), &restrictions).await? {
//!     FetchOutcome::Downloaded { path, .. } => println!("Downloaded: {}", path.display()),
//!     FetchOutcome::Skipped { filename } => println!("Skipped: {filename}"),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod fetcher;
mod filename;

pub use client::{DownloadedFile, HttpClient};
pub use error::{FetchError, FilesystemError, StoreError};
pub use fetcher::{FetchOutcome, fetch_and_store};
pub use filename::{filename_from_url, resolve_unique_path};
