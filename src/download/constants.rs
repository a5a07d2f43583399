//! Constants for the download module (timeouts, filename fallback).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle read timeout (5 minutes without receiving data).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Name used when a URL path has no final segment (e.g. `https://host/dir/`).
pub const FALLBACK_FILENAME: &str = "downloaded_file";
