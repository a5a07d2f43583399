//! Filename extraction, sanitization, and collision-free path resolution.

use std::path::{Component, Path, PathBuf};

use tracing::debug;
use url::Url;

use super::constants::FALLBACK_FILENAME;

/// Derives the local filename for a download from the URL's last path segment.
///
/// The segment is percent-decoded and sanitized so it always names a file
/// directly inside the output directory. URLs whose path ends in `/` (or has
/// no path at all) fall back to [`FALLBACK_FILENAME`].
///
/// # Examples
///
/// ```
/// use coursegrab_core::download::filename_from_url;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/_media/course/lecture%201.pdf").unwrap();
/// assert_eq!(filename_from_url(&url), "lecture 1.pdf");
///
/// let url = Url::parse("https://example.com/course/").unwrap();
/// assert_eq!(filename_from_url(&url), "downloaded_file");
/// ```
#[must_use]
pub fn filename_from_url(url: &Url) -> String {
    if let Some(mut segments) = url.path_segments()
        && let Some(last) = segments.next_back()
        && !last.is_empty()
    {
        let decoded = urlencoding::decode(last)
            .map(std::borrow::Cow::into_owned)
            .unwrap_or_else(|e| {
                debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
                last.to_string()
            });
        return sanitize_filename(&decoded);
    }

    FALLBACK_FILENAME.to_string()
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Resolves a path under `dir` that does not exist yet.
///
/// `name.ext` is tried first, then `name_1.ext`, `name_2.ext`, … until a free
/// name is found. Existing files are never returned, so they are never
/// overwritten. The check is not atomic; a single writer is assumed.
#[must_use]
pub fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = sanitize_filename(filename);
    let base_path = dir.join(&filename);

    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = split_extension(&filename);
    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Splits `name.ext` into `("name", ".ext")`. Dotfiles have no extension.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
