//! Link extraction from the crawled page.
//!
//! The page is parsed with a tolerant HTML parser. Every `<a href>` whose raw
//! href text matches the inclusion pattern (search anywhere, not full match)
//! is resolved against the page URL. Results are deduplicated.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::download::{FetchError, HttpClient};

#[allow(clippy::expect_used)]
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid")); // Static selector, safe to panic

/// Fetches `page_url` and returns the distinct absolute URLs of matching links.
///
/// # Errors
///
/// Returns `FetchError` if the page request fails or returns a non-2xx status.
/// Markup problems never fail; they only reduce what is found.
#[instrument(skip(client, inclusion), fields(url = %page_url, pattern = %inclusion))]
pub async fn extract_links(
    client: &HttpClient,
    page_url: &Url,
    inclusion: &Regex,
) -> Result<BTreeSet<Url>, FetchError> {
    info!(url = %page_url, "Fetching page");
    let body = client.get_page(page_url).await?;

    let links = extract_links_from_html(&body, page_url, inclusion);
    info!(
        count = links.len(),
        "Found matching links (before restriction filter)"
    );
    Ok(links)
}

/// Collects matching links from already-fetched markup.
///
/// Hrefs are matched as written in the page, before resolution. Hrefs that
/// cannot be resolved against `base_url` are skipped.
///
/// # Examples
///
/// ```
/// use coursegrab_core::extract::extract_links_from_html;
/// use regex::Regex;
/// use url::Url;
///
/// let base = Url::parse("https://wiki.example.edu/course/start").unwrap();
/// let pattern = Regex::new(r"/_media/.*\.pdf$").unwrap();
/// let html = r#"<a href="/_media/course/notes.pdf">Notes</a><a href="/about">About</a>"#;
///
/// let links = extract_links_from_html(html, &base, &pattern);
/// assert_eq!(links.len(), 1);
/// assert!(links.contains(&Url::parse("https://wiki.example.edu/_media/course/notes.pdf").unwrap()));
/// ```
#[must_use]
pub fn extract_links_from_html(html: &str, base_url: &Url, inclusion: &Regex) -> BTreeSet<Url> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !inclusion.is_match(href) {
            trace!(href, "href does not match inclusion pattern");
            continue;
        }
        match base_url.join(href) {
            Ok(resolved) => {
                trace!(href, url = %resolved, "matched link");
                links.insert(resolved);
            }
            Err(e) => debug!(href, error = %e, "skipping unresolvable href"),
        }
    }

    links
}
