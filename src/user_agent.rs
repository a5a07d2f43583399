//! User-Agent string shared by page and file requests.

/// Default User-Agent (identifies the tool and its version, nothing more).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("coursegrab/{version}")
}
