//! Restriction filter: decides which filenames are skipped.
//!
//! Each restriction is a case-insensitive regular expression searched for
//! anywhere in the filename (not the full URL). A filename is restricted as
//! soon as one pattern matches.

use regex::Regex;

use crate::config::{ConfigError, compile_case_insensitive};

/// Returns `true` if any pattern matches somewhere in `filename`.
///
/// An empty pattern list never restricts anything.
///
/// # Examples
///
/// ```
/// use coursegrab_core::restrict::is_restricted;
/// use regex::RegexBuilder;
///
/// let plenum = RegexBuilder::new("plenum").case_insensitive(true).build().unwrap();
/// assert!(is_restricted("LF-Plenum-2024.pdf", &[plenum.clone()]));
/// assert!(!is_restricted("notes.pdf", &[plenum]));
/// assert!(!is_restricted("notes.pdf", &[]));
/// ```
#[must_use]
pub fn is_restricted(filename: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(filename))
}

/// Compiled restriction patterns together with the words they came from.
#[derive(Debug, Clone, Default)]
pub struct RestrictionFilter {
    words: Vec<String>,
    patterns: Vec<Regex>,
}

impl RestrictionFilter {
    /// Compiles each word as a case-insensitive pattern, preserving order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRestriction` for the first word that is
    /// not a valid regular expression.
    pub fn new<I, S>(words: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        for word in words {
            let word = word.into();
            let pattern = compile_case_insensitive(&word)
                .map_err(|source| ConfigError::invalid_restriction(&word, source))?;
            filter.words.push(word);
            filter.patterns.push(pattern);
        }
        Ok(filter)
    }

    /// A filter that restricts nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if `filename` matches any restriction.
    #[must_use]
    pub fn is_restricted(&self, filename: &str) -> bool {
        is_restricted(filename, &self.patterns)
    }

    /// Returns the first restriction word matching `filename`, for log output.
    #[must_use]
    pub fn matching_word(&self, filename: &str) -> Option<&str> {
        self.patterns
            .iter()
            .position(|pattern| pattern.is_match(filename))
            .map(|index| self.words[index].as_str())
    }

    /// Source words, in configuration order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
