//! Query parameters and result records
//!
//! Everything here is created fresh for a single query and dropped once the
//! response has been produced.

use crate::HarvestError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted range for the number of results crawled per query
pub const MAX_RESULTS_RANGE: RangeInclusive<usize> = 1..=5;

/// Accepted range for the extracted context length per result
pub const MAX_CONTENT_RANGE: RangeInclusive<usize> = 100..=5000;

/// Number of results crawled when the caller does not say
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Context length used when the caller does not say
pub const DEFAULT_MAX_CONTENT: usize = 2000;

/// Navigation timeout used when the caller does not say
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters of a single search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// The search terms
    pub query: String,

    /// Maximum number of entries crawled for content
    pub max_results: usize,

    /// Maximum number of characters of extracted text per result
    pub max_content: usize,

    /// Timeout applied to every navigation
    pub timeout: Duration,
}

impl QueryParams {
    /// Creates query parameters with the default navigation timeout
    pub fn new(query: impl Into<String>, max_results: usize, max_content: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            max_content,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the navigation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks the bounds enforced at the request boundary
    ///
    /// The core never calls this itself: it trusts whatever it is handed.
    /// The HTTP layer and the CLI validate before invoking it.
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.query.trim().is_empty() {
            return Err(HarvestError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }

        if !MAX_RESULTS_RANGE.contains(&self.max_results) {
            return Err(HarvestError::InvalidQuery(format!(
                "max_results must be between {} and {}",
                MAX_RESULTS_RANGE.start(),
                MAX_RESULTS_RANGE.end()
            )));
        }

        if !MAX_CONTENT_RANGE.contains(&self.max_content) {
            return Err(HarvestError::InvalidQuery(format!(
                "max_content must be between {} and {}",
                MAX_CONTENT_RANGE.start(),
                MAX_CONTENT_RANGE.end()
            )));
        }

        if self.timeout.is_zero() {
            return Err(HarvestError::InvalidQuery(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// A search result reference parsed from a mirror's result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Engine attribution label (empty when the page carries none)
    pub source: String,

    /// Absolute URL of the result
    pub link: String,
}

impl ResultEntry {
    pub fn new(source: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            link: link.into(),
        }
    }
}

/// A result entry together with the text extracted from its target page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedResult {
    pub source: String,
    pub link: String,

    /// Extracted text, the no-content sentinel, or a fetch diagnostic
    pub context: String,
}

impl EnrichedResult {
    /// Pairs an entry with the context produced for it
    pub fn from_entry(entry: ResultEntry, context: impl Into<String>) -> Self {
        Self {
            source: entry.source,
            link: entry.link,
            context: context.into(),
        }
    }
}
