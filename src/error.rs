//! Error types for the scraping pipeline
//!
//! The taxonomy mirrors the containment policy: everything below `Runtime`
//! is recovered inside a single store's pipeline and downgraded to a
//! null-price result; only a browser-runtime fault fails the whole request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Missing or empty query; rejected before any scraping starts.
    #[error("empty query")]
    EmptyQuery,

    /// Timeout or network error loading a search or product page.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Sort UI interaction failed or timed out. Silently ignored by callers;
    /// carried as a variant so the suppression site stays explicit.
    #[error("sort attempt failed: {0}")]
    SortAttempt(String),

    /// Structured-data parse problem or missing price markup.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Browser process failed to launch or died. Fatal for the request.
    #[error("browser runtime failure: {0}")]
    Runtime(String),
}

impl ScrapeError {
    /// Whether this fault must abort the whole request instead of being
    /// contained within one store's pipeline.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::Runtime(_))
    }
}

impl From<anyhow::Error> for ScrapeError {
    fn from(error: anyhow::Error) -> Self {
        ScrapeError::Runtime(error.to_string())
    }
}
