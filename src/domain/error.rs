//! Error types for the collection and enrichment pipelines.
//!
//! Page- and record-level failures are swallowed by their own loop iteration;
//! everything else aborts the run. `is_fatal` encodes that split.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("failed to parse listing page {page}: {reason}")]
    PageParse { page: u32, reason: String },

    #[error("enrichment miss for '{school}': {reason}")]
    EnrichmentMiss { school: String, reason: String },

    #[error("browser session error: {0}")]
    Session(String),

    #[error("record store I/O failed for {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSS selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

impl ScrapeError {
    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn page_parse(page: u32, reason: impl Into<String>) -> Self {
        Self::PageParse {
            page,
            reason: reason.into(),
        }
    }

    pub fn enrichment_miss(school: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnrichmentMiss {
            school: school.into(),
            reason: reason.into(),
        }
    }

    pub fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Store {
            path: path.into(),
            source,
        }
    }

    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the whole run. Page and record level
    /// failures are logged and skipped by the loops that produce them.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::PageParse { .. } | Self::EnrichmentMiss { .. } => false,
            Self::Navigation { .. }
            | Self::Session(_)
            | Self::Store { .. }
            | Self::Selector { .. } => true,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
