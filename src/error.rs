// src/error.rs

use thiserror::Error;

/// Everything that can go wrong while scraping or reporting.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Transport failure or non-success status for `url`.
    #[error("request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(#[source] reqwest::Error),

    /// An element the page layout depends on is missing.
    #[error("tag not found: {tag} {attrs}")]
    TagNotFound { tag: String, attrs: String },

    /// The sidebar on the main documentation page has no version list.
    #[error("list of Python versions not found")]
    VersionsNotFound,

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cache metadata file could not be read or written.
    #[error("cache entry error: {0}")]
    CacheEntry(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParserError>;
