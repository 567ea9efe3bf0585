//! Error types for a collection run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Anything that ends a run early.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The page could not be fetched.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The markup could not be processed at all.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// The seen-id file or the output file failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The query does not produce a valid search URL.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("robots.txt disallows {url}")]
    RobotsDisallowed { url: String },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read seen ids from {}: {source}", path.display())]
    ReadSeenIds { path: PathBuf, source: io::Error },

    #[error("failed to write seen ids to {}: {source}", path.display())]
    WriteSeenIds { path: PathBuf, source: io::Error },

    #[error("failed to open output {}: {source}", path.display())]
    OpenOutput { path: PathBuf, source: io::Error },

    #[error("failed to write job row: {0}")]
    WriteRecord(#[from] csv::Error),

    #[error("failed to flush output: {0}")]
    Flush(#[source] io::Error),
}
