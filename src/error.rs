//! Error types shared across the engine.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected caller input. Surfaced to the API layer as-is; never a crash,
/// and the failing path touches no stored data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query must be at least {min} characters")]
    QueryTooShort { min: usize },

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Fatal ingestion failures. Any of these aborts the whole pipeline; row
/// level problems are counted and skipped instead, see
/// [`CollectionReport`](crate::ingest::CollectionReport).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid dump URL {url}: {source}")]
    BadUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to decompress {path}: {source}")]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
