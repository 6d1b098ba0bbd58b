//! Error types for catalog access and configuration loading.
//!
//! None of these escape `Allocator::rank` or `Allocator::allocate`: a failed
//! catalog query degrades to an empty candidate list there.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while loading snapshots, querying a catalog or reading config.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file from disk.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog endpoint answered with a non-success status.
    #[error("Catalog responded with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// A catalog query did not complete in time.
    #[error("Catalog query timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
