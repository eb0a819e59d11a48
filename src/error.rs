//! Error types for favlist-dl
//!
//! This module provides the error taxonomy for the library:
//! - Configuration and pool-construction errors (fatal before any worker starts)
//! - Catalog errors raised by the remote API collaborator (per item, non-fatal)
//! - Download errors raised while fetching a single video (per item, non-fatal)
//! - Transport, filesystem and serialization errors wrapped from their crates

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for favlist-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for favlist-dl
///
/// Item-level variants (`Catalog`, `Download`, `Network`, `Io`) never escape the
/// worker loop or the orchestrator loop; they are logged with the video id and the
/// batch continues. Only `Config` is returned from [`crate::CollectionSync::run`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent")
        key: Option<String>,
    },

    /// The remote catalog failed to list or describe a video
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Every worker has exited, so nothing can receive the item
    #[error("download queue is closed")]
    QueueClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Errors reported by a [`crate::catalog::VideoCatalog`] implementation
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Temporary failure (rate limit, timeout, server busy); worth retrying
    #[error("transient catalog failure: {0}")]
    Transient(String),

    /// Permanent failure (video removed, access denied, malformed response)
    #[error("catalog request failed: {0}")]
    Permanent(String),

    /// The video exists but no playable stream URL was returned
    #[error("video {id} has no playable stream")]
    NoPlayableStream {
        /// The video identifier
        id: String,
    },
}

/// Errors raised while downloading a single video
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The work item carries no stream URL
    #[error("download URL is empty for video {id}")]
    EmptyUrl {
        /// The video identifier
        id: String,
    },

    /// The stream URL could not be parsed
    #[error("invalid download URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The media server answered with a non-success status
    #[error("HTTP status {status} fetching {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// The requested URL
        url: String,
    },

    /// The body ended before the declared content length was received
    #[error("incomplete body: expected {expected} bytes, received {received}")]
    Incomplete {
        /// Declared content length
        expected: u64,
        /// Bytes actually received
        received: u64,
    },

    /// The finished part file could not be moved onto the final path
    #[error("failed to finalize {path}: {source}")]
    Finalize {
        /// The final video path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
