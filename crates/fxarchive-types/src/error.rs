//! Error types for fxarchive.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fxarchive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that abort the processing of a symbol.
///
/// Permanent and transient absences of data are not errors; they are reported
/// as outcomes by the fetcher and the reconciler.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Invalid caller-supplied timestamp, symbol or path input.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The provider answered with a status other than 200 or 404.
    #[error("Unexpected HTTP status {status} for {url}")]
    Transport {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// HTTP request failed below the status level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// LZMA decompression failed.
    #[error("Decompression error: {0}")]
    Decompress(String),

    /// Malformed record data or an inconsistent tick batch.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The artifact about to be written already exists.
    #[error("Refusing to overwrite existing artifact '{}'", path.display())]
    PersistConflict {
        /// The conflicting path.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArchiveError {
    /// Creates an [`ArchiveError::Argument`] from anything displayable.
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    /// Creates an [`ArchiveError::Decode`] from anything displayable.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
