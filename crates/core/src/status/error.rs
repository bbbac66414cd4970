//! Error types for status persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or persisting the status record.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The status file exists but could not be read.
    #[error("failed to read status file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The staged status file could not be written or renamed into place.
    #[error("failed to persist status file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded as JSON.
    #[error("failed to encode status record: {0}")]
    Encode(#[from] serde_json::Error),
}
