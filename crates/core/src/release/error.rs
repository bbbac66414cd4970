//! Error types for release management.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while promoting a release.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The promote/rollback target does not exist on disk.
    #[error("release not found: {id}")]
    NotFound { id: String },

    /// The current pointer could not be replaced.
    #[error("failed to update current pointer at {path}")]
    Pointer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
