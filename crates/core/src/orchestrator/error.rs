//! Error types for deploy orchestration.

use thiserror::Error;

use crate::builder::BuildError;
use crate::release::ReleaseError;
use crate::source::SourceError;
use crate::status::StatusError;

/// Errors that can occur during a publish or rollback workflow.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Another workflow holds the single-flight lock.
    ///
    /// The only error that does not transition the status machine; the
    /// in-flight workflow's status is untouched.
    #[error("another deploy is already in progress")]
    Busy,

    /// Source sync error.
    #[error("source sync failed: {0}")]
    Sync(#[from] SourceError),

    /// Build error.
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    /// Release promotion error.
    #[error("release error: {0}")]
    Release(#[from] ReleaseError),

    /// Status store error.
    #[error("status store error: {0}")]
    Status(#[from] StatusError),
}
