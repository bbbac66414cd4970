//! Source synchronization: a local working copy pinned to a remote ref.
//!
//! The working copy is disposable state: every publish force-resets it to
//! the requested ref, discarding local modifications, but the tree itself is
//! kept between publishes so build caches survive.

mod config;
mod error;
mod git;

pub use config::SourceConfig;
pub use error::SourceError;
pub use git::GitSync;

use async_trait::async_trait;

/// Keeps a local working copy in sync with a remote repository.
#[async_trait]
pub trait SourceSync: Send + Sync {
    /// Creates the working directory and version-control metadata if absent.
    ///
    /// Idempotent; safe to call on every publish.
    async fn ensure_repository(&self) -> Result<(), SourceError>;

    /// Fetches remote updates and force-resets the working tree to `git_ref`,
    /// returning the resolved full revision id.
    async fn checkout(&self, git_ref: &str) -> Result<String, SourceError>;
}
