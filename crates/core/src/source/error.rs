//! Error types for source synchronization.

use std::path::PathBuf;
use thiserror::Error;

use crate::command::CommandError;

/// Errors that can occur while syncing the source working copy.
///
/// Any of these aborts the enclosing publish before build or promote.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A git invocation failed; the command diagnostics ride along.
    #[error("git sync failed while {action}: {source}")]
    SyncFailed {
        action: String,
        #[source]
        source: CommandError,
    },

    /// The ref resolves neither as a remote-tracking branch nor directly.
    #[error("unknown ref: {git_ref}")]
    UnknownRef { git_ref: String },

    /// The working directory could not be created.
    #[error("failed to create working directory {path}")]
    Workdir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
