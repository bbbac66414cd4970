//! Error types for external command execution.

use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all (missing binary, permission).
    #[error("failed to spawn `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited with a non-zero status.
    #[error("command `{command}` exited with status {code:?}: {output_tail}")]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        /// Last chunk of combined stdout/stderr, for diagnostics.
        output_tail: String,
    },

    /// The process exceeded the configured timeout and was killed.
    #[error("command `{command}` timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    /// I/O error while waiting on the process or reading its output.
    #[error("I/O error running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
