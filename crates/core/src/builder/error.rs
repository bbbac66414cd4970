//! Error types for release building.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::command::CommandError;

/// Which pipeline step an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Install,
    Build,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::Install => write!(f, "install"),
            BuildStep::Build => write!(f, "build"),
        }
    }
}

/// Errors that can occur while building and staging a release.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The install or build command failed.
    #[error("{step} step failed: {source}")]
    StepFailed {
        step: BuildStep,
        #[source]
        source: CommandError,
    },

    /// The configured step has an empty argv.
    #[error("{step} command is empty")]
    EmptyCommand { step: BuildStep },

    /// The build succeeded but the expected output directory is absent.
    ///
    /// A build misconfiguration, deliberately distinct from a command
    /// failure.
    #[error("build output missing: expected {path}")]
    OutputMissing { path: PathBuf },

    /// The output directory could not be copied into the releases root.
    #[error("failed to stage release {id}")]
    StageFailed {
        id: String,
        #[source]
        source: std::io::Error,
    },
}
