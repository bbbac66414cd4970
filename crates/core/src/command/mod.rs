//! External command execution.
//!
//! Everything the orchestrator shells out to (git, the install/build tools)
//! goes through the [`CommandRunner`] trait so tests can substitute a mock.
//! Commands are structured program + argument lists, never shell strings.

mod error;
mod runner;
mod types;

pub use error::CommandError;
pub use runner::{CommandRunner, ProcessRunner};
pub use types::{CommandOutput, CommandSpec};
