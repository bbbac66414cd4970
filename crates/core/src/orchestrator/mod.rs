//! Deploy orchestration: the publish/rollback state machine.
//!
//! Publish walks sync → build → promote → sweep, merging a status update
//! before each phase; rollback skips straight to promote. At most one
//! workflow runs at a time, enforced by a single-flight lock.

mod error;
mod runner;

pub use error::DeployError;
pub use runner::DeployOrchestrator;
