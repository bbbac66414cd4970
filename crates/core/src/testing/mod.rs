//! Testing utilities and mock implementations for E2E tests.
//!
//! Mocks for the external-boundary traits (command execution, source sync)
//! so orchestrator and server behavior can be exercised without git or a
//! package manager installed.

mod mock_command_runner;
mod mock_source_sync;

pub use mock_command_runner::{MockCommandRunner, MockResponse};
pub use mock_source_sync::MockSourceSync;
