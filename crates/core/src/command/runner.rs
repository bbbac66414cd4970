//! Process-backed command runner.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::CommandError;
use super::types::{CommandOutput, CommandSpec};

/// Maximum number of bytes of combined output kept in error diagnostics.
const OUTPUT_TAIL_BYTES: usize = 4096;

/// Executes external commands to completion, capturing their output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command and returns its captured output.
    ///
    /// A non-zero exit status is an error; retries are the caller's policy.
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// [`CommandRunner`] backed by real OS processes.
///
/// Every command is bounded by a single configured timeout; a command that
/// exceeds it is killed and reported as [`CommandError::Timeout`].
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    /// Creates a runner with the given per-command timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, CommandError> {
        let command_line = spec.command_line();
        debug!("Running command: {}", command_line);

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must not leave the child
            // running.
            .kill_on_drop(true);

        if let Some(ref cwd) = spec.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &spec.env {
            command.env(key, value);
        }

        let child = command.spawn().map_err(|e| CommandError::SpawnFailed {
            program: spec.program.clone(),
            source: e,
        })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CommandError::Io {
                    command: command_line,
                    source: e,
                })
            }
            Err(_) => {
                return Err(CommandError::Timeout {
                    command: command_line,
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let mut combined = stdout;
            if !stderr.is_empty() {
                if !combined.is_empty() {
                    combined.push('\n');
                }
                combined.push_str(&stderr);
            }
            return Err(CommandError::NonZeroExit {
                command: command_line,
                code: output.status.code(),
                output_tail: tail(&combined, OUTPUT_TAIL_BYTES),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Returns the last `max_bytes` of `text`, respecting char boundaries.
fn tail(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}
