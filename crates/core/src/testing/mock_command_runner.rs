//! Mock command runner for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::command::{CommandError, CommandOutput, CommandRunner, CommandSpec};

/// Scripted response for a matching command.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Succeed with the given stdout.
    Stdout(String),
    /// Fail with a non-zero exit code and diagnostic output.
    Fail { code: i32, output: String },
    /// Fail as a timeout.
    Timeout,
    /// Fail as if the binary did not exist.
    SpawnError,
}

/// Mock implementation of [`CommandRunner`].
///
/// Records every invocation for assertions. Responses are scripted by
/// command-line prefix; the first matching rule wins, and unmatched commands
/// succeed with empty output. An optional delay simulates long-running
/// commands for single-flight tests.
#[derive(Default)]
pub struct MockCommandRunner {
    calls: Arc<RwLock<Vec<CommandSpec>>>,
    rules: Arc<RwLock<Vec<(String, MockResponse)>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockCommandRunner {
    /// Creates a mock where every command succeeds with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a response for commands whose command line starts with
    /// `prefix`.
    pub async fn respond(&self, prefix: impl Into<String>, response: MockResponse) {
        self.rules.write().await.push((prefix.into(), response));
    }

    /// Makes every subsequent command take `delay` to complete.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// All recorded invocations.
    pub async fn calls(&self) -> Vec<CommandSpec> {
        self.calls.read().await.clone()
    }

    /// Rendered command lines of all recorded invocations.
    pub async fn call_lines(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .map(CommandSpec::command_line)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, CommandError> {
        let command_line = spec.command_line();
        self.calls.write().await.push(spec.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let rules = self.rules.read().await;
        let matched = rules
            .iter()
            .find(|(prefix, _)| command_line.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone());
        drop(rules);

        match matched {
            None => Ok(CommandOutput::default()),
            Some(MockResponse::Stdout(stdout)) => Ok(CommandOutput {
                stdout,
                stderr: String::new(),
            }),
            Some(MockResponse::Fail { code, output }) => Err(CommandError::NonZeroExit {
                command: command_line,
                code: Some(code),
                output_tail: output,
            }),
            Some(MockResponse::Timeout) => Err(CommandError::Timeout {
                command: command_line,
                timeout_secs: 0,
            }),
            Some(MockResponse::SpawnError) => Err(CommandError::SpawnFailed {
                program: spec.program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock: not found"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_and_matches_by_prefix() {
        let runner = MockCommandRunner::new();
        runner
            .respond("git fetch", MockResponse::Fail {
                code: 1,
                output: "no remote".to_string(),
            })
            .await;

        let ok = runner.run(CommandSpec::new("git").arg("init")).await;
        assert!(ok.is_ok());

        let err = runner
            .run(CommandSpec::new("git").args(["fetch", "origin"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NonZeroExit { .. }));

        assert_eq!(
            runner.call_lines().await,
            vec!["git init".to_string(), "git fetch origin".to_string()]
        );
    }
}
