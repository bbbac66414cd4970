//! Git-backed source synchronization.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::command::{CommandOutput, CommandRunner, CommandSpec};

use super::error::SourceError;
use super::SourceSync;

/// [`SourceSync`] implemented over the `git` CLI.
///
/// Git is an opaque collaborator: every operation is an external command run
/// through the injected [`CommandRunner`].
pub struct GitSync {
    remote_url: String,
    workdir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl GitSync {
    /// Creates a sync over `workdir` tracking `remote_url`.
    pub fn new(
        remote_url: impl Into<String>,
        workdir: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            remote_url: remote_url.into(),
            workdir: workdir.into(),
            runner,
        }
    }

    async fn git<I, S>(&self, args: I, action: &str) -> Result<CommandOutput, SourceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = CommandSpec::new("git")
            .args(args)
            .current_dir(&self.workdir);
        self.runner
            .run(spec)
            .await
            .map_err(|e| SourceError::SyncFailed {
                action: action.to_string(),
                source: e,
            })
    }
}

#[async_trait]
impl SourceSync for GitSync {
    async fn ensure_repository(&self) -> Result<(), SourceError> {
        if fs::metadata(self.workdir.join(".git")).await.is_ok() {
            // Repository exists; keep the remote aligned with config.
            self.git(
                ["remote", "set-url", "origin", &self.remote_url],
                "configuring remote",
            )
            .await?;
            return Ok(());
        }

        fs::create_dir_all(&self.workdir)
            .await
            .map_err(|e| SourceError::Workdir {
                path: self.workdir.clone(),
                source: e,
            })?;
        self.git(["init"], "initializing repository").await?;
        self.git(
            ["remote", "add", "origin", &self.remote_url],
            "adding remote",
        )
        .await?;
        info!("Initialized working copy at {:?}", self.workdir);
        Ok(())
    }

    async fn checkout(&self, git_ref: &str) -> Result<String, SourceError> {
        self.git(
            ["fetch", "--prune", "--tags", "origin"],
            "fetching remote",
        )
        .await?;

        // Prefer the remote-tracking branch; fall back to treating the ref
        // as a direct revision or tag.
        let remote_ref = format!("refs/remotes/origin/{}", git_ref);
        let resolved = match self
            .git(["rev-parse", "--verify", &remote_ref], "resolving ref")
            .await
        {
            Ok(output) => output.stdout.trim().to_string(),
            Err(_) => {
                let direct = format!("{}^{{commit}}", git_ref);
                let output = self
                    .git(["rev-parse", "--verify", &direct], "resolving ref")
                    .await
                    .map_err(|_| SourceError::UnknownRef {
                        git_ref: git_ref.to_string(),
                    })?;
                output.stdout.trim().to_string()
            }
        };

        if resolved.is_empty() {
            return Err(SourceError::UnknownRef {
                git_ref: git_ref.to_string(),
            });
        }

        debug!("Resolved ref {} to {}", git_ref, resolved);
        self.git(["reset", "--hard", &resolved], "resetting worktree")
            .await?;

        info!("Checked out {} at {}", git_ref, resolved);
        Ok(resolved)
    }
}
