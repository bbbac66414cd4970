//! Release builder implementation.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

use crate::command::{CommandRunner, CommandSpec};
use crate::release::Release;

use super::config::BuildConfig;
use super::error::{BuildError, BuildStep};

/// Length of the revision prefix embedded in a release id.
const REVISION_PREFIX_LEN: usize = 12;

/// Runs the install/build steps and stages the output as a release.
pub struct ReleaseBuilder {
    config: BuildConfig,
    workdir: PathBuf,
    releases_root: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl ReleaseBuilder {
    /// Creates a builder working in `workdir`, staging releases under
    /// `releases_root`.
    pub fn new(
        config: BuildConfig,
        workdir: impl Into<PathBuf>,
        releases_root: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            workdir: workdir.into(),
            releases_root: releases_root.into(),
            runner,
        }
    }

    /// Builds the currently checked-out source tree into a new release.
    ///
    /// The returned release directory is fully populated: the output is
    /// copied under a dot-prefixed staging name and renamed into place, so a
    /// half-copied release is never visible to the release manager.
    pub async fn build(&self, revision: &str) -> Result<Release, BuildError> {
        self.run_step(BuildStep::Install, &self.config.install)
            .await?;
        self.run_step(BuildStep::Build, &self.config.build).await?;

        let output = self.workdir.join(&self.config.output_dir);
        match fs::metadata(&output).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(BuildError::OutputMissing { path: output }),
        }

        let id = release_id(revision, Utc::now());
        let staging = self.releases_root.join(format!(".stage-{}", id));
        let target = self.releases_root.join(&id);
        let stage_err = |e: std::io::Error| BuildError::StageFailed {
            id: id.clone(),
            source: e,
        };

        fs::create_dir_all(&self.releases_root)
            .await
            .map_err(stage_err)?;
        // A stale staging dir from an interrupted publish is replaced whole.
        let _ = fs::remove_dir_all(&staging).await;
        copy_dir(&output, &staging).await.map_err(stage_err)?;

        if fs::metadata(&target).await.is_ok() {
            // Same revision rebuilt within the same second; last write wins.
            fs::remove_dir_all(&target).await.map_err(stage_err)?;
        }
        fs::rename(&staging, &target).await.map_err(stage_err)?;

        info!("Staged release {} from revision {}", id, revision);
        Ok(Release { id, path: target })
    }

    async fn run_step(&self, step: BuildStep, argv: &[String]) -> Result<(), BuildError> {
        let mut spec = CommandSpec::from_argv(argv)
            .ok_or(BuildError::EmptyCommand { step })?
            .current_dir(&self.workdir);

        if let Some(ref cache) = self.config.cache_dir {
            spec = spec.env("npm_config_cache", cache.to_string_lossy());
        }
        for (key, value) in &self.config.env {
            spec = spec.env(key, value);
        }

        info!("Running {} step: {}", step, spec.command_line());
        self.runner
            .run(spec)
            .await
            .map_err(|e| BuildError::StepFailed { step, source: e })?;
        Ok(())
    }
}

/// Allocates a release id from the wall clock and a revision prefix.
fn release_id(revision: &str, now: DateTime<Utc>) -> String {
    let prefix_end = revision
        .char_indices()
        .nth(REVISION_PREFIX_LEN)
        .map(|(i, _)| i)
        .unwrap_or(revision.len());
    format!("{}-{}", now.format("%Y%m%d%H%M%S"), &revision[..prefix_end])
}

/// Recursively copies a directory tree.
fn copy_dir<'a>(
    src: &'a Path,
    dst: &'a Path,
) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        fs::create_dir_all(dst).await?;
        let mut entries = fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let from = entry.path();
            let to = dst.join(entry.file_name());
            if file_type.is_dir() {
                copy_dir(&from, &to).await?;
            } else if file_type.is_symlink() {
                let link_target = fs::read_link(&from).await?;
                fs::symlink(link_target, &to).await?;
            } else {
                fs::copy(&from, &to).await?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::is_release_id;
    use crate::testing::{MockCommandRunner, MockResponse};
    use tempfile::TempDir;

    const SHA: &str = "abc123def4567890abc123def4567890abc123de";

    struct Fixture {
        _root: TempDir,
        workdir: PathBuf,
        releases: PathBuf,
        runner: Arc<MockCommandRunner>,
        builder: ReleaseBuilder,
    }

    fn fixture(config: BuildConfig) -> Fixture {
        let root = TempDir::new().unwrap();
        let workdir = root.path().join("src");
        let releases = root.path().join("releases");
        std::fs::create_dir_all(&workdir).unwrap();
        let runner = Arc::new(MockCommandRunner::new());
        let builder = ReleaseBuilder::new(config, &workdir, &releases, runner.clone());
        Fixture {
            _root: root,
            workdir,
            releases,
            runner,
            builder,
        }
    }

    fn populate_output(fixture: &Fixture, dir: &str) {
        let out = fixture.workdir.join(dir);
        std::fs::create_dir_all(out.join("assets")).unwrap();
        std::fs::write(out.join("index.html"), "<html></html>").unwrap();
        std::fs::write(out.join("assets").join("app.js"), "console.log(1)").unwrap();
    }

    #[tokio::test]
    async fn test_build_stages_release() {
        let f = fixture(BuildConfig::default());
        populate_output(&f, "dist");

        let release = f.builder.build(SHA).await.unwrap();

        assert!(is_release_id(&release.id));
        assert!(release.id.ends_with("-abc123def456"));
        assert_eq!(release.path, f.releases.join(&release.id));
        assert!(release.path.join("index.html").exists());
        assert!(release.path.join("assets").join("app.js").exists());
        // No staging leftovers.
        let stray: Vec<_> = std::fs::read_dir(&f.releases)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|n| n.starts_with('.'))
            .collect();
        assert!(stray.is_empty(), "staging dirs left behind: {:?}", stray);
    }

    #[tokio::test]
    async fn test_build_runs_steps_in_order_with_env() {
        let config = BuildConfig {
            cache_dir: Some(PathBuf::from("/srv/cache")),
            env: [("NODE_ENV".to_string(), "production".to_string())].into(),
            ..Default::default()
        };
        let f = fixture(config);
        populate_output(&f, "dist");

        f.builder.build(SHA).await.unwrap();

        let calls = f.runner.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command_line(), "npm ci");
        assert_eq!(calls[1].command_line(), "npm run build");
        for call in &calls {
            assert_eq!(call.cwd.as_deref(), Some(f.workdir.as_path()));
            assert!(call
                .env
                .contains(&("npm_config_cache".to_string(), "/srv/cache".to_string())));
            assert!(call
                .env
                .contains(&("NODE_ENV".to_string(), "production".to_string())));
        }
    }

    #[tokio::test]
    async fn test_build_output_missing_is_distinct() {
        let f = fixture(BuildConfig::default());
        // Steps succeed but nothing produces dist/.
        let err = f.builder.build(SHA).await.unwrap_err();
        match err {
            BuildError::OutputMissing { path } => {
                assert_eq!(path, f.workdir.join("dist"));
            }
            other => panic!("expected OutputMissing, got {:?}", other),
        }
        assert!(!f.releases.exists() || std::fs::read_dir(&f.releases).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_install_failure_stops_pipeline() {
        let f = fixture(BuildConfig::default());
        populate_output(&f, "dist");
        f.runner
            .respond(
                "npm ci",
                MockResponse::Fail {
                    code: 1,
                    output: "ERESOLVE unable to resolve dependency tree".to_string(),
                },
            )
            .await;

        let err = f.builder.build(SHA).await.unwrap_err();
        match err {
            BuildError::StepFailed { step, source } => {
                assert_eq!(step, BuildStep::Install);
                assert!(source.to_string().contains("ERESOLVE"));
            }
            other => panic!("expected StepFailed, got {:?}", other),
        }
        // The build step never ran and nothing was staged.
        assert_eq!(f.runner.calls().await.len(), 1);
        assert!(!f.releases.exists());
    }

    #[tokio::test]
    async fn test_short_revision_is_used_whole() {
        let f = fixture(BuildConfig::default());
        populate_output(&f, "dist");
        let release = f.builder.build("ab12").await.unwrap();
        assert!(release.id.ends_with("-ab12"));
        assert!(is_release_id(&release.id));
    }

    #[test]
    fn test_release_id_format() {
        let now = DateTime::parse_from_rfc3339("2024-03-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(release_id(SHA, now), "20240315120000-abc123def456");
    }
}
