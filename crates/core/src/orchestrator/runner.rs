//! Deploy orchestrator implementation.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::builder::ReleaseBuilder;
use crate::release::ReleaseManager;
use crate::source::SourceSync;
use crate::status::{DeployState, StatusPatch, StatusRecord, StatusStore};

use super::error::DeployError;

/// Sequences publish and rollback workflows over the injected components.
///
/// Constructed once at process start; clones share the same single-flight
/// lock and status store, so there is exactly one workflow and one status
/// record per instance.
#[derive(Clone)]
pub struct DeployOrchestrator {
    default_ref: String,
    source: Arc<dyn SourceSync>,
    builder: Arc<ReleaseBuilder>,
    releases: Arc<ReleaseManager>,
    status: Arc<dyn StatusStore>,
    flight: Arc<Mutex<()>>,
}

impl DeployOrchestrator {
    /// Creates an orchestrator over the given components.
    pub fn new(
        default_ref: impl Into<String>,
        source: Arc<dyn SourceSync>,
        builder: Arc<ReleaseBuilder>,
        releases: Arc<ReleaseManager>,
        status: Arc<dyn StatusStore>,
    ) -> Self {
        Self {
            default_ref: default_ref.into(),
            source,
            builder,
            releases,
            status,
            flight: Arc::new(Mutex::new(())),
        }
    }

    /// Accepts a publish request and runs the pipeline in the background.
    ///
    /// Returns the status snapshot at acceptance (`publishing`); callers
    /// poll [`DeployOrchestrator::status`] for completion. Fails fast with
    /// [`DeployError::Busy`] when a workflow is already in flight, without
    /// touching the status record.
    pub async fn publish(&self, git_ref: Option<String>) -> Result<StatusRecord, DeployError> {
        let guard = Arc::clone(&self.flight)
            .try_lock_owned()
            .map_err(|_| DeployError::Busy)?;

        let git_ref = git_ref.unwrap_or_else(|| self.default_ref.clone());
        let patch = StatusPatch {
            status: Some(DeployState::Publishing),
            git_ref: Some(git_ref.clone()),
            started_at: Some(Utc::now()),
            target_release_id: Some(None),
            finished_at: Some(None),
            error: Some(None),
            gc: Some(None),
            ..Default::default()
        };

        // The store is only mutated from inside the spawned task. If the
        // caller disconnects and this future is dropped before the spawn,
        // the guard is released and no `publishing` record is left behind
        // for a workflow that never ran.
        let mut snapshot = self.status.read().await?;
        patch.clone().apply(&mut snapshot);
        snapshot.updated_at = Some(Utc::now());

        info!("Publish of {} accepted", git_ref);
        let this = self.clone();
        tokio::spawn(async move {
            // Holding the guard for the task's whole lifetime is the
            // single-flight invariant.
            let _guard = guard;
            if let Err(e) = this.status.merge(patch).await {
                error!("Publish of {} failed to record acceptance: {}", git_ref, e);
                this.record_failure(e.to_string()).await;
                return;
            }
            if let Err(e) = this.run_publish(&git_ref).await {
                error!("Publish of {} failed: {}", git_ref, e);
                this.record_failure(e.to_string()).await;
            }
        });

        Ok(snapshot)
    }

    /// Promotes a previously built release, bypassing sync and build.
    ///
    /// Runs synchronously; there is no long-running external work on this
    /// path and the caller gets the terminal status in the response.
    pub async fn rollback(&self, release_id: &str) -> Result<StatusRecord, DeployError> {
        let _guard = self.flight.try_lock().map_err(|_| DeployError::Busy)?;

        self.status
            .merge(StatusPatch {
                status: Some(DeployState::RollingBack),
                target_release_id: Some(Some(release_id.to_string())),
                started_at: Some(Utc::now()),
                finished_at: Some(None),
                error: Some(None),
                gc: Some(None),
                ..Default::default()
            })
            .await?;

        match self.releases.promote(release_id).await {
            Ok(_) => {
                let record = self
                    .status
                    .merge(StatusPatch {
                        status: Some(DeployState::Ready),
                        release_id: Some(release_id.to_string()),
                        finished_at: Some(Some(Utc::now())),
                        ..Default::default()
                    })
                    .await?;
                info!("Rolled back to release {}", release_id);
                Ok(record)
            }
            Err(e) => {
                let err = DeployError::from(e);
                error!("Rollback to {} failed: {}", release_id, err);
                self.record_failure(err.to_string()).await;
                Err(err)
            }
        }
    }

    /// The last persisted status record.
    pub async fn status(&self) -> Result<StatusRecord, DeployError> {
        Ok(self.status.read().await?)
    }

    /// Waits for any in-flight workflow to finish.
    ///
    /// Used by graceful shutdown; a deploy interrupted mid-build would leave
    /// a stale `publishing` status behind.
    pub async fn wait_idle(&self) {
        let _guard = self.flight.lock().await;
    }

    async fn run_publish(&self, git_ref: &str) -> Result<(), DeployError> {
        self.source.ensure_repository().await?;
        let git_sha = self.source.checkout(git_ref).await?;

        self.status
            .merge(StatusPatch {
                status: Some(DeployState::Building),
                git_sha: Some(git_sha.clone()),
                ..Default::default()
            })
            .await?;
        let release = self.builder.build(&git_sha).await?;

        self.status
            .merge(StatusPatch {
                status: Some(DeployState::Switching),
                release_id: Some(release.id.clone()),
                ..Default::default()
            })
            .await?;
        self.releases.promote(&release.id).await?;
        let gc = self.releases.sweep().await;

        self.status
            .merge(StatusPatch {
                status: Some(DeployState::Ready),
                finished_at: Some(Some(Utc::now())),
                gc: Some(Some(gc)),
                ..Default::default()
            })
            .await?;

        info!("Publish of {} complete: release {}", git_ref, release.id);
        Ok(())
    }

    async fn record_failure(&self, message: String) {
        let patch = StatusPatch {
            status: Some(DeployState::Error),
            error: Some(Some(message)),
            finished_at: Some(Some(Utc::now())),
            ..Default::default()
        };
        if let Err(e) = self.status.merge(patch).await {
            error!("Failed to record workflow failure: {}", e);
        }
    }
}
