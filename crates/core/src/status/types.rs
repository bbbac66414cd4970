//! Status record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::release::SweepSummary;

/// Where the orchestrator is in the deploy state machine.
///
/// Publish walks `publishing → building → switching → ready`; rollback takes
/// the shorter `rolling_back → ready` path. `error` is reachable from any
/// non-terminal state. `empty` is the first-boot record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    #[default]
    Empty,
    Publishing,
    Building,
    Switching,
    RollingBack,
    Ready,
    Error,
}

/// The single mutable document representing last-known activity.
///
/// All fields are serialized (null when unset) so pollers see a stable shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusRecord {
    pub status: DeployState,
    /// Version-control ref the last publish was asked to deploy.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    /// Resolved revision of the last sync.
    pub git_sha: Option<String>,
    /// Release the workflow produced or promoted.
    pub release_id: Option<String>,
    /// Rollback target (rollback workflows only).
    pub target_release_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Human-readable failure message when `status` is `error`.
    pub error: Option<String>,
    /// Summary of the last retention sweep.
    pub gc: Option<SweepSummary>,
    /// Stamped on every merge.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A partial status update.
///
/// `None` leaves a field untouched. For fields that a transition must be able
/// to blank out (a new publish clears the previous run's `error`), the patch
/// field is doubly optional: `Some(None)` clears, `Some(Some(v))` sets.
#[derive(Debug, Clone, Default)]
pub struct StatusPatch {
    pub status: Option<DeployState>,
    pub git_ref: Option<String>,
    pub git_sha: Option<String>,
    pub release_id: Option<String>,
    pub target_release_id: Option<Option<String>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<Option<DateTime<Utc>>>,
    pub error: Option<Option<String>>,
    pub gc: Option<Option<SweepSummary>>,
}

impl StatusPatch {
    /// Overlays this patch onto `record`.
    pub fn apply(self, record: &mut StatusRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(git_ref) = self.git_ref {
            record.git_ref = Some(git_ref);
        }
        if let Some(git_sha) = self.git_sha {
            record.git_sha = Some(git_sha);
        }
        if let Some(release_id) = self.release_id {
            record.release_id = Some(release_id);
        }
        if let Some(target) = self.target_release_id {
            record.target_release_id = target;
        }
        if let Some(started_at) = self.started_at {
            record.started_at = Some(started_at);
        }
        if let Some(finished_at) = self.finished_at {
            record.finished_at = finished_at;
        }
        if let Some(error) = self.error {
            record.error = error;
        }
        if let Some(gc) = self.gc {
            record.gc = gc;
        }
    }
}
