//! Filesystem-backed release manager.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use super::error::ReleaseError;
use super::types::{is_release_id, SweepSummary};

/// Owns the releases root and the `current` symlink.
///
/// All mutation of shared release state goes through this type while the
/// orchestrator's single-flight lock is held, so no locking is needed here
/// beyond the atomic rename primitive itself.
pub struct ReleaseManager {
    releases_root: PathBuf,
    current_link: PathBuf,
    keep: usize,
}

impl ReleaseManager {
    /// Creates a manager over the given releases root and current pointer.
    ///
    /// `keep` is the retention window; a value of 0 is treated as 1.
    pub fn new(
        releases_root: impl Into<PathBuf>,
        current_link: impl Into<PathBuf>,
        keep: usize,
    ) -> Self {
        Self {
            releases_root: releases_root.into(),
            current_link: current_link.into(),
            keep,
        }
    }

    /// Directory a release id maps to.
    pub fn release_path(&self, id: &str) -> PathBuf {
        self.releases_root.join(id)
    }

    /// Atomically repoints `current` at the given release.
    ///
    /// The replacement is symlink-at-temp-name + rename, so a concurrent
    /// reader resolves either the old or the new release, never a missing
    /// intermediate. Shared by publish-promote and rollback.
    pub async fn promote(&self, id: &str) -> Result<PathBuf, ReleaseError> {
        // The id doubles as a path component; reject anything that is not a
        // well-formed release id before touching the filesystem.
        if !is_release_id(id) {
            return Err(ReleaseError::NotFound { id: id.to_string() });
        }

        let target = self.release_path(id);
        match fs::metadata(&target).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(ReleaseError::NotFound { id: id.to_string() }),
        }

        let staged = self.staged_link_path();
        // A stale temp link from an interrupted promote is harmless; replace it.
        let _ = fs::remove_file(&staged).await;

        fs::symlink(&target, &staged)
            .await
            .map_err(|e| ReleaseError::Pointer {
                path: staged.clone(),
                source: e,
            })?;
        fs::rename(&staged, &self.current_link)
            .await
            .map_err(|e| ReleaseError::Pointer {
                path: self.current_link.clone(),
                source: e,
            })?;

        info!("Promoted release {} to current", id);
        Ok(target)
    }

    /// The release `current` resolves to, if any.
    pub async fn current_release(&self) -> Option<String> {
        let target = fs::read_link(&self.current_link).await.ok()?;
        let name = target.file_name()?.to_str()?;
        is_release_id(name).then(|| name.to_string())
    }

    /// Release ids on disk, newest first.
    ///
    /// Ordering is derived from the timestamp embedded in the id, not from
    /// directory mtimes. A missing or unreadable releases root yields an
    /// empty list; an empty history is a valid state.
    pub async fn list_releases(&self) -> Vec<String> {
        let mut entries = match fs::read_dir(&self.releases_root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to read releases root {:?}: {}",
                    self.releases_root, e
                );
                return Vec::new();
            }
        };

        let mut ids = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_release_id(name) {
                continue;
            }
            if matches!(entry.file_type().await, Ok(ft) if ft.is_dir()) {
                ids.push(name.to_string());
            }
        }

        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids
    }

    /// Deletes releases beyond the retention window.
    ///
    /// The newest `keep` releases stay, and so does the currently promoted
    /// release even when it falls outside the window (a manually pinned old
    /// release must survive the sweep). A release whose deletion fails stays
    /// on disk and is reported as kept; the sweep continues.
    pub async fn sweep(&self) -> SweepSummary {
        let keep = self.keep.max(1);
        let current = self.current_release().await;

        let mut summary = SweepSummary::default();
        for (index, id) in self.list_releases().await.into_iter().enumerate() {
            if index < keep || current.as_deref() == Some(id.as_str()) {
                summary.kept.push(id);
                continue;
            }
            match fs::remove_dir_all(self.release_path(&id)).await {
                Ok(()) => {
                    info!("Deleted release {} (outside retention window)", id);
                    summary.deleted.push(id);
                }
                Err(e) => {
                    warn!("Failed to delete release {}: {}", id, e);
                    summary.kept.push(id);
                }
            }
        }
        summary
    }

    fn staged_link_path(&self) -> PathBuf {
        let name = self
            .current_link
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("current");
        let staged = format!(".{}.tmp", name);
        match self.current_link.parent() {
            Some(parent) => parent.join(staged),
            None => PathBuf::from(staged),
        }
    }
}
