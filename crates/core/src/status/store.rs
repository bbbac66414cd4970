//! File-backed status store.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

use super::error::StatusError;
use super::types::{StatusPatch, StatusRecord};
use super::StatusStore;

/// [`StatusStore`] persisting a single JSON document.
///
/// Writes are staged to a sibling temp file and renamed into place, so a
/// crash between "begin write" and "write complete" can lose the most recent
/// update but never leaves a torn file behind.
pub struct FsStatusStore {
    path: PathBuf,
}

impl FsStatusStore {
    /// Creates a store persisting at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "status.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StatusStore for FsStatusStore {
    async fn read(&self) -> Result<StatusRecord, StatusError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StatusRecord::default());
            }
            Err(e) => {
                return Err(StatusError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(record),
            Err(e) => {
                // An externally mangled file should not wedge the service;
                // the next merge rewrites it whole.
                warn!(
                    "Status file {:?} is not valid JSON ({}), treating as empty",
                    self.path, e
                );
                Ok(StatusRecord::default())
            }
        }
    }

    async fn merge(&self, patch: StatusPatch) -> Result<StatusRecord, StatusError> {
        let mut record = self.read().await?;
        patch.apply(&mut record);
        record.updated_at = Some(Utc::now());

        let encoded = serde_json::to_vec_pretty(&record)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StatusError::Write {
                    path: self.path.clone(),
                    source: e,
                })?;
        }

        let staging = self.staging_path();
        fs::write(&staging, &encoded)
            .await
            .map_err(|e| StatusError::Write {
                path: staging.clone(),
                source: e,
            })?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| StatusError::Write {
                path: self.path.clone(),
                source: e,
            })?;

        Ok(record)
    }
}
