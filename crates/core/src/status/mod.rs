//! Durable, mergeable status record for external pollers.
//!
//! There is exactly one status record per orchestrator instance. Every state
//! transition performs a read-merge-write that overlays only the fields
//! relevant to that transition; `/status` reads whatever was last persisted.

mod error;
mod store;
mod types;

pub use error::StatusError;
pub use store::FsStatusStore;
pub use types::{DeployState, StatusPatch, StatusRecord};

use async_trait::async_trait;

/// Persistent key/value record of the orchestrator's current activity.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Returns the persisted record, or the `empty` record on first boot.
    async fn read(&self) -> Result<StatusRecord, StatusError>;

    /// Overlays `patch` on the persisted record, stamps `updated_at`,
    /// persists durably, and returns the merged result.
    async fn merge(&self, patch: StatusPatch) -> Result<StatusRecord, StatusError>;
}
