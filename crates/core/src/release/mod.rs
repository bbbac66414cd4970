//! Release management: the "current" pointer and retention.
//!
//! A release is an immutable directory under the releases root, named by a
//! sortable `<utc-timestamp>-<revision>` id. The manager owns the `current`
//! symlink (replaced atomically via a temp link + rename) and the retention
//! sweep that bounds how many releases stay on disk.

mod error;
mod manager;
mod types;

pub use error::ReleaseError;
pub use manager::ReleaseManager;
pub use types::{is_release_id, Release, SweepSummary};
