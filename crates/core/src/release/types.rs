//! Types for release management.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shape of a valid release id: 14-digit UTC timestamp, dash, hex revision
/// prefix. Lexicographic order on valid ids is creation order.
static RELEASE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{14}-[0-9a-f]{1,40}$").expect("valid release id regex"));

/// Returns whether `name` is a well-formed release id.
///
/// Everything else in the releases root (staging dirs, stray files) is
/// ignored by listing and retention.
pub fn is_release_id(name: &str) -> bool {
    RELEASE_ID_RE.is_match(name)
}

/// An immutable, named snapshot of build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Unique id, sortable by creation time.
    pub id: String,
    /// Directory on disk; never mutated after creation, only deleted.
    pub path: PathBuf,
}

/// Outcome of a retention sweep, reported in the status record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Release ids still on disk after the sweep, newest first.
    pub kept: Vec<String>,
    /// Release ids removed by the sweep.
    pub deleted: Vec<String>,
}
