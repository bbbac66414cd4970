//! Source sync configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the source working copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote repository URL. Required; validated at startup.
    pub remote_url: String,

    /// Working-copy directory. Defaults to `<paths.root>/src` when unset.
    #[serde(default)]
    pub workdir: Option<PathBuf>,

    /// Ref published when a publish request names none.
    #[serde(default = "default_ref")]
    pub default_ref: String,
}

fn default_ref() -> String {
    "main".to_string()
}
