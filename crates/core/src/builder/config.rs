//! Build configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for the install/build steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Install step, as an argv list (first element is the program).
    #[serde(default = "default_install")]
    pub install: Vec<String>,

    /// Build step, as an argv list.
    #[serde(default = "default_build")]
    pub build: Vec<String>,

    /// Output directory the build step must produce, relative to the source
    /// tree.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Package-manager cache directory, exported to the steps as
    /// `npm_config_cache`. Defaults to `<paths.root>/cache` when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Extra environment overrides for both steps.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Per-command timeout; a hung step must not wedge the orchestrator.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_install() -> Vec<String> {
    vec!["npm".to_string(), "ci".to_string()]
}

fn default_build() -> Vec<String> {
    vec!["npm".to_string(), "run".to_string(), "build".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            install: default_install(),
            build: default_build(),
            output_dir: default_output_dir(),
            cache_dir: None,
            env: BTreeMap::new(),
            timeout_secs: default_timeout(),
        }
    }
}
