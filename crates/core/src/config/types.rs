use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::builder::BuildConfig;
use crate::source::SourceConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub paths: PathsConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub releases: ReleasesConfig,
}

impl Config {
    /// Working-copy directory, with the `[paths]` derived default applied.
    pub fn workdir(&self) -> PathBuf {
        self.source
            .workdir
            .clone()
            .unwrap_or_else(|| self.paths.root.join("src"))
    }

    /// Build cache directory, with the `[paths]` derived default applied.
    pub fn cache_dir(&self) -> PathBuf {
        self.build
            .cache_dir
            .clone()
            .unwrap_or_else(|| self.paths.root.join("cache"))
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Shared secret required on mutating endpoints. Unset means open
    /// mutating endpoints, for single-user hosts behind a firewall.
    #[serde(default)]
    pub token: Option<String>,
}

/// Filesystem layout configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Artifact root. Everything the orchestrator writes lives under here.
    pub root: PathBuf,
}

impl PathsConfig {
    pub fn releases_dir(&self) -> PathBuf {
        self.root.join("releases")
    }

    pub fn current_link(&self) -> PathBuf {
        self.root.join("current")
    }

    pub fn status_file(&self) -> PathBuf {
        self.root.join("status.json")
    }
}

/// Release retention configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleasesConfig {
    #[serde(default = "default_keep")]
    pub keep: usize,
}

impl Default for ReleasesConfig {
    fn default() -> Self {
        Self {
            keep: default_keep(),
        }
    }
}

fn default_keep() -> usize {
    5
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub auth: SanitizedAuthConfig,
    pub paths: PathsConfig,
    pub source: SourceConfig,
    pub build: BuildConfig,
    pub releases: ReleasesConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            auth: SanitizedAuthConfig {
                token_configured: config
                    .auth
                    .token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
            },
            paths: config.paths.clone(),
            source: config.source.clone(),
            build: config.build.clone(),
            releases: config.releases.clone(),
        }
    }
}
