//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling comprehensive E2E testing
//! without git or a package manager installed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use slipway_core::{
    load_config_from_str, testing::MockCommandRunner, testing::MockSourceSync, DeployOrchestrator,
    FsStatusStore, ReleaseBuilder, ReleaseManager,
};
use slipway_server::api::create_router;
use slipway_server::state::AppState;

/// Revision every mock checkout resolves to.
pub const TEST_SHA: &str = "abc123def4567890abc123def4567890abc123de";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with controllable mocks for source sync
/// and command execution, over a real temp-dir artifact root, so the
/// filesystem effects (releases, `current`, `status.json`) are real.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock source sync - script checkout results
    pub source: Arc<MockSourceSync>,
    /// Mock command runner - script install/build results
    pub runner: Arc<MockCommandRunner>,
    /// Temporary directory holding the artifact root
    pub temp_dir: TempDir,
}

/// Fixture options
pub struct TestConfig {
    pub token: Option<String>,
    pub keep: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            token: None,
            keep: 5,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default options.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom options.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        // The mock build steps do not touch the filesystem; pre-populate the
        // output directory a real build would produce.
        let workdir = root.join("src");
        std::fs::create_dir_all(workdir.join("dist")).expect("Failed to create workdir");
        std::fs::write(workdir.join("dist").join("index.html"), "<html></html>")
            .expect("Failed to write build output");

        let auth_section = match &test_config.token {
            Some(token) => format!("[auth]\ntoken = \"{}\"\n", token),
            None => String::new(),
        };
        let config = load_config_from_str(&format!(
            r#"
{auth_section}
[paths]
root = "{}"

[source]
remote_url = "https://example.com/site.git"

[releases]
keep = {}
"#,
            root.display(),
            test_config.keep
        ))
        .expect("Failed to build test config");

        let source = Arc::new(MockSourceSync::new(TEST_SHA));
        let runner = Arc::new(MockCommandRunner::new());

        let builder = Arc::new(ReleaseBuilder::new(
            config.build.clone(),
            config.workdir(),
            config.paths.releases_dir(),
            runner.clone(),
        ));
        let releases = Arc::new(ReleaseManager::new(
            config.paths.releases_dir(),
            config.paths.current_link(),
            config.releases.keep,
        ));
        let status = Arc::new(FsStatusStore::new(config.paths.status_file()));

        let orchestrator = DeployOrchestrator::new(
            config.source.default_ref.clone(),
            source.clone(),
            builder,
            releases,
            status,
        );

        let state = Arc::new(AppState::new(config, orchestrator));
        let router = create_router(state);

        Self {
            router,
            source,
            runner,
            temp_dir,
        }
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.temp_dir.path().join("releases")
    }

    pub fn current_link(&self) -> PathBuf {
        self.temp_dir.path().join("current")
    }

    /// Release id the `current` symlink points at, if any.
    pub fn current_release(&self) -> Option<String> {
        std::fs::read_link(self.current_link())
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
    }

    /// Pre-create a release directory, as a past publish would have.
    pub fn add_release(&self, id: &str) {
        let dir = self.releases_dir().join(id);
        std::fs::create_dir_all(&dir).expect("Failed to create release dir");
        std::fs::write(dir.join("index.html"), "<html></html>")
            .expect("Failed to write release content");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a POST request with JSON body and an auth token header.
    pub async fn post_with_token(&self, path: &str, body: Value, token: &str) -> TestResponse {
        self.request("POST", path, Some(body), Some(token)).await
    }

    /// Send a POST request with no body at all.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None, None).await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("x-slipway-token", token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };

        TestResponse { status, body }
    }

    /// Poll `/status` until the workflow reaches a terminal state.
    pub async fn wait_for_terminal(&self) -> Value {
        for _ in 0..250 {
            let response = self.get("/status").await;
            let status = response.body["status"].as_str().unwrap_or_default().to_string();
            if status == "ready" || status == "error" {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("workflow did not reach a terminal state");
    }
}
