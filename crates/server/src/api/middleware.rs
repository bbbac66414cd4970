//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Header carrying the shared secret on mutating requests.
pub const TOKEN_HEADER: &str = "x-slipway-token";

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Authentication middleware for mutating endpoints.
///
/// Validates the shared-secret header against the configured token. With no
/// token configured the endpoints are open; read-only endpoints never pass
/// through this middleware.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.auth_token() else {
        return Ok(next.run(request).await);
    };

    match request.headers().get(TOKEN_HEADER) {
        None => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["missing_token"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
        Some(value) if value.to_str().ok() == Some(expected) => Ok(next.run(request).await),
        Some(_) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["invalid_token"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::Request, middleware, routing::post, Router};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::state::AppState;
    use slipway_core::testing::{MockCommandRunner, MockSourceSync};
    use slipway_core::{
        load_config_from_str, DeployOrchestrator, FsStatusStore, ReleaseBuilder, ReleaseManager,
    };

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    fn create_test_state(token: Option<&str>) -> Arc<AppState> {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        // Leak the temp_dir to keep the artifact root around
        std::mem::forget(temp_dir);

        let auth_section = match token {
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
"#,
            root.display()
        ))
        .unwrap();

        let runner = Arc::new(MockCommandRunner::new());
        let orchestrator = DeployOrchestrator::new(
            config.source.default_ref.clone(),
            Arc::new(MockSourceSync::new("abc123def456abc123def456abc123def456abc1")),
            Arc::new(ReleaseBuilder::new(
                config.build.clone(),
                config.workdir(),
                config.paths.releases_dir(),
                runner,
            )),
            Arc::new(ReleaseManager::new(
                config.paths.releases_dir(),
                config.paths.current_link(),
                config.releases.keep,
            )),
            Arc::new(FsStatusStore::new(config.paths.status_file())),
        );

        Arc::new(AppState::new(config, orchestrator))
    }

    fn test_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", post(dummy_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_no_token_configured_allows_all() {
        let app = test_app(create_test_state(None));

        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_valid_token() {
        let app = test_app(create_test_state(Some("secret-token")));

        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .header(TOKEN_HEADER, "secret-token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let app = test_app(create_test_state(Some("secret-token")));

        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .header(TOKEN_HEADER, "wrong-token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let app = test_app(create_test_state(Some("secret-token")));

        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
