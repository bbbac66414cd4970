use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{deploy, handlers, middleware::auth_middleware, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Mutating routes sit behind the shared-secret check; read-only routes
    // stay open so dashboards and health checks work without credentials.
    let mutating_routes = Router::new()
        .route("/publish", post(deploy::publish))
        .route("/rollback", post(deploy::rollback))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::get_status))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        .merge(mutating_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
