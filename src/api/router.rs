use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{
    cors_middleware, logging_middleware, metrics_middleware, security_headers_middleware,
};
use super::state::AppState;
use super::v1::{self, API_PREFIX};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
///
/// CORS is the innermost router-wide layer: it answers preflight requests
/// before any route-level authorization runs.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest(API_PREFIX, v1::create_v1_router(state.clone()))
        .with_state(state.clone())
        .layer(from_fn_with_state(state, cors_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(logging_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Create the router plus the Prometheus endpoint when metrics are enabled
pub fn create_router_with_metrics(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router(state);

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, metrics_path)),
        None => router,
    }
}
