//! Health check endpoints for load balancers and probes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;
use crate::domain::FormQuery;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthResponse {
    fn new(status: HealthStatus, environment: Option<String>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
        }
    }
}

/// Returns 200 once the store answers a trivial query
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let environment = Some(state.settings.environment.to_string());
    let probe = FormQuery {
        status: None,
        limit: 1,
        offset: 0,
    };

    match state.store.list_forms(&probe).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse::new(HealthStatus::Healthy, environment)),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new(HealthStatus::Unhealthy, environment)),
            )
        }
    }
}

/// Liveness probe; no dependency checks
pub async fn live_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse::new(HealthStatus::Healthy, None)),
    )
}
