//! Forms REST API, mounted under `/api/v1/formie`

pub mod auth;
pub mod forms;
pub mod submissions;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tracing::error;

use super::middleware::{require_any_key, require_read_forms, require_read_submissions};
use super::state::AppState;
use super::types::{ApiError, ErrorCode};
use crate::domain::DomainError;

pub const API_PREFIX: &str = "/api/v1/formie";

/// Create v1 API router
///
/// Each group carries its own permission check as a route layer, so
/// unmatched paths and preflight requests never reach authorization.
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    let any_key = Router::new()
        .route("/auth", get(auth::auth_test))
        .route_layer(from_fn_with_state(state.clone(), require_any_key));

    let forms = Router::new()
        .route("/forms", get(forms::list_forms))
        .route("/forms/{id_or_handle}", get(forms::get_form))
        .route_layer(from_fn_with_state(state.clone(), require_read_forms));

    let submissions = Router::new()
        .route("/submissions", get(submissions::list_submissions))
        .route("/submissions/{id}", get(submissions::get_submission))
        .route_layer(from_fn_with_state(state, require_read_submissions));

    Router::new().merge(any_key).merge(forms).merge(submissions)
}

/// Log a store failure and convert it to a fetch error
pub(crate) fn store_error(
    code: ErrorCode,
    message: &str,
    err: DomainError,
    dev_mode: bool,
) -> ApiError {
    error!(error = %err, code = ?code, "{}", message);
    ApiError::internal(code, message).with_detail(err, dev_mode)
}
