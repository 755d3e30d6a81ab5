//! Key check endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use crate::api::middleware::AuthenticatedKey;
use crate::api::state::AppState;
use crate::api::types::{success, ResponseMeta, SuccessEnvelope};
use crate::domain::ApiKeyInfo;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTestResponse {
    pub authenticated: bool,
    pub api_key_info: ApiKeyInfo,
}

/// GET /api/v1/formie/auth
pub async fn auth_test(
    State(state): State<AppState>,
    AuthenticatedKey(record): AuthenticatedKey,
) -> Json<SuccessEnvelope<AuthTestResponse>> {
    debug!(key_prefix = %record.secret_prefix(), "Auth test");

    let response = AuthTestResponse {
        authenticated: true,
        api_key_info: state.authorizer.registry().describe(&record),
    };

    Json(success(response, ResponseMeta::now()))
}
