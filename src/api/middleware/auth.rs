//! API key authorization middleware
//!
//! Each protected route group is wrapped in one of the `require_*` functions.
//! They buffer the body (it is covered by the request signature), run the
//! [`RequestAuthorizer`](crate::infrastructure::api_key::RequestAuthorizer)
//! and either reject with the error envelope or pass the request on with the
//! resolved key attached as [`AuthenticatedKey`].

use std::net::{IpAddr, SocketAddr};

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, FromRequestParts, OriginalUri, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, error, warn};

use super::security::MAX_BODY_SIZE;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ErrorCode};
use crate::domain::api_key::{permission, redact_secret, ApiKeyRecord};
use crate::infrastructure::api_key::{AuthDecision, AuthRequest, RateLimitHeaders, SignedParts};
use crate::infrastructure::observability::record_auth_decision;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Key admitted for the current request
#[derive(Debug, Clone)]
pub struct AuthenticatedKey(pub ApiKeyRecord);

impl<S> FromRequestParts<S> for AuthenticatedKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedKey>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("API key required"))
    }
}

/// Any valid key
pub async fn require_any_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    authorize_request(&state, None, request, next).await
}

pub async fn require_read_forms(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    authorize_request(&state, Some(permission::READ_FORMS), request, next).await
}

pub async fn require_read_submissions(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    authorize_request(&state, Some(permission::READ_SUBMISSIONS), request, next).await
}

async fn authorize_request(
    state: &AppState,
    permission: Option<&'static str>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (request, rate_limit) = match admit(state, permission, request).await {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &rate_limit);
    response
}

async fn admit(
    state: &AppState,
    permission: Option<&'static str>,
    request: Request<Body>,
) -> Result<(Request<Body>, RateLimitHeaders), Response> {
    let dev_mode = state.dev_mode();
    let (mut parts, body) = request.into_parts();

    let body = to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|_| ApiError::payload_too_large(MAX_BODY_SIZE).into_response())?;

    let signing_path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| &uri.0)
        .unwrap_or(&parts.uri)
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let client_ip = client_ip(&parts, state.settings.trust_proxy_headers);
    let api_key = extract_api_key_from_headers(&parts.headers);
    let method = parts.method.as_str().to_string();

    let auth_request = AuthRequest {
        api_key,
        permission,
        client_ip,
        signed: SignedParts {
            method: &method,
            path: &signing_path,
            timestamp: header_str(&parts.headers, TIMESTAMP_HEADER),
            signature: header_str(&parts.headers, SIGNATURE_HEADER),
            body: &body,
        },
    };
    let key_prefix = api_key.map(redact_secret).unwrap_or_else(|| "none".to_string());
    let ip = client_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let environment = state.settings.environment.as_str();

    let decision = match state.authorizer.authorize(&auth_request, Utc::now()) {
        Ok(decision) => decision,
        Err(e) => {
            record_auth_decision("error");
            error!(
                key_prefix = %key_prefix,
                path = %signing_path,
                method = %method,
                client_ip = %ip,
                environment = %environment,
                error = %e,
                "Authorization failed"
            );
            return Err(ApiError::internal(ErrorCode::AuthorizationError, "Authorization failed")
                .with_detail(e, dev_mode)
                .into_response());
        }
    };

    record_auth_decision(decision.outcome());

    if decision.is_admitted() {
        debug!(
            key_prefix = %key_prefix,
            path = %signing_path,
            method = %method,
            client_ip = %ip,
            environment = %environment,
            "Request admitted"
        );
    } else {
        warn!(
            key_prefix = %key_prefix,
            path = %signing_path,
            method = %method,
            client_ip = %ip,
            environment = %environment,
            outcome = decision.outcome(),
            "Request rejected"
        );
    }

    match decision {
        AuthDecision::Admitted { record, rate_limit } => {
            parts.extensions.insert(AuthenticatedKey(record));
            Ok((Request::from_parts(parts, Body::from(body)), rate_limit))
        }
        AuthDecision::Unauthorized(reason) => {
            Err(ApiError::unauthorized(reason.message()).into_response())
        }
        AuthDecision::Forbidden { permission } => Err(ApiError::forbidden(format!(
            "Insufficient permissions: '{}' required",
            permission
        ))
        .into_response()),
        AuthDecision::IpRejected => Err(ApiError::ip_not_allowed().into_response()),
        AuthDecision::RateLimited(headers) => {
            let mut response = ApiError::rate_limited("Rate limit exceeded").into_response();
            apply_rate_limit_headers(response.headers_mut(), &headers);
            Err(response)
        }
    }
}

/// Key from `X-API-Key`, falling back to `Authorization: Bearer <key>`
fn extract_api_key_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = header_str(headers, API_KEY_HEADER) {
        return Some(key.trim());
    }

    header_str(headers, header::AUTHORIZATION.as_str())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Client address: first `X-Forwarded-For` hop when trusted, else the peer
fn client_ip(parts: &Parts, trust_proxy_headers: bool) -> Option<IpAddr> {
    if trust_proxy_headers {
        let forwarded = header_str(&parts.headers, "x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .and_then(|hop| hop.trim().parse::<IpAddr>().ok());

        if forwarded.is_some() {
            return forwarded;
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn apply_rate_limit_headers(headers: &mut HeaderMap, rate_limit: &RateLimitHeaders) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(rate_limit.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(rate_limit.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(rate_limit.reset_at));
}
