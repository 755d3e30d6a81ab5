//! CORS headers and preflight handling

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "X-API-Key, Content-Type, X-Timestamp, X-Signature";
pub const MAX_AGE_SECS: &str = "86400";

/// Select CORS headers for a request origin
///
/// An environment missing from the table allows any origin. Nothing is
/// emitted when the origin is not allowed.
pub fn cors_headers(
    origin: Option<&str>,
    environment: &str,
    allowed_origins: &HashMap<String, Vec<String>>,
) -> Option<HeaderMap> {
    let wildcard = ["*".to_string()];
    let allowed = allowed_origins
        .get(environment)
        .map(Vec::as_slice)
        .unwrap_or(&wildcard);

    let any = allowed.iter().any(|o| o == "*");
    let listed = origin.is_some_and(|origin| allowed.iter().any(|o| o == origin));
    if !any && !listed {
        return None;
    }

    let allow_origin = match origin {
        Some(origin) => HeaderValue::from_str(origin).ok()?,
        None => HeaderValue::from_static("*"),
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    Some(headers)
}

/// Answer preflight requests and decorate every other response
///
/// Runs outside authentication, so `OPTIONS` never needs a key.
pub async fn cors_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let headers = cors_headers(
        origin.as_deref(),
        state.settings.environment.as_str(),
        &state.settings.cors_origins,
    );

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if let Some(headers) = headers {
        response.headers_mut().extend(headers);
    }

    response
}
