//! Error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::envelope::{ErrorCode, ErrorEnvelope};
use crate::domain::DomainError;

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorEnvelope,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorEnvelope::new(code, message, None, false),
        }
    }

    /// Attach the underlying error text, visible only in development mode
    pub fn with_detail(mut self, detail: impl ToString, dev_mode: bool) -> Self {
        if dev_mode {
            self.response.error.detail = Some(detail.to_string());
        }
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.response.error.code
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, message)
    }

    /// Required query parameter absent
    pub fn missing_parameter(name: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::MissingParameter,
            format!("Missing required parameter '{}'", name),
        )
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    /// Permission error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
    }

    /// Client address outside the key's whitelist
    pub fn ip_not_allowed() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            ErrorCode::IpNotAllowed,
            "IP address not allowed",
        )
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }

    /// Rate limit error
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, ErrorCode::RateLimited, message)
    }

    /// Request body over the size limit
    pub fn payload_too_large(max_bytes: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::PayloadTooLarge,
            format!("Request body too large (max: {} bytes)", max_bytes),
        )
    }

    /// Internal server error with a category code
    pub fn internal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            _ => Self::internal(ErrorCode::InternalError, "Internal server error"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}: {}",
            self.response.error.code, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid status");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert_eq!(err.response.error.message, "Invalid status");
        assert!(!err.response.success);
    }

    #[test]
    fn test_detail_hidden_outside_dev_mode() {
        let err = ApiError::internal(ErrorCode::SubmissionsFetchError, "Failed")
            .with_detail("disk on fire", false);
        assert!(err.response.error.detail.is_none());

        let err = ApiError::internal(ErrorCode::SubmissionsFetchError, "Failed")
            .with_detail("disk on fire", true);
        assert_eq!(err.response.error.detail.as_deref(), Some("disk on fire"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let api_err: ApiError = DomainError::not_found("Form not found").into();
        assert_eq!(api_err.status, StatusCode::NOT_FOUND);
        assert_eq!(api_err.code(), ErrorCode::NotFound);

        let api_err: ApiError = DomainError::store("timeout").into();
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.response.error.message, "Internal server error");
    }

    #[test]
    fn test_all_error_types() {
        assert_eq!(ApiError::bad_request("").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::missing_parameter("formId").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("").status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("").status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::ip_not_allowed().status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("").status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::rate_limited("").status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::payload_too_large(10).status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::internal(ErrorCode::AuthorizationError, "").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
