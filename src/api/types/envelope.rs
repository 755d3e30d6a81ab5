//! Response envelope shared by every endpoint

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Machine-readable error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    IpNotAllowed,
    RateLimited,
    NotFound,
    BadRequest,
    MissingParameter,
    PayloadTooLarge,
    AuthorizationError,
    FormsFetchError,
    SubmissionsFetchError,
    InternalError,
}

/// Pagination and timing metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    pub timestamp: String,
}

impl ResponseMeta {
    pub fn now() -> Self {
        Self {
            total: None,
            limit: None,
            offset: None,
            timestamp: format_timestamp(Utc::now()),
        }
    }

    pub fn paged(total: usize, limit: usize, offset: usize) -> Self {
        Self {
            total: Some(total),
            limit: Some(limit),
            offset: Some(offset),
            ..Self::now()
        }
    }
}

/// `{success: true, data, meta}`
#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    pub data: T,
    pub meta: ResponseMeta,
}

/// Wrap a payload in the success envelope
pub fn success<T: Serialize>(data: T, meta: ResponseMeta) -> SuccessEnvelope<T> {
    SuccessEnvelope {
        success: true,
        data,
        meta,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// `{success: false, error: {code, message, detail?}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    /// `detail` is only kept in development mode
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        detail: Option<String>,
        dev_mode: bool,
    ) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code,
                message: message.into(),
                detail: detail.filter(|_| dev_mode),
            },
        }
    }
}

/// ISO-8601 with an explicit offset, e.g. `2025-01-31T12:00:00+00:00`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}
