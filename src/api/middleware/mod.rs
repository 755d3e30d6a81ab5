//! API middleware components

pub mod auth;
pub mod cors;
pub mod logging;
pub mod metrics;
pub mod security;

pub use auth::{require_any_key, require_read_forms, require_read_submissions, AuthenticatedKey};
pub use cors::{cors_headers, cors_middleware};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use security::{security_headers_middleware, validate_content_length, MAX_BODY_SIZE};
