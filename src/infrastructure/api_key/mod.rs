//! API key infrastructure
//!
//! Key resolution, rate limiting, request signing, IP whitelisting and the
//! authorizer that combines them.

mod authorizer;
mod generator;
mod ip_whitelist;
mod rate_limiter;
mod registry;
pub mod signature;

pub use authorizer::{AuthDecision, AuthRequest, RequestAuthorizer, UnauthorizedReason};
pub use generator::{ApiKeyGenerator, DEFAULT_KEY_PREFIX};
pub use ip_whitelist::{ip_matches, is_allowed};
pub use rate_limiter::{
    RateLimitHeaders, RateLimiter, SlidingWindowRateLimiter, DEFAULT_WINDOW_SECS,
};
pub use registry::{log_registry_summary, KeyRegistry, KeySourceConfig, DEFAULT_DEV_KEY};
pub use signature::{SignatureError, SignedParts};
