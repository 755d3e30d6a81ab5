//! Request authorization
//!
//! Combines key resolution, permission checks, the IP whitelist, signature
//! verification and rate limiting into one admission decision. Checks run in
//! that order and the first failure wins.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::ip_whitelist;
use super::rate_limiter::{RateLimitHeaders, RateLimiter, DEFAULT_WINDOW_SECS};
use super::registry::KeyRegistry;
use super::signature::{self, SignatureError, SignedParts, DEFAULT_TOLERANCE_SECS};
use crate::domain::api_key::ApiKeyRecord;
use crate::domain::DomainError;

/// Inputs to one authorization decision
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthRequest<'a> {
    pub api_key: Option<&'a str>,
    /// `None` admits any valid key
    pub permission: Option<&'a str>,
    pub client_ip: Option<IpAddr>,
    pub signed: SignedParts<'a>,
}

/// Why a request was refused as unauthenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthorizedReason {
    MissingKey,
    UnknownKey,
    Signature(SignatureError),
}

impl UnauthorizedReason {
    pub fn message(&self) -> String {
        match self {
            Self::MissingKey => "API key required".to_string(),
            Self::UnknownKey => "Invalid API key".to_string(),
            Self::Signature(e) => e.to_string(),
        }
    }
}

/// Outcome of authorization
#[derive(Debug, Clone, PartialEq)]
pub enum AuthDecision {
    Admitted {
        record: ApiKeyRecord,
        rate_limit: RateLimitHeaders,
    },
    Unauthorized(UnauthorizedReason),
    Forbidden {
        permission: String,
    },
    IpRejected,
    RateLimited(RateLimitHeaders),
}

impl AuthDecision {
    /// Outcome label for logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Admitted { .. } => "admitted",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::IpRejected => "ip_rejected",
            Self::RateLimited(_) => "rate_limited",
        }
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }
}

/// Admission policy for inbound requests
#[derive(Debug, Clone)]
pub struct RequestAuthorizer {
    registry: Arc<KeyRegistry>,
    limiter: Arc<dyn RateLimiter>,
    window_secs: u64,
    tolerance_secs: i64,
}

impl RequestAuthorizer {
    pub fn new(registry: Arc<KeyRegistry>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            registry,
            limiter,
            window_secs: DEFAULT_WINDOW_SECS,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_window_secs(mut self, window_secs: u64) -> Self {
        self.window_secs = window_secs;
        self
    }

    pub fn with_signature_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    /// Decide whether a request is admitted
    ///
    /// Internal faults such as a malformed whitelist pattern are returned as
    /// errors and never as one of the rejection outcomes.
    pub fn authorize(
        &self,
        request: &AuthRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<AuthDecision, DomainError> {
        let Some(candidate) = request.api_key.filter(|key| !key.is_empty()) else {
            return Ok(AuthDecision::Unauthorized(UnauthorizedReason::MissingKey));
        };

        let Some(record) = self.registry.resolve(Some(candidate)) else {
            return Ok(AuthDecision::Unauthorized(UnauthorizedReason::UnknownKey));
        };

        if let Some(permission) = request.permission {
            if !record.has_permission(permission) {
                return Ok(AuthDecision::Forbidden {
                    permission: permission.to_string(),
                });
            }
        }

        if !ip_whitelist::is_allowed(request.client_ip, record.ip_whitelist())? {
            return Ok(AuthDecision::IpRejected);
        }

        if record.require_signature() {
            if let Err(e) =
                signature::verify(record.secret(), &request.signed, now, self.tolerance_secs)
            {
                debug!(key_prefix = %record.secret_prefix(), reason = %e, "Signature rejected");
                return Ok(AuthDecision::Unauthorized(UnauthorizedReason::Signature(e)));
            }
        }

        let allowed = self
            .limiter
            .allow(record.secret(), record.rate_limit(), self.window_secs, now);
        let rate_limit = self.limiter.headers(
            record.secret(),
            record.rate_limit(),
            self.window_secs,
            now,
        );

        if !allowed {
            return Ok(AuthDecision::RateLimited(rate_limit));
        }

        Ok(AuthDecision::Admitted { record, rate_limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{permission, Environment};
    use crate::infrastructure::api_key::registry::KeySourceConfig;
    use crate::infrastructure::api_key::rate_limiter::SlidingWindowRateLimiter;

    const PATH: &str = "/api/v1/formie/forms";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn authorizer_with(config: KeySourceConfig) -> RequestAuthorizer {
        RequestAuthorizer::new(
            Arc::new(KeyRegistry::new(config)),
            Arc::new(SlidingWindowRateLimiter::new()),
        )
    }

    fn dev_config() -> KeySourceConfig {
        KeySourceConfig {
            primary_key: Some("primary_key".to_string()),
            limited_key: Some("limited_key".to_string()),
            environment: Environment::Development,
            ..Default::default()
        }
    }

    fn request<'a>(key: Option<&'a str>, permission: &'a str) -> AuthRequest<'a> {
        AuthRequest {
            api_key: key,
            permission: Some(permission),
            client_ip: Some("127.0.0.1".parse().unwrap()),
            signed: SignedParts {
                method: "GET",
                path: PATH,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_missing_and_unknown_key() {
        let authorizer = authorizer_with(dev_config());

        assert_eq!(
            authorizer.authorize(&request(None, permission::READ_FORMS), now()).unwrap(),
            AuthDecision::Unauthorized(UnauthorizedReason::MissingKey)
        );
        assert_eq!(
            authorizer.authorize(&request(Some(""), permission::READ_FORMS), now()).unwrap(),
            AuthDecision::Unauthorized(UnauthorizedReason::MissingKey)
        );
        assert_eq!(
            authorizer
                .authorize(&request(Some("nope"), permission::READ_FORMS), now())
                .unwrap(),
            AuthDecision::Unauthorized(UnauthorizedReason::UnknownKey)
        );
    }

    #[test]
    fn test_permission_gating() {
        let authorizer = authorizer_with(dev_config());

        let decision = authorizer
            .authorize(&request(Some("limited_key"), permission::READ_SUBMISSIONS), now())
            .unwrap();
        assert_eq!(
            decision,
            AuthDecision::Forbidden {
                permission: permission::READ_SUBMISSIONS.to_string()
            }
        );

        let decision = authorizer
            .authorize(&request(Some("limited_key"), permission::READ_FORMS), now())
            .unwrap();
        assert!(decision.is_admitted());
    }

    #[test]
    fn test_forbidden_regardless_of_rate_limit_state() {
        let mut config = dev_config();
        config.environment = Environment::Staging;
        let authorizer = authorizer_with(config).with_window_secs(60);

        for _ in 0..50 {
            let decision = authorizer
                .authorize(&request(Some("limited_key"), permission::READ_FORMS), now())
                .unwrap();
            assert!(decision.is_admitted());
        }

        let decision = authorizer
            .authorize(&request(Some("limited_key"), permission::READ_FORMS), now())
            .unwrap();
        assert!(matches!(decision, AuthDecision::RateLimited(_)));

        let decision = authorizer
            .authorize(&request(Some("limited_key"), permission::READ_SUBMISSIONS), now())
            .unwrap();
        assert_eq!(decision.outcome(), "forbidden");
    }

    #[test]
    fn test_any_permission_accepts_valid_key() {
        let authorizer = authorizer_with(dev_config());
        let mut req = request(Some("limited_key"), permission::READ_FORMS);
        req.permission = None;

        assert!(authorizer.authorize(&req, now()).unwrap().is_admitted());
    }

    #[test]
    fn test_ip_whitelist() {
        let mut config = dev_config();
        config.ip_whitelist = vec!["10.0.0.0/24".to_string()];
        let authorizer = authorizer_with(config);

        let mut req = request(Some("primary_key"), permission::READ_FORMS);
        assert_eq!(authorizer.authorize(&req, now()).unwrap(), AuthDecision::IpRejected);

        req.client_ip = Some("10.0.0.5".parse().unwrap());
        assert!(authorizer.authorize(&req, now()).unwrap().is_admitted());

        req.client_ip = None;
        assert_eq!(authorizer.authorize(&req, now()).unwrap(), AuthDecision::IpRejected);
    }

    #[test]
    fn test_malformed_whitelist_is_internal_error() {
        let mut config = dev_config();
        config.ip_whitelist = vec!["10.0.0.0/40".to_string()];
        let authorizer = authorizer_with(config);

        let result = authorizer.authorize(&request(Some("primary_key"), permission::READ_FORMS), now());
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_signature_required() {
        let mut config = dev_config();
        config.require_signature = Some(true);
        let authorizer = authorizer_with(config);

        let req = request(Some("primary_key"), permission::READ_FORMS);
        assert_eq!(
            authorizer.authorize(&req, now()).unwrap(),
            AuthDecision::Unauthorized(UnauthorizedReason::Signature(
                SignatureError::MissingTimestamp
            ))
        );

        let timestamp = now().timestamp().to_string();
        let sig = signature::sign("primary_key", "GET", PATH, &timestamp, b"");
        let mut signed = req;
        signed.signed.timestamp = Some(&timestamp);
        signed.signed.signature = Some(&sig);
        assert!(authorizer.authorize(&signed, now()).unwrap().is_admitted());
    }

    #[test]
    fn test_signature_checked_after_whitelist() {
        let mut config = dev_config();
        config.require_signature = Some(true);
        config.ip_whitelist = vec!["10.0.0.1".to_string()];
        let authorizer = authorizer_with(config);

        let req = request(Some("primary_key"), permission::READ_FORMS);
        assert_eq!(authorizer.authorize(&req, now()).unwrap(), AuthDecision::IpRejected);
    }

    #[test]
    fn test_rate_limited_carries_headers() {
        let mut config = dev_config();
        config.environment = Environment::Production;
        config.require_signature = Some(false);
        let authorizer = authorizer_with(config);

        let req = request(Some("limited_key"), permission::READ_FORMS);
        for i in 0..100 {
            match authorizer.authorize(&req, now()).unwrap() {
                AuthDecision::Admitted { rate_limit, .. } => {
                    assert_eq!(rate_limit.limit, 100);
                    assert_eq!(rate_limit.remaining, 99 - i);
                }
                other => panic!("expected admission, got {:?}", other),
            }
        }

        match authorizer.authorize(&req, now()).unwrap() {
            AuthDecision::RateLimited(headers) => {
                assert_eq!(headers.remaining, 0);
                assert_eq!(headers.reset_at, now().timestamp() + 3600);
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }
}
