//! API key domain
//!
//! Key records, permission sets, the environment/tier rate-limit table and the
//! trait for plugging in externally managed keys.

mod entity;
mod provider;
mod validation;

pub use entity::{
    permission, rate_limit_for, redact_secret, ApiKeyInfo, ApiKeyPermissions, ApiKeyRecord,
    Environment, KeyTier,
};
pub use provider::{KeyProvider, StaticKeyProvider};
#[cfg(test)]
pub use provider::MockKeyProvider;
pub use validation::{
    validate_api_key_record, validate_api_key_secret, validate_ip_pattern, ApiKeyValidationError,
};
