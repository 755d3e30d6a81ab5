//! API key validation utilities

use std::net::IpAddr;

use ipnet::IpNet;
use thiserror::Error;

use super::entity::ApiKeyRecord;

/// Errors that can occur while validating key configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key secret cannot be empty")]
    EmptySecret,

    #[error("API key secret cannot contain whitespace")]
    WhitespaceInSecret,

    #[error("API key name cannot be empty")]
    EmptyName,

    #[error("Invalid IP whitelist entry '{0}': expected an IP address or CIDR block")]
    InvalidIpPattern(String),
}

/// Validate an API key secret
///
/// Secrets are matched exactly against the `X-API-Key` header value, which is
/// trimmed before lookup, so leading/trailing or embedded whitespace would make
/// a key unreachable.
pub fn validate_api_key_secret(secret: &str) -> Result<(), ApiKeyValidationError> {
    if secret.is_empty() {
        return Err(ApiKeyValidationError::EmptySecret);
    }

    if secret.chars().any(char::is_whitespace) {
        return Err(ApiKeyValidationError::WhitespaceInSecret);
    }

    Ok(())
}

/// Validate a whitelist entry: a literal IPv4/IPv6 address or a CIDR block
pub fn validate_ip_pattern(pattern: &str) -> Result<(), ApiKeyValidationError> {
    let valid = if pattern.contains('/') {
        pattern.parse::<IpNet>().is_ok()
    } else {
        pattern.parse::<IpAddr>().is_ok()
    };

    if valid {
        Ok(())
    } else {
        Err(ApiKeyValidationError::InvalidIpPattern(pattern.to_string()))
    }
}

/// Validate every field of a record that can be checked statically
pub fn validate_api_key_record(record: &ApiKeyRecord) -> Result<(), ApiKeyValidationError> {
    validate_api_key_secret(record.secret())?;

    if record.name().trim().is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    for pattern in record.ip_whitelist() {
        validate_ip_pattern(pattern)?;
    }

    Ok(())
}
