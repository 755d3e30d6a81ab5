//! IP whitelist matching

use std::net::IpAddr;

use ipnet::IpNet;

use crate::domain::api_key::validate_ip_pattern;
use crate::domain::DomainError;

/// Match a client IP against a literal address or CIDR block
///
/// A malformed pattern is an error rather than a non-match. An unparsable
/// client address only matches a byte-identical literal pattern. IPv4-mapped
/// IPv6 addresses are compared as their IPv4 form.
pub fn ip_matches(client_ip: &str, pattern: &str) -> Result<bool, DomainError> {
    let client_ip = client_ip.trim();
    let pattern = pattern.trim();

    if client_ip == pattern {
        return Ok(true);
    }

    if pattern.contains('/') {
        let network: IpNet = pattern.parse().map_err(|e| {
            DomainError::configuration(format!("Invalid CIDR pattern '{}': {}", pattern, e))
        })?;

        return Ok(client_ip
            .parse::<IpAddr>()
            .map(|ip| network.contains(&ip.to_canonical()))
            .unwrap_or(false));
    }

    let expected: IpAddr = pattern.parse().map_err(|e| {
        DomainError::configuration(format!("Invalid IP pattern '{}': {}", pattern, e))
    })?;

    Ok(client_ip
        .parse::<IpAddr>()
        .map(|ip| ip.to_canonical() == expected.to_canonical())
        .unwrap_or(false))
}

/// Whether a client may use a key with this whitelist; empty means unrestricted
///
/// Every pattern is checked before the client address is considered, so a
/// malformed entry is reported even when the address is unknown.
pub fn is_allowed(client_ip: Option<IpAddr>, whitelist: &[String]) -> Result<bool, DomainError> {
    if whitelist.is_empty() {
        return Ok(true);
    }

    for pattern in whitelist {
        validate_ip_pattern(pattern.trim()).map_err(|e| DomainError::configuration(e.to_string()))?;
    }

    let Some(client_ip) = client_ip else {
        return Ok(false);
    };
    let client_ip = client_ip.to_canonical().to_string();

    for pattern in whitelist {
        if ip_matches(&client_ip, pattern)? {
            return Ok(true);
        }
    }

    Ok(false)
}
