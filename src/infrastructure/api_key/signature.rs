//! HMAC request signing
//!
//! Signed requests carry `X-Timestamp` (unix seconds) and `X-Signature`, the
//! lowercase hex HMAC-SHA256 of `METHOD\npath\ntimestamp\nbody` keyed with
//! the API key itself.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded HMAC-SHA256 digest
const SIGNATURE_HEX_LEN: usize = 64;

/// Maximum clock skew accepted between caller and gateway
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// The parts of a request covered by the signature
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedParts<'a> {
    pub method: &'a str,
    /// Path including the query string
    pub path: &'a str,
    pub timestamp: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub body: &'a [u8],
}

/// Why a signature was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Missing request timestamp")]
    MissingTimestamp,

    #[error("Invalid request timestamp")]
    InvalidTimestamp,

    #[error("Request timestamp outside the accepted window")]
    StaleTimestamp,

    #[error("Missing request signature")]
    MissingSignature,

    #[error("Invalid request signature")]
    Mismatch,
}

fn mac(secret: &str, method: &str, path: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");

    mac.update(method.as_bytes());
    mac.update(b"\n");
    mac.update(path.as_bytes());
    mac.update(b"\n");
    mac.update(timestamp.as_bytes());
    mac.update(b"\n");
    mac.update(body);
    mac
}

/// Compute the hex signature for a request
pub fn sign(secret: &str, method: &str, path: &str, timestamp: &str, body: &[u8]) -> String {
    hex::encode(mac(secret, method, path, timestamp, body).finalize().into_bytes())
}

fn is_lower_hex_digest(signature: &str) -> bool {
    signature.len() == SIGNATURE_HEX_LEN
        && signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Verify a signed request against `now`
///
/// Both headers are compared as sent: no trimming and no case folding.
pub fn verify(
    secret: &str,
    parts: &SignedParts<'_>,
    now: DateTime<Utc>,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let timestamp = parts
        .timestamp
        .filter(|t| !t.is_empty())
        .ok_or(SignatureError::MissingTimestamp)?;

    let sent_at: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;

    if now.timestamp().abs_diff(sent_at) > tolerance_secs.unsigned_abs() {
        return Err(SignatureError::StaleTimestamp);
    }

    let signature = parts
        .signature
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::MissingSignature)?;

    // Only the exact encoding produced by `sign` is accepted
    if !is_lower_hex_digest(signature) {
        return Err(SignatureError::Mismatch);
    }

    let expected = hex::decode(signature).map_err(|_| SignatureError::Mismatch)?;

    mac(secret, parts.method, parts.path, timestamp, parts.body)
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "primary_key";
    const BODY: &[u8] = br#"{"formId":1}"#;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn signed<'a>(timestamp: &'a str, signature: &'a str, body: &'a [u8]) -> SignedParts<'a> {
        SignedParts {
            method: "POST",
            path: "/api/v1/formie/submissions?formId=1",
            timestamp: Some(timestamp),
            signature: Some(signature),
            body,
        }
    }

    #[test]
    fn test_valid_signature() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        assert_eq!(signature.len(), 64);
        assert!(verify(SECRET, &signed("1700000000", &signature, BODY), now(), 300).is_ok());
    }

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256("key", "GET\n/\n0\n")
        let mut mac = HmacSha256::new_from_slice(b"key").unwrap();
        mac.update(b"GET\n/\n0\n");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign("key", "GET", "/", "0", b""), expected);
    }

    #[test]
    fn test_mutated_signature_rejected() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        let mut mutated = signature.into_bytes();
        mutated[0] = if mutated[0] == b'a' { b'b' } else { b'a' };
        let mutated = String::from_utf8(mutated).unwrap();

        assert_eq!(
            verify(SECRET, &signed("1700000000", &mutated, BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_mutated_body_rejected() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        assert_eq!(
            verify(SECRET, &signed("1700000000", &signature, br#"{"formId":2}"#), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_mutated_timestamp_rejected() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        assert_eq!(
            verify(SECRET, &signed("1700000001", &signature, BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected_even_if_correct() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1699999699", BODY);

        assert_eq!(
            verify(SECRET, &signed("1699999699", &signature, BODY), now(), 300),
            Err(SignatureError::StaleTimestamp)
        );

        let future = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000301", BODY);
        assert_eq!(
            verify(SECRET, &signed("1700000301", &future, BODY), now(), 300),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn test_tolerance_boundary_accepted() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1699999700", BODY);

        assert!(verify(SECRET, &signed("1699999700", &signature, BODY), now(), 300).is_ok());
    }

    #[test]
    fn test_missing_headers() {
        let parts = SignedParts {
            method: "GET",
            path: "/",
            ..Default::default()
        };
        assert_eq!(
            verify(SECRET, &parts, now(), 300),
            Err(SignatureError::MissingTimestamp)
        );

        let parts = SignedParts {
            timestamp: Some("1700000000"),
            ..parts
        };
        assert_eq!(
            verify(SECRET, &parts, now(), 300),
            Err(SignatureError::MissingSignature)
        );
    }

    #[test]
    fn test_invalid_timestamp_and_hex() {
        assert_eq!(
            verify(SECRET, &signed("yesterday", "abcd", BODY), now(), 300),
            Err(SignatureError::InvalidTimestamp)
        );
        assert_eq!(
            verify(SECRET, &signed("1700000000", "not-hex", BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_case_flipped_signature_rejected() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        let position = signature
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap();
        let mut flipped = signature.clone();
        flipped.replace_range(
            position..position + 1,
            &signature[position..position + 1].to_ascii_uppercase(),
        );

        assert_ne!(flipped, signature);
        assert_eq!(
            verify(SECRET, &signed("1700000000", &flipped, BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify(SECRET, &signed("1700000000", &signature.to_ascii_uppercase(), BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_padded_headers_rejected() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        assert_eq!(
            verify(SECRET, &signed("1700000000 ", &signature, BODY), now(), 300),
            Err(SignatureError::InvalidTimestamp)
        );
        assert_eq!(
            verify(SECRET, &signed(" 1700000000", &signature, BODY), now(), 300),
            Err(SignatureError::InvalidTimestamp)
        );

        let padded = format!("{} ", signature);
        assert_eq!(
            verify(SECRET, &signed("1700000000", &padded, BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let signature = sign(SECRET, "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        assert_eq!(
            verify(SECRET, &signed("1700000000", &signature[..62], BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign("other_key", "POST", "/api/v1/formie/submissions?formId=1", "1700000000", BODY);

        assert_eq!(
            verify(SECRET, &signed("1700000000", &signature, BODY), now(), 300),
            Err(SignatureError::Mismatch)
        );
    }
}
