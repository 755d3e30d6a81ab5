//! API key generation
//!
//! Keys are a readable prefix followed by the hex encoding of random bytes.

use rand::RngCore;

/// Prefix used when none is given
pub const DEFAULT_KEY_PREFIX: &str = "sk_";

/// Generator for secure API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Prefix for all generated keys (e.g., "sk_", "sk_test_")
    prefix: String,
    /// Number of random bytes to generate
    key_bytes: usize,
}

impl ApiKeyGenerator {
    /// Create a new API key generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            key_bytes: 32,
        }
    }

    /// Set the number of random bytes
    pub fn with_key_bytes(mut self, bytes: usize) -> Self {
        self.key_bytes = bytes;
        self
    }

    /// Generate a new API key
    pub fn generate(&self) -> String {
        let mut random_bytes = vec![0u8; self.key_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        format!("{}{}", self.prefix, hex::encode(random_bytes))
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::validate_api_key_secret;

    #[test]
    fn test_generate_key() {
        let key = ApiKeyGenerator::default().generate();

        assert!(key.starts_with("sk_"));
        // 32 bytes hex-encoded = 64 chars, plus prefix
        assert_eq!(key.len(), "sk_".len() + 64);
        assert!(key["sk_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_custom_prefix() {
        let key = ApiKeyGenerator::new("formie_live_").generate();
        assert!(key.starts_with("formie_live_"));
    }

    #[test]
    fn test_key_uniqueness() {
        let generator = ApiKeyGenerator::default();
        assert_ne!(generator.generate(), generator.generate());
    }

    #[test]
    fn test_custom_key_bytes() {
        let key = ApiKeyGenerator::new("").with_key_bytes(16).generate();
        assert_eq!(key.len(), 32);
    }

    #[test]
    fn test_generated_keys_are_valid_secrets() {
        let key = ApiKeyGenerator::default().generate();
        assert!(validate_api_key_secret(&key).is_ok());
    }
}
