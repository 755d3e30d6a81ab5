use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Key provider error: {provider} - {message}")]
    KeyProvider { provider: String, message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn key_provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::KeyProvider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Form 'contact' not found");
        assert_eq!(error.to_string(), "Not found: Form 'contact' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid CIDR block");
        assert_eq!(error.to_string(), "Validation error: Invalid CIDR block");
    }

    #[test]
    fn test_key_provider_error() {
        let error = DomainError::key_provider("database", "connection refused");
        assert_eq!(
            error.to_string(),
            "Key provider error: database - connection refused"
        );
    }
}
