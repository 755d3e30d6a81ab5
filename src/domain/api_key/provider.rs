//! Custom key provider trait

use super::entity::ApiKeyRecord;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Source of additional keys merged into the registry after the configured ones
/// (e.g. a database table of customer keys)
///
/// Lookups are synchronous; an implementation backed by remote storage is
/// expected to serve from its own refreshed snapshot.
#[cfg_attr(test, automock)]
pub trait KeyProvider: Send + Sync {
    /// All currently enabled custom keys
    fn custom_keys(&self) -> Result<Vec<ApiKeyRecord>, DomainError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}

/// Provider serving a fixed list of records
#[derive(Debug, Clone, Default)]
pub struct StaticKeyProvider {
    records: Vec<ApiKeyRecord>,
}

impl StaticKeyProvider {
    pub fn new(records: Vec<ApiKeyRecord>) -> Self {
        Self { records }
    }

    /// Load records from a JSON array file
    pub fn from_json_file(path: &str) -> Result<Self, DomainError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!("Failed to read key file '{}': {}", path, e))
        })?;

        let records: Vec<ApiKeyRecord> = serde_json::from_str(&contents).map_err(|e| {
            DomainError::configuration(format!("Invalid key file '{}': {}", path, e))
        })?;

        Ok(Self::new(records))
    }
}

impl KeyProvider for StaticKeyProvider {
    fn custom_keys(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        Ok(self.records.clone())
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}
