//! Key registry
//!
//! Derives the active key set from configuration, the legacy environment
//! variables and an optional custom provider, then resolves presented keys
//! by exact match.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::api_key::{
    rate_limit_for, validate_api_key_record, ApiKeyInfo, ApiKeyPermissions, ApiKeyRecord,
    Environment, KeyProvider, KeyTier,
};

/// Secret of the development key when none is configured
pub const DEFAULT_DEV_KEY: &str = "test_key_dev_only";

/// Legacy environment variables read when the config keys are unset
pub const PRIMARY_KEY_ENV: &str = "FORMIE_API_KEY";
pub const LIMITED_KEY_ENV: &str = "FORMIE_API_KEY_LIMITED";
pub const TEST_KEY_ENV: &str = "FORMIE_API_KEY_TEST";

const DEV_KEY_RATE_LIMIT: u32 = 1000;

/// Environment tag reported for the development key
pub const DEV_KEY_ENVIRONMENT: &str = "development";

/// Configured key sources
#[derive(Debug, Clone, Default)]
pub struct KeySourceConfig {
    pub primary_key: Option<String>,
    pub limited_key: Option<String>,
    pub test_key: Option<String>,
    pub environment: Environment,
    pub dev_mode: bool,
    /// Applied to the primary and limited keys
    pub ip_whitelist: Vec<String>,
    /// `None` requires signatures exactly in production
    pub require_signature: Option<bool>,
}

impl KeySourceConfig {
    /// Fill unset keys from the `FORMIE_API_KEY*` environment variables
    pub fn with_env_fallback(self) -> Self {
        self.fill_from(|name| std::env::var(name).ok())
    }

    fn fill_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if self.primary_key.is_none() {
            self.primary_key = read(PRIMARY_KEY_ENV);
        }
        if self.limited_key.is_none() {
            self.limited_key = read(LIMITED_KEY_ENV);
        }
        if self.test_key.is_none() {
            self.test_key = read(TEST_KEY_ENV);
        }

        self
    }

    pub fn signature_required(&self) -> bool {
        self.require_signature
            .unwrap_or_else(|| self.environment.is_production())
    }
}

/// Resolves presented key strings to key records
#[derive(Clone)]
pub struct KeyRegistry {
    config: KeySourceConfig,
    provider: Option<Arc<dyn KeyProvider>>,
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("environment", &self.config.environment)
            .field("dev_mode", &self.config.dev_mode)
            .field("provider", &self.provider.as_ref().map(|p| p.provider_name()))
            .finish()
    }
}

impl KeyRegistry {
    pub fn new(config: KeySourceConfig) -> Self {
        Self {
            config,
            provider: None,
        }
    }

    /// Merge keys from a custom provider after the configured ones
    pub fn with_provider(mut self, provider: Arc<dyn KeyProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.config.environment
    }

    /// Resolve a candidate key; missing, empty and unknown keys resolve to `None`
    pub fn resolve(&self, candidate: Option<&str>) -> Option<ApiKeyRecord> {
        let candidate = candidate.filter(|key| !key.is_empty())?;
        self.snapshot().remove(candidate)
    }

    /// Non-secret view of a record
    pub fn describe(&self, record: &ApiKeyRecord) -> ApiKeyInfo {
        record.info()
    }

    /// All active records, later sources overriding earlier ones by secret
    pub fn records(&self) -> Vec<ApiKeyRecord> {
        let mut records: Vec<ApiKeyRecord> = self.snapshot().into_values().collect();
        records.sort_by(|a, b| a.name().cmp(b.name()));
        records
    }

    fn snapshot(&self) -> HashMap<String, ApiKeyRecord> {
        let mut keys = HashMap::new();

        for record in self.configured_records() {
            keys.insert(record.secret().to_string(), record);
        }

        for record in self.custom_records() {
            keys.insert(record.secret().to_string(), record);
        }

        keys
    }

    fn configured_records(&self) -> Vec<ApiKeyRecord> {
        let config = &self.config;
        let mut records = Vec::with_capacity(3);

        if let Some(secret) = config.primary_key.as_deref().filter(|s| !s.is_empty()) {
            records.push(self.built_in(
                secret,
                "Primary API Key",
                ApiKeyPermissions::full_access(),
                KeyTier::Primary,
            ));
        }

        if let Some(secret) = config.limited_key.as_deref().filter(|s| !s.is_empty()) {
            records.push(self.built_in(
                secret,
                "Limited Access Key",
                ApiKeyPermissions::read_only(),
                KeyTier::Limited,
            ));
        }

        if config.dev_mode {
            let secret = config
                .test_key
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_DEV_KEY);

            records.push(
                ApiKeyRecord::new(secret, "Development Test Key", DEV_KEY_RATE_LIMIT)
                    .with_permissions(ApiKeyPermissions::full_access())
                    .with_environment(Environment::Other(DEV_KEY_ENVIRONMENT.to_string()))
                    .with_tier(KeyTier::Development),
            );
        }

        records
    }

    fn built_in(
        &self,
        secret: &str,
        name: &str,
        permissions: ApiKeyPermissions,
        tier: KeyTier,
    ) -> ApiKeyRecord {
        let environment = self.config.environment.clone();

        ApiKeyRecord::new(secret, name, rate_limit_for(&environment, tier))
            .with_permissions(permissions)
            .with_environment(environment)
            .with_ip_whitelist(self.config.ip_whitelist.clone())
            .with_signature_required(self.config.signature_required())
            .with_tier(tier)
    }

    fn custom_records(&self) -> Vec<ApiKeyRecord> {
        let Some(provider) = &self.provider else {
            return Vec::new();
        };

        match provider.custom_keys() {
            Ok(records) => records
                .into_iter()
                .filter(|record| match validate_api_key_record(record) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            provider = provider.provider_name(),
                            key_prefix = %record.secret_prefix(),
                            error = %e,
                            "Skipping invalid custom API key"
                        );
                        false
                    }
                })
                .collect(),
            Err(e) => {
                warn!(
                    provider = provider.provider_name(),
                    error = %e,
                    "Custom key provider failed, using configured keys only"
                );
                Vec::new()
            }
        }
    }
}

/// Log the configured key set once at startup, secrets redacted
pub fn log_registry_summary(registry: &KeyRegistry) {
    for record in registry.records() {
        debug!(
            name = %record.name(),
            key_prefix = %record.secret_prefix(),
            environment = %record.environment(),
            rate_limit = record.rate_limit(),
            require_signature = record.require_signature(),
            "Registered API key"
        );
    }
}
