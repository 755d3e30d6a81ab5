use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::api_key::{validate_ip_pattern, Environment};
use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub gateway: GatewayConfig,
    pub cors: CorsConfig,
    pub metrics: MetricsConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Take the client IP from the first `X-Forwarded-For` hop
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configured key secrets; unset values fall back to `FORMIE_API_KEY*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub primary: Option<String>,
    pub limited: Option<String>,
    pub test: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub environment: Environment,
    /// Enables the development key and error detail in responses
    pub dev_mode: bool,
    pub keys: KeysConfig,
    pub ip_whitelist: Vec<String>,
    pub rate_limit_window_secs: u64,
    pub signature_tolerance_secs: i64,
    /// Unset requires signatures exactly in production
    pub require_signature: Option<bool>,
    /// JSON file of additional key records
    pub custom_keys_path: Option<String>,
}

/// Allowed origins per environment name
///
/// An environment missing from the table accepts any origin.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON seed for the in-memory store
    pub seed_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            trust_proxy_headers: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            dev_mode: false,
            keys: KeysConfig::default(),
            ip_whitelist: Vec::new(),
            rate_limit_window_secs: 3600,
            signature_tolerance_secs: 300,
            require_signature: None,
            custom_keys_path: None,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        let mut allowed_origins = HashMap::new();
        allowed_origins.insert("production".to_string(), Vec::new());
        allowed_origins.insert("staging".to_string(), Vec::new());
        allowed_origins.insert("dev".to_string(), vec!["http://localhost:3000".to_string()]);

        Self { allowed_origins }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("gateway.ip_whitelist")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings that would otherwise fail at request time
    pub fn validate(&self) -> Result<(), DomainError> {
        for pattern in &self.gateway.ip_whitelist {
            validate_ip_pattern(pattern)
                .map_err(|e| DomainError::configuration(e.to_string()))?;
        }

        if self.gateway.rate_limit_window_secs == 0 {
            return Err(DomainError::configuration(
                "gateway.rate_limit_window_secs must be greater than zero",
            ));
        }

        if self.gateway.signature_tolerance_secs < 0 {
            return Err(DomainError::configuration(
                "gateway.signature_tolerance_secs cannot be negative",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert!(!config.server.trust_proxy_headers);
        assert_eq!(config.gateway.environment, Environment::Development);
        assert_eq!(config.gateway.rate_limit_window_secs, 3600);
        assert_eq!(config.gateway.signature_tolerance_secs, 300);
        assert!(config.gateway.require_signature.is_none());
        assert!(config.metrics.enabled);
        assert_eq!(
            config.cors.allowed_origins["dev"],
            vec!["http://localhost:3000".to_string()]
        );
        assert!(config.cors.allowed_origins["production"].is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "gateway": {
                "environment": "production",
                "keys": {"primary": "abc"}
            }
        }))
        .unwrap();

        assert_eq!(config.gateway.environment, Environment::Production);
        assert_eq!(config.gateway.keys.primary.as_deref(), Some("abc"));
        assert_eq!(config.gateway.rate_limit_window_secs, 3600);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_validate_rejects_malformed_whitelist() {
        let mut config = AppConfig::default();
        config.gateway.ip_whitelist = vec!["10.0.0.0/8".into(), "10.0.0.300".into()];

        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = AppConfig::default();
        config.gateway.rate_limit_window_secs = 0;

        assert!(config.validate().is_err());
    }
}
