//! Forms Gateway API
//!
//! Authenticated, rate-limited REST API over a forms and submissions store:
//! - Static API keys with per-key permissions and optional IP whitelists
//! - Optional HMAC request signing
//! - Sliding-window rate limiting per key
//! - Normalized field values independent of the store's field types

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, GatewaySettings};
use domain::api_key::StaticKeyProvider;
use domain::{DomainError, FormStore};
use infrastructure::{
    api_key::{
        log_registry_summary, KeyRegistry, KeySourceConfig, RequestAuthorizer,
        SlidingWindowRateLimiter,
    },
    form_store::InMemoryFormStore,
};
use tracing::info;

/// Build the key registry from configuration, `FORMIE_API_KEY*` and the
/// optional custom key file
pub fn create_key_registry(config: &AppConfig) -> Result<KeyRegistry, DomainError> {
    let gateway = &config.gateway;

    let sources = KeySourceConfig {
        primary_key: gateway.keys.primary.clone(),
        limited_key: gateway.keys.limited.clone(),
        test_key: gateway.keys.test.clone(),
        environment: gateway.environment.clone(),
        dev_mode: gateway.dev_mode,
        ip_whitelist: gateway.ip_whitelist.clone(),
        require_signature: gateway.require_signature,
    }
    .with_env_fallback();

    let mut registry = KeyRegistry::new(sources);

    if let Some(path) = gateway.custom_keys_path.as_deref() {
        let provider = StaticKeyProvider::from_json_file(path)?;
        info!(path = %path, "Loaded custom API keys");
        registry = registry.with_provider(Arc::new(provider));
    }

    Ok(registry)
}

/// Create the application state from configuration
pub fn create_app_state(config: &AppConfig) -> Result<AppState, DomainError> {
    let gateway = &config.gateway;

    let registry = create_key_registry(config)?;
    log_registry_summary(&registry);

    let authorizer = RequestAuthorizer::new(
        Arc::new(registry),
        Arc::new(SlidingWindowRateLimiter::new()),
    )
    .with_window_secs(gateway.rate_limit_window_secs)
    .with_signature_tolerance(gateway.signature_tolerance_secs);

    let store: Arc<dyn FormStore> = match config.store.seed_path.as_deref() {
        Some(path) => Arc::new(InMemoryFormStore::from_seed_file(path)?),
        None => {
            info!("No store seed configured, starting with an empty form store");
            Arc::new(InMemoryFormStore::new())
        }
    };

    let settings = GatewaySettings {
        environment: gateway.environment.clone(),
        dev_mode: gateway.dev_mode,
        trust_proxy_headers: config.server.trust_proxy_headers,
        cors_origins: config.cors.allowed_origins.clone(),
    };

    info!(
        environment = %settings.environment,
        dev_mode = settings.dev_mode,
        window_secs = gateway.rate_limit_window_secs,
        "Application state initialized"
    );

    Ok(AppState::new(authorizer, store, settings))
}
