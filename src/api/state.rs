//! Application state for shared services

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::api_key::Environment;
use crate::domain::{FieldValueTransformer, FormStore};
use crate::infrastructure::api_key::RequestAuthorizer;

/// Request-independent settings read by handlers and middleware
#[derive(Debug, Clone, Default)]
pub struct GatewaySettings {
    pub environment: Environment,
    /// Exposes error detail in responses
    pub dev_mode: bool,
    /// Take the client address from `X-Forwarded-For`
    pub trust_proxy_headers: bool,
    /// Environment name to allowed CORS origins
    pub cors_origins: HashMap<String, Vec<String>>,
}

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub authorizer: Arc<RequestAuthorizer>,
    pub store: Arc<dyn FormStore>,
    pub transformer: Arc<FieldValueTransformer>,
    pub settings: Arc<GatewaySettings>,
}

impl AppState {
    pub fn new(
        authorizer: RequestAuthorizer,
        store: Arc<dyn FormStore>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            authorizer: Arc::new(authorizer),
            store,
            transformer: Arc::new(FieldValueTransformer::default()),
            settings: Arc::new(settings),
        }
    }

    pub fn with_transformer(mut self, transformer: FieldValueTransformer) -> Self {
        self.transformer = Arc::new(transformer);
        self
    }

    pub fn dev_mode(&self) -> bool {
        self.settings.dev_mode
    }
}
