//! API key record and related types

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Well-known permission names
pub mod permission {
    pub const READ_FORMS: &str = "read_forms";
    pub const READ_SUBMISSIONS: &str = "read_submissions";
    pub const CREATE_SUBMISSIONS: &str = "create_submissions";
}

/// Deployment environment a key was issued for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    Production,
    Staging,
    #[default]
    Development,
    Other(String),
}

impl Environment {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "dev",
            Self::Other(name) => name,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl From<&str> for Environment {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" => Self::Staging,
            "dev" | "development" | "local" => Self::Development,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.as_str().to_string()
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a key came from; drives the default rate limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTier {
    Primary,
    Limited,
    Development,
    #[default]
    Custom,
}

/// Requests allowed per window for a key tier in an environment
pub fn rate_limit_for(environment: &Environment, tier: KeyTier) -> u32 {
    match (environment, tier) {
        (Environment::Production, KeyTier::Primary) => 1000,
        (Environment::Production, KeyTier::Limited) => 100,
        (Environment::Staging, KeyTier::Primary) => 500,
        (Environment::Staging, KeyTier::Limited) => 50,
        _ => 1000,
    }
}

/// Unordered set of permission names granted to a key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyPermissions(HashSet<String>);

impl ApiKeyPermissions {
    /// Create permissions with no access
    pub fn new() -> Self {
        Self::default()
    }

    /// Read forms, read submissions and create submissions
    pub fn full_access() -> Self {
        Self::from_names([
            permission::READ_FORMS,
            permission::READ_SUBMISSIONS,
            permission::CREATE_SUBMISSIONS,
        ])
    }

    /// Read forms only
    pub fn read_only() -> Self {
        Self::from_names([permission::READ_FORMS])
    }

    pub fn from_names(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into());
        self
    }

    /// Check whether the named permission is granted
    pub fn allows(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Permission names in stable (sorted) order, for display
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// A single credential as seen by the registry
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRecord {
    secret: String,
    name: String,
    #[serde(default)]
    permissions: ApiKeyPermissions,
    rate_limit: u32,
    #[serde(default)]
    environment: Environment,
    #[serde(default)]
    ip_whitelist: Vec<String>,
    #[serde(default)]
    require_signature: bool,
    #[serde(default)]
    tier: KeyTier,
}

impl ApiKeyRecord {
    pub fn new(secret: impl Into<String>, name: impl Into<String>, rate_limit: u32) -> Self {
        Self {
            secret: secret.into(),
            name: name.into(),
            permissions: ApiKeyPermissions::new(),
            rate_limit,
            environment: Environment::default(),
            ip_whitelist: Vec::new(),
            require_signature: false,
            tier: KeyTier::default(),
        }
    }

    pub fn with_permissions(mut self, permissions: ApiKeyPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_ip_whitelist(mut self, whitelist: Vec<String>) -> Self {
        self.ip_whitelist = whitelist;
        self
    }

    pub fn with_signature_required(mut self, required: bool) -> Self {
        self.require_signature = required;
        self
    }

    pub fn with_tier(mut self, tier: KeyTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permissions(&self) -> &ApiKeyPermissions {
        &self.permissions
    }

    pub fn rate_limit(&self) -> u32 {
        self.rate_limit
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn ip_whitelist(&self) -> &[String] {
        &self.ip_whitelist
    }

    pub fn require_signature(&self) -> bool {
        self.require_signature
    }

    pub fn tier(&self) -> KeyTier {
        self.tier
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.allows(name)
    }

    /// Loggable form of the secret: first 10 characters followed by `...`
    pub fn secret_prefix(&self) -> String {
        redact_secret(&self.secret)
    }

    /// Non-secret view of this key
    pub fn info(&self) -> ApiKeyInfo {
        ApiKeyInfo {
            name: self.name.clone(),
            permissions: self.permissions.sorted().into_iter().map(String::from).collect(),
            rate_limit: self.rate_limit,
        }
    }
}

impl fmt::Debug for ApiKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyRecord")
            .field("secret", &self.secret_prefix())
            .field("name", &self.name)
            .field("permissions", &self.permissions)
            .field("rate_limit", &self.rate_limit)
            .field("environment", &self.environment)
            .field("ip_whitelist", &self.ip_whitelist)
            .field("require_signature", &self.require_signature)
            .field("tier", &self.tier)
            .finish()
    }
}

/// Shorten a secret for logs
///
/// At most ten characters and never more than half of the secret are shown.
pub fn redact_secret(secret: &str) -> String {
    let shown = (secret.chars().count() / 2).min(10);
    let prefix: String = secret.chars().take(shown).collect();
    format!("{}...", prefix)
}

/// Public description of a key, safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyInfo {
    pub name: String,
    pub permissions: Vec<String>,
    pub rate_limit: u32,
}
