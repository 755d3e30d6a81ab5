//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CorsConfig, GatewayConfig, KeysConfig, LogFormat, LoggingConfig, MetricsConfig,
    ServerConfig, StoreConfig,
};
