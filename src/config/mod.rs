//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, LeaderboardConfig, LogFormat, LoggingConfig, MetricsConfig,
    ServerConfig, StorageBackend, StorageConfig,
};
