//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, ConsistencyModel, DatabaseConfig, Environment,
    FeedConfig, SnowflakeConfig, StorageConfig,
};
