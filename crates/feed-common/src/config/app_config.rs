//! Application configuration structs
//!
//! Loads configuration from environment variables (a `.env` file is honoured).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// How a cache reconciles itself after a successful remote write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyModel {
    /// Patch the cached entry in place from the known delta
    WriteThrough,
    /// Re-read the entry from the store
    #[default]
    Refetch,
}

impl ConsistencyModel {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "write_through" | "write-through" => Some(Self::WriteThrough),
            "refetch" => Some(Self::Refetch),
            _ => None,
        }
    }
}

/// Feed cache policy
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Reactions re-read by default; votes and favorites are always write-through
    #[serde(default)]
    pub reaction_consistency: ConsistencyModel,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            reaction_consistency: ConsistencyModel::default(),
        }
    }
}

/// Blob storage buckets and upload limits
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_post_bucket")]
    pub post_bucket: String,
    #[serde(default = "default_avatar_bucket")]
    pub avatar_bucket: String,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u32,
}

impl StorageConfig {
    #[must_use]
    pub fn max_upload_bytes(&self) -> u64 {
        u64::from(self.max_upload_mb) * 1024 * 1024
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            post_bucket: default_post_bucket(),
            avatar_bucket: default_avatar_bucket(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "feed-sync".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_page_size() -> u32 {
    3
}

fn default_post_bucket() -> String {
    "post-images".to_string()
}

fn default_avatar_bucket() -> String {
    "profile-avatars".to_string()
}

fn default_max_upload_mb() -> u32 {
    50
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &'static str| -> Result<Option<u32>, ConfigError> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u32>()
                        .map_err(|_| ConfigError::InvalidValue(key, raw))
                })
                .transpose()
        };

        let page_size = parsed("FEED_PAGE_SIZE")?.unwrap_or_else(default_page_size);
        if page_size == 0 {
            return Err(ConfigError::InvalidValue("FEED_PAGE_SIZE", "0".to_string()));
        }

        let reaction_consistency = match lookup("REACTION_CONSISTENCY") {
            Some(raw) => ConsistencyModel::parse(&raw)
                .ok_or(ConfigError::InvalidValue("REACTION_CONSISTENCY", raw))?,
            None => ConsistencyModel::default(),
        };

        let worker_id = parsed("WORKER_ID")?.unwrap_or(0);
        let worker_id = u16::try_from(worker_id)
            .ok()
            .filter(|id| *id < 1024)
            .ok_or_else(|| ConfigError::InvalidValue("WORKER_ID", worker_id.to_string()))?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parsed("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            feed: FeedConfig {
                page_size,
                reaction_consistency,
            },
            storage: StorageConfig {
                post_bucket: lookup("STORAGE_POST_BUCKET").unwrap_or_else(default_post_bucket),
                avatar_bucket: lookup("STORAGE_AVATAR_BUCKET")
                    .unwrap_or_else(default_avatar_bucket),
                max_upload_mb: parsed("STORAGE_MAX_UPLOAD_MB")?
                    .unwrap_or_else(default_max_upload_mb),
            },
            snowflake: SnowflakeConfig { worker_id },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
