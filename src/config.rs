use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::RankingParams;
use crate::services::EngineOptions;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub creator_profiles: String,
    pub member_profiles: String,
}

/// An empty `url` runs the service on the in-memory store
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
    #[serde(default = "default_active_window_mins")]
    pub active_window_mins: i64,
    #[serde(default = "default_new_content_days")]
    pub new_content_days: i64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            stack_size: default_stack_size(),
            active_window_mins: default_active_window_mins(),
            new_content_days: default_new_content_days(),
        }
    }
}

impl DiscoverySettings {
    pub fn ranking_params(&self) -> RankingParams {
        RankingParams {
            candidate_limit: self.candidate_limit,
            stack_size: self.stack_size.min(self.candidate_limit),
            active_window_mins: self.active_window_mins,
            new_content_days: self.new_content_days,
            ..RankingParams::default()
        }
    }
}

fn default_candidate_limit() -> usize { 50 }
fn default_stack_size() -> usize { 20 }
fn default_active_window_mins() -> i64 { 15 }
fn default_new_content_days() -> i64 { 7 }

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_max_update_retries")]
    pub max_update_retries: u32,
    #[serde(default = "default_health_freshness_secs")]
    pub health_freshness_secs: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_update_retries: default_max_update_retries(),
            health_freshness_secs: default_health_freshness_secs(),
        }
    }
}

impl EngineSettings {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            max_update_retries: self.max_update_retries.max(1),
            health_freshness: chrono::Duration::seconds(self.health_freshness_secs.max(0)),
        }
    }
}

fn default_max_update_retries() -> u32 { 5 }
fn default_health_freshness_secs() -> i64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LUME__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LUME__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables deployments set
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}
