//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `RECIPES_`, `__` separates nested keys,
//!    e.g. `RECIPES_MONGODB__URL`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/recipes/{service_name}/config.toml
//! 4. System directory: /etc/recipes/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const ENV_PREFIX: &str = "RECIPES_";
const ENV_SEPARATOR: &str = "__";
const CONFIG_DIR: &str = "recipes";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// MongoDB configuration (optional; without it services run on in-memory collections)
    #[serde(default)]
    pub mongodb: Option<MongoConfig>,

    /// Collection names
    #[serde(default)]
    pub collections: CollectionsConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// MongoDB connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`
    pub url: String,

    /// Database holding the service's collections
    pub database: String,

    /// Application name reported to the server
    #[serde(default)]
    pub app_name: Option<String>,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,

    /// Minimum number of pooled connections
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum retry attempts for establishing the connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts in seconds (doubles each attempt)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl MongoConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Names of the collections each document type lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsConfig {
    #[serde(default = "default_recipes_collection")]
    pub recipes: String,
    #[serde(default = "default_users_collection")]
    pub users: String,
    #[serde(default = "default_roles_collection")]
    pub roles: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            recipes: default_recipes_collection(),
            users: default_users_collection(),
            roles: default_roles_collection(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_max_pool_size() -> u32 {
    50
}

fn default_min_pool_size() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_recipes_collection() -> String {
    "recipes".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_roles_collection() -> String {
    "roles".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is taken from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "recipes".to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::named(service_name)));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
            .extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file, bypassing the search path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
            .extract()?;

        Ok(config)
    }

    /// Candidate config files, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Ok(path) = xdg_dirs.place_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }

    /// Defaults for the service called `name`
    pub fn named(name: &str) -> Self {
        let mut config = Self::default();
        config.service.name = name.to_string();
        config
    }

    /// MongoDB URL, if configured
    pub fn mongodb_url(&self) -> Option<&str> {
        self.mongodb.as_ref().map(|db| db.url.as_str())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "recipes".to_string(),
                log_level: default_log_level(),
                environment: default_environment(),
            },
            mongodb: None,
            collections: CollectionsConfig::default(),
        }
    }
}
