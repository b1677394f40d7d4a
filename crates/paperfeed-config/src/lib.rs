//! Configuration loading for Paperfeed.
//! Reads paperfeed.toml from the current directory or the path in the
//! PAPERFEED_CONFIG env var, then applies environment overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "PAPERFEED_CONFIG";
pub const DATABASE_ENV: &str = "PAPERFEED_DATABASE";
pub const BIND_ENV: &str = "PAPERFEED_BIND";
pub const DEFAULT_CONFIG_FILE: &str = "paperfeed.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub text: TextConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path() }
    }
}

fn default_database_path() -> PathBuf { PathBuf::from("cache.db") }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_index_page")]
    pub index_page: String,
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
            index_page: default_index_page(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_bind()       -> String  { "127.0.0.1:5000".to_string() }
fn default_static_dir() -> PathBuf { PathBuf::from("output") }
fn default_index_page() -> String  { "2025-07-15.html".to_string() }
fn default_limit()      -> i64     { 10 }
fn default_max_limit()  -> i64     { 100 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_template()   -> PathBuf { PathBuf::from("template.html") }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }

/// Extra or overriding math symbol substitutions, keyed by span or command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextConfig {
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}


impl Config {
    /// Load configuration from paperfeed.toml.
    /// Checks PAPERFEED_CONFIG first, then the current directory. Only an
    /// explicitly named file has to exist.
    pub fn load() -> Result<Self, ConfigError> {
        let (path, explicit) = match std::env::var(CONFIG_ENV) {
            Ok(p) => (PathBuf::from(p), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else if explicit {
            return Err(ConfigError::NotFound(path));
        } else {
            debug!("{} not found, using defaults", path.display());
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse one file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PAPERFEED_DATABASE` and `PAPERFEED_BIND` through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;
        if server.max_limit < 1 {
            return Err(ConfigError::Invalid(format!(
                "server.max_limit must be >= 1, got {}",
                server.max_limit
            )));
        }
        if server.default_limit < 1 || server.default_limit > server.max_limit {
            return Err(ConfigError::Invalid(format!(
                "server.default_limit must be between 1 and {}, got {}",
                server.max_limit, server.default_limit
            )));
        }
        Ok(())
    }
}
