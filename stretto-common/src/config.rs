//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error; the service starts on defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{Error, Result};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com/v1";
/// Largest page the document API returns for a child listing
pub const MAX_CHILDREN_PAGE_SIZE: u32 = 100;

pub const ENV_CONFIG: &str = "STRETTO_CONFIG";
pub const ENV_DATABASE_URL: &str = "STRETTO_DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "STRETTO_BIND_ADDR";
pub const ENV_LOG_LEVEL: &str = "STRETTO_LOG_LEVEL";
pub const ENV_NOTION_API_KEY: &str = "NOTION_API_KEY";
pub const ENV_REPERTOIRE_DB_ID: &str = "REPERTOIRE_DB_ID";
pub const ENV_NOTION_BASE_URL: &str = "STRETTO_NOTION_BASE_URL";
pub const ENV_CHILDREN_PAGE_SIZE: &str = "STRETTO_CHILDREN_PAGE_SIZE";

/// Contents of the TOML config file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub database_url: Option<String>,
    pub bind_addr: Option<String>,
    pub log_level: Option<String>,
    pub notion_api_key: Option<String>,
    pub repertoire_db_id: Option<String>,
    pub notion_base_url: Option<String>,
    pub children_page_size: Option<u32>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub bind_addr: Option<String>,
    pub log_level: Option<String>,
}

/// Remote document API settings; present only when fully configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionConfig {
    pub api_key: String,
    pub repertoire_db_id: String,
    pub base_url: String,
    pub children_page_size: u32,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub log_level: String,
    /// `None` disables the document mirror
    pub notion: Option<NotionConfig>,
}

impl ServiceConfig {
    /// Resolve from CLI overrides, the process environment and the TOML file
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let path = overrides
            .config_path
            .clone()
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
            .or_else(default_config_path);
        let toml_config = match path {
            Some(path) => load_toml_config(&path)?,
            None => TomlConfig::default(),
        };
        Ok(Self::from_sources(overrides, &toml_config, env))
    }

    /// Merge already-loaded sources; `env` looks up one variable
    pub fn from_sources(
        overrides: &ConfigOverrides,
        toml_config: &TomlConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let pick = |cli: &Option<String>, key: &str, file: &Option<String>| -> Option<String> {
            non_blank(cli.clone())
                .or_else(|| non_blank(env(key)))
                .or_else(|| non_blank(file.clone()))
        };

        let database_url = pick(&overrides.database_url, ENV_DATABASE_URL, &toml_config.database_url)
            .unwrap_or_else(default_database_url);
        let bind_addr = pick(&overrides.bind_addr, ENV_BIND_ADDR, &toml_config.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let log_level = pick(&overrides.log_level, ENV_LOG_LEVEL, &toml_config.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let api_key = pick(&None, ENV_NOTION_API_KEY, &toml_config.notion_api_key);
        let repertoire_db_id = pick(&None, ENV_REPERTOIRE_DB_ID, &toml_config.repertoire_db_id);
        let base_url = pick(&None, ENV_NOTION_BASE_URL, &toml_config.notion_base_url)
            .unwrap_or_else(|| DEFAULT_NOTION_BASE_URL.to_string());

        let page_size_env = env(ENV_CHILDREN_PAGE_SIZE).and_then(|v| match v.trim().parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!("Ignoring {}={:?}: not a number", ENV_CHILDREN_PAGE_SIZE, v);
                None
            }
        });
        let children_page_size = clamp_page_size(
            page_size_env
                .or(toml_config.children_page_size)
                .unwrap_or(MAX_CHILDREN_PAGE_SIZE),
        );

        let notion = match (api_key, repertoire_db_id) {
            (Some(api_key), Some(repertoire_db_id)) => Some(NotionConfig {
                api_key,
                repertoire_db_id,
                base_url: base_url.trim_end_matches('/').to_string(),
                children_page_size,
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    "Document mirror disabled: both {} and {} are required",
                    ENV_NOTION_API_KEY, ENV_REPERTOIRE_DB_ID
                );
                None
            }
            (None, None) => None,
        };

        Self {
            database_url,
            bind_addr,
            log_level,
            notion,
        }
    }
}

/// Clamp a child-listing page size into `1..=MAX_CHILDREN_PAGE_SIZE`
pub fn clamp_page_size(size: u32) -> u32 {
    size.clamp(1, MAX_CHILDREN_PAGE_SIZE)
}

/// Read the TOML config file; a missing file yields defaults with a warning
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// `<config dir>/stretto/config.toml` for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stretto").join("config.toml"))
}

/// SQLite file under the platform data directory
pub fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .map(|d| d.join("stretto"))
        .unwrap_or_else(|| PathBuf::from("./stretto_data"));
    format!("sqlite://{}?mode=rwc", dir.join("stretto_notes.db").display())
}
