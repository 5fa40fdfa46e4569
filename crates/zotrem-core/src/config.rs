//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/zotrem/config.toml)
//! 3. Environment variables (ZOTREM_* prefix)
//!
//! Environment variables take precedence over config file values. The
//! plugin settings of the local workspace host are filled from here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::settings::{self, LibraryType, DEFAULT_LEADING_CHAR, DEFAULT_ROOT_DOCUMENT_NAME};
use crate::zotero::DEFAULT_API_URL;

/// Environment variable prefix
const ENV_PREFIX: &str = "ZOTREM";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the local workspace files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Zotero Web API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Display name of the library root document
    #[serde(default = "default_root_document_name")]
    pub root_document_name: String,

    /// Declared for parity with the plugin settings; unused
    #[serde(default = "default_leading_char")]
    pub leading_char: String,

    /// Zotero API key (empty for public libraries)
    #[serde(default)]
    pub api_key: String,

    /// Whether `library_id` names a user or a group
    #[serde(default)]
    pub library_type: Option<LibraryType>,

    /// Numeric user or group id
    #[serde(default)]
    pub library_id: String,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: default_api_url(),
            root_document_name: default_root_document_name(),
            leading_char: default_leading_char(),
            api_key: String::new(),
            library_type: None,
            library_id: String::new(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from an explicit path if given, else the default location
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        if let Some(val) = env_var("API_URL") {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        if let Some(val) = env_var("API_KEY") {
            self.api_key = val;
        }

        if let Some(val) = env_var("LIBRARY_TYPE") {
            self.library_type = if val.is_empty() {
                None
            } else {
                Some(
                    val.parse()
                        .map_err(|e: String| anyhow::anyhow!(e))
                        .with_context(|| format!("Invalid {}_LIBRARY_TYPE", ENV_PREFIX))?,
                )
            };
        }

        if let Some(val) = env_var("LIBRARY_ID") {
            self.library_id = val;
        }

        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with ZOTREM_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_var("CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zotrem")
            .join("config.toml")
    }

    /// Plugin setting values this configuration provides, by setting id
    pub fn setting_values(&self) -> Vec<(&'static str, String)> {
        let mut values = vec![
            (settings::ROOT_DOCUMENT_NAME, self.root_document_name.clone()),
            (settings::LEADING_CHAR, self.leading_char.clone()),
            (settings::API_KEY, self.api_key.clone()),
            (settings::USER_OR_GROUP_ID, self.library_id.clone()),
        ];
        if let Some(kind) = self.library_type {
            values.push((settings::USER_OR_GROUP, kind.to_string()));
        }
        values
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zotrem")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_root_document_name() -> String {
    DEFAULT_ROOT_DOCUMENT_NAME.to_string()
}

fn default_leading_char() -> String {
    DEFAULT_LEADING_CHAR.to_string()
}
