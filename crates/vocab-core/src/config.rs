//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/vocab/config.toml)
//! 3. Environment variables (VOCAB_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! Besides settings, the config file is where the list of attached databases
//! and the links between them are persisted. It is only written through
//! [`crate::Session`], which keeps it in step with the in-memory registry.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::LinkGraph;
use crate::storage::Codec;

/// Environment variable prefix
const ENV_PREFIX: &str = "VOCAB";

/// Default number of words asked per quiz
pub const DEFAULT_QUIZ_SIZE: usize = 20;

/// An attached database as recorded in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseEntry {
    /// Name the database is attached under
    pub alias: String,
    /// Backing file
    pub path: PathBuf,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory where new databases are created
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// On-disk format for new databases
    #[serde(default)]
    pub codec: Codec,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Maximum number of words per quiz
    #[serde(default = "default_quiz_size")]
    pub quiz_size: usize,

    /// Attached databases
    #[serde(default)]
    pub databases: Vec<DatabaseEntry>,

    /// Links between attached databases
    #[serde(default)]
    pub links: LinkGraph,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            codec: Codec::default(),
            log_file: None,
            quiz_size: DEFAULT_QUIZ_SIZE,
            databases: Vec::new(),
            links: LinkGraph::new(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (VOCAB_DATA_DIR, VOCAB_CODEC, VOCAB_LOG_FILE)
    /// 2. Config file (~/.config/vocab/config.toml or VOCAB_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from `--config` when given, otherwise from the default location
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load the config file exactly as written, without environment overrides
    ///
    /// This is the base to modify before saving, so one-off overrides never
    /// end up in the file. If the file doesn't exist, defaults are used.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
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
        // VOCAB_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // VOCAB_CODEC
        if let Ok(val) = std::env::var(format!("{}_CODEC", ENV_PREFIX)) {
            self.codec = val
                .parse()
                .with_context(|| format!("Invalid {}_CODEC", ENV_PREFIX))?;
        }

        // VOCAB_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        Ok(())
    }

    /// Save configuration to the default config file
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
    /// Can be overridden with VOCAB_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab")
            .join("config.toml")
    }

    /// Default backing file for a new database
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", name, self.codec.extension()))
    }

    /// Look up the recorded path of an attached database
    pub fn entry(&self, alias: &str) -> Option<&DatabaseEntry> {
        self.databases.iter().find(|e| e.alias == alias)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocab")
}

fn default_quiz_size() -> usize {
    DEFAULT_QUIZ_SIZE
}
