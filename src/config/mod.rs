//! Configuration module for filetag
//!
//! Manages application configuration: where the database lives, which
//! directories are scanned, and how projections link to pages.
//! Configuration is stored in the user's config directory and can be
//! overridden per field with `FILETAG_*` environment variables
//! (`FILETAG_DATABASE`, `FILETAG_QUIET`, `FILETAG_SCAN__EXTENSIONS`, ...).

mod setup;

pub use setup::first_time_setup;

use crate::ingest::{IngestError, ScanFilter};
use crate::view::{Routes, WebConverter};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "filetag";
const ENV_PREFIX: &str = "FILETAG";

/// Default location of the database file
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_default()
        .join("filetag.db")
}

/// Which scanned files are indexed
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ScanSettings {
    /// Accepted extensions; empty accepts every extension
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns a path must match one of; empty accepts every path
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FiletagConfig {
    /// Path of the SQLite database file
    #[serde(default = "default_database_path")]
    pub database: PathBuf,

    /// Directories walked by `scan`
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub scan: ScanSettings,

    /// Route templates used when projecting entities
    #[serde(default)]
    pub routes: Routes,
}

impl Default for FiletagConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            roots: Vec::new(),
            quiet: false,
            scan: ScanSettings::default(),
            routes: Routes::default(),
        }
    }
}

impl FiletagConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing the default there if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("roots")
                    .with_list_parse_key("scan.extensions")
                    .with_list_parse_key("scan.patterns")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Load configuration, running first-time setup if config doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the configuration fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load()
        } else {
            first_time_setup()
        }
    }

    /// Add a scan root; returns `false` if it was already configured
    pub fn add_root(&mut self, root: PathBuf) -> bool {
        if self.roots.contains(&root) {
            return false;
        }
        self.roots.push(root);
        true
    }

    /// Remove a scan root; returns `false` if it was not configured
    pub fn remove_root(&mut self, root: &Path) -> bool {
        let before = self.roots.len();
        self.roots.retain(|r| r != root);
        self.roots.len() != before
    }

    /// Build the scan filter described by `scan`
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidRegex` if a configured pattern is invalid.
    pub fn scan_filter(&self) -> Result<ScanFilter, IngestError> {
        ScanFilter::new(&self.scan.extensions, &self.scan.patterns)
    }

    /// Build a converter over the configured routes
    #[must_use]
    pub fn converter(&self) -> WebConverter {
        WebConverter::new(self.routes.clone())
    }
}
