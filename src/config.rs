//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\cover-scout\config.toml
//! - macOS: ~/Library/Application Support/cover-scout/config.toml
//! - Linux: ~/.config/cover-scout/config.toml
//!
//! The config file is human-readable and editable. Source credentials
//! live inside each source's `options` table; the engine only sees them
//! as an opaque bag until that source's `initialize` runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::artwork::{hashdb, thumbs};
use crate::model::SourceConfig;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lookup sources, in any order; `priority` decides the chain order
    pub sources: Vec<SourceConfig>,

    /// Matching preferences
    pub matching: MatchingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceConfig {
                    id: thumbs::SOURCE_ID.to_string(),
                    enabled: true,
                    priority: 0,
                    ..Default::default()
                },
                SourceConfig {
                    id: hashdb::SOURCE_ID.to_string(),
                    // Off until the user supplies credentials
                    enabled: false,
                    priority: 10,
                    ..Default::default()
                },
            ],
            matching: MatchingConfig::default(),
        }
    }
}

/// Matching preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Region labels in preference order, used when a source offers the
    /// same asset for several regions
    pub region_priority: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            region_priority: vec![
                "USA".to_string(),
                "World".to_string(),
                "Europe".to_string(),
                "Japan".to_string(),
            ],
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cover-scout"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    // Ensure directory exists
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
