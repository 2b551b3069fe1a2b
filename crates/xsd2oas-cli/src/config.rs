//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//!
//! Command-line flags are applied on top by the convert handler.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use xsd2oas_core::example::DEFAULT_MAX_DEPTH;
use xsd2oas_core::sample::DEFAULT_REPEAT_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server URL written into the document
    pub server_url: Option<String>,

    /// Document title; the output file name when unset
    pub title: Option<String>,

    /// Operation path; `/<title>` when unset
    pub path: Option<String>,

    /// Apply element name fixup
    pub fixup: bool,

    /// Include every optional element and choice branch
    pub all: bool,

    /// Sample document settings
    pub example: ExampleSettings,
}

/// Sample document configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExampleSettings {
    /// Deepest complex-type nesting rendered
    pub max_depth: usize,

    /// Render the full graph instead of the tagged subset
    pub full_graph: bool,

    /// Fixed seed for reproducible samples
    pub seed: Option<u64>,

    /// Cap on `*` and `+` repetitions in pattern samples
    pub repeat_limit: u32,
}

impl Default for ExampleSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            full_graph: false,
            seed: None,
            repeat_limit: DEFAULT_REPEAT_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(path, format!("cannot read file: {}", e)))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| Error::config(path, e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| Error::config(path, e.to_string()))?
        };

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => warn!(path = %path.display(), error = %e, "Ignoring unusable config file"),
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".xsd2oas.yaml"), PathBuf::from(".xsd2oas.json")];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("xsd2oas").join("config.yaml"));
        }

        paths
    }
}
