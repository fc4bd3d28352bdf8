//! Layout configuration
//!
//! Grid and pool metrics for the layout engine. Every field has a default;
//! a TOML file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading a layout configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Io(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Layout metrics, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of one grid column
    pub cell_width: i32,
    /// Height of one grid row
    pub cell_height: i32,
    /// Left edge of the first pool or process grid
    pub origin_x: i32,
    /// Top edge of the first pool or process grid
    pub origin_y: i32,
    /// Width of the vertical name band on the left of a pool
    pub pool_label_width: i32,
    /// Space between a pool's border and its grid
    pub pool_padding: i32,
    /// Vertical space between pools
    pub pool_gap: i32,
    pub min_pool_width: i32,
    pub min_pool_height: i32,
    /// Distance below the lower shape at which loop edges run back
    pub loop_offset: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_width: 150,
            cell_height: 140,
            origin_x: 160,
            origin_y: 80,
            pool_label_width: 30,
            pool_padding: 20,
            pool_gap: 40,
            min_pool_width: 600,
            min_pool_height: 250,
            loop_offset: 30,
        }
    }
}

impl LayoutConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject metrics the grid cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_width <= 0 || self.cell_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "cell size must be positive, got {}x{}",
                self.cell_width, self.cell_height
            )));
        }
        for (name, value) in [
            ("pool_label_width", self.pool_label_width),
            ("pool_padding", self.pool_padding),
            ("pool_gap", self.pool_gap),
            ("min_pool_width", self.min_pool_width),
            ("min_pool_height", self.min_pool_height),
            ("loop_offset", self.loop_offset),
        ] {
            if value < 0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
