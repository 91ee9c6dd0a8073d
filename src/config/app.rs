//! Main application configuration
//!
//! This module defines the primary configuration structures for the duo-ladder
//! rating runner, including environment variable and TOML file loading and validation.

use crate::config::rating::RatingConfig;
use crate::entity::EntityClassKind;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub run: RunSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Settings for a single processing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Entity class rated by this run
    pub entity_class: EntityClassKind,
    /// Last tournament date of season one; matches up to it are bootstrapped
    pub season_end: Option<NaiveDate>,
    /// Run bootstrap passes 1 and 2 in parallel
    pub parallel_seed_passes: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "duo-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            entity_class: EntityClassKind::Player,
            season_end: None,
            parallel_seed_passes: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Run settings
        if let Ok(class) = env::var("ENTITY_CLASS") {
            self.run.entity_class = class
                .parse()
                .map_err(|_| anyhow!("Invalid ENTITY_CLASS value: {}", class))?;
        }
        if let Ok(season_end) = env::var("SEASON_END") {
            self.run.season_end = Some(
                NaiveDate::parse_from_str(&season_end, "%Y-%m-%d")
                    .map_err(|_| anyhow!("Invalid SEASON_END value: {}", season_end))?,
            );
        }
        if let Ok(parallel) = env::var("PARALLEL_SEED_PASSES") {
            self.run.parallel_seed_passes = parallel
                .parse()
                .map_err(|_| anyhow!("Invalid PARALLEL_SEED_PASSES value: {}", parallel))?;
        }

        // Rating model settings
        if let Ok(floor) = env::var("MIN_STD_DEV") {
            self.rating.min_std_dev = floor
                .parse()
                .map_err(|_| anyhow!("Invalid MIN_STD_DEV value: {}", floor))?;
        }
        if let Ok(scale) = env::var("SCALE_PER_STD_DEV") {
            self.rating.scale_per_std_dev = scale
                .parse()
                .map_err(|_| anyhow!("Invalid SCALE_PER_STD_DEV value: {}", scale))?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;

    Ok(())
}
