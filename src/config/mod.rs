//! Configuration management for the duo-ladder rating engine
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for rating runs.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, RunSettings, ServiceSettings};
pub use rating::RatingConfig;
