//! Configuration module for human-input.
//!
//! This module provides configuration management for the input engine, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides
//! - CLI argument merging
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use human_input::config::HumanizerSettings;
//!
//! // Load from a specific file
//! let settings = HumanizerSettings::from_file("humanizer.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{CliArgs, ConfigError, HumanizerSettings, ENV_PREFIX};
