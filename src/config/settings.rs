//! Humanizer settings and configuration management.
//!
//! This module gathers every tunable of the input engine into one
//! serialisable structure, supporting multiple configuration sources with
//! proper precedence.

use crate::input::backend::InputBackend;
use crate::input::executor::HumanInput;
use crate::input::fatigue::{FatigueConfig, FatigueProfile};
use crate::input::keyboard::TypingConfig;
use crate::input::mouse::MovementConfig;
use crate::input::random::SeededRandom;
use crate::input::timing::{ClickConfig, DelayRange};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of every environment variable read by [`HumanizerSettings::merge_with_env`]
pub const ENV_PREFIX: &str = "HUMAN_INPUT_";

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Complete engine configuration.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables (`HUMAN_INPUT_*`)
/// 4. CLI arguments
///
/// # Example
///
/// ```rust
/// use human_input::config::HumanizerSettings;
///
/// let settings = HumanizerSettings::default()
///     .with_wpm(70.0)
///     .with_error_rate(0.01)
///     .with_seed(42);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HumanizerSettings {
    /// Pointer path shape and speed.
    #[serde(default)]
    pub movement: MovementConfig,

    /// Click timings.
    #[serde(default)]
    pub click: ClickConfig,

    /// Typing speed, errors and pauses.
    #[serde(default)]
    pub typing: TypingConfig,

    /// How quickly the operator tires and recovers.
    #[serde(default)]
    pub fatigue: FatigueConfig,

    /// Seed for reproducible runs; entropy-seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn parse_bool(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if !range.is_valid() {
        return Err(ConfigError::ValidationError(format!(
            "{} range is inverted: min {}ms > max {}ms",
            name, range.min, range.max
        )));
    }
    Ok(())
}

fn check_profile(name: &str, profile: &FatigueProfile) -> Result<(), ConfigError> {
    check_probability(&format!("{}.recovery_step", name), profile.recovery_step)?;
    check_probability(&format!("{}.activity_step", name), profile.activity_step)
}

impl HumanizerSettings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use human_input::config::HumanizerSettings;
    ///
    /// let settings = HumanizerSettings::from_file("humanizer.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match extension_of(path).as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match extension_of(path).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads settings from environment variables.
    ///
    /// Recognised variables:
    /// - `HUMAN_INPUT_SEED`
    /// - `HUMAN_INPUT_WPM`, `HUMAN_INPUT_WPM_VARIATION`
    /// - `HUMAN_INPUT_ERROR_RATE`
    /// - `HUMAN_INPUT_THINKING_PAUSES`
    /// - `HUMAN_INPUT_BASE_SPEED`, `HUMAN_INPUT_JITTER_INTENSITY`
    /// - `HUMAN_INPUT_OVERSHOOT_PROBABILITY`, `HUMAN_INPUT_HESITATION_CHANCE`
    /// - `HUMAN_INPUT_MIN_STEPS`, `HUMAN_INPUT_MAX_STEPS`
    /// - `HUMAN_INPUT_MICRO_MOVEMENT`
    pub fn from_env() -> Self {
        Self::default().merge_with_env()
    }

    /// Merges current settings with environment variable overrides.
    pub fn merge_with_env(mut self) -> Self {
        self.apply_overrides(|name| env::var(format!("{}{}", ENV_PREFIX, name)).ok());
        self
    }

    /// Applies overrides from a variable lookup keyed by the unprefixed name.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |name: &str| lookup(name).and_then(|v| v.trim().parse::<f64>().ok());

        if let Some(seed) = lookup("SEED").and_then(|v| v.trim().parse().ok()) {
            self.seed = Some(seed);
        }
        if let Some(wpm) = number("WPM") {
            self.typing.wpm = wpm;
        }
        if let Some(variation) = number("WPM_VARIATION") {
            self.typing.wpm_variation = variation;
        }
        if let Some(rate) = number("ERROR_RATE") {
            self.typing.error_rate = rate;
        }
        if let Some(val) = lookup("THINKING_PAUSES") {
            self.typing.thinking_pauses.enabled = parse_bool(&val);
        }
        if let Some(speed) = number("BASE_SPEED") {
            self.movement.base_speed = speed;
        }
        if let Some(jitter) = number("JITTER_INTENSITY") {
            self.movement.jitter_intensity = jitter;
        }
        if let Some(p) = number("OVERSHOOT_PROBABILITY") {
            self.movement.overshoot_probability = p;
        }
        if let Some(p) = number("HESITATION_CHANCE") {
            self.movement.hesitation_chance = p;
        }
        if let Some(steps) = lookup("MIN_STEPS").and_then(|v| v.trim().parse().ok()) {
            self.movement.min_steps = steps;
        }
        if let Some(steps) = lookup("MAX_STEPS").and_then(|v| v.trim().parse().ok()) {
            self.movement.max_steps = steps;
        }
        if let Some(val) = lookup("MICRO_MOVEMENT") {
            self.click.micro_movement_before_click = parse_bool(&val);
        }
    }

    /// Merges settings with CLI arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use human_input::config::{CliArgs, HumanizerSettings};
    ///
    /// let args = CliArgs {
    ///     wpm: Some(80.0),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = HumanizerSettings::default().merge_with_args(&args);
    /// assert_eq!(settings.typing.wpm, 80.0);
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if let Some(wpm) = args.wpm {
            self.typing.wpm = wpm;
        }
        if let Some(rate) = args.error_rate {
            self.typing.error_rate = rate;
        }
        if let Some(enabled) = args.thinking_pauses {
            self.typing.thinking_pauses.enabled = enabled;
        }
        if let Some(speed) = args.base_speed {
            self.movement.base_speed = speed;
        }
        if let Some(p) = args.overshoot_probability {
            self.movement.overshoot_probability = p;
        }
        if let Some(micro) = args.micro_movement {
            self.click.micro_movement_before_click = micro;
        }
        self
    }

    /// Validates all settings.
    ///
    /// The engine assumes valid values; callers loading untrusted files
    /// should run this first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        check_positive("movement.base_speed", m.base_speed)?;
        check_positive("movement.acceleration", m.acceleration)?;
        if m.jitter_intensity < 0.0 || m.curvature < 0.0 || m.randomness < 0.0 {
            return Err(ConfigError::ValidationError(
                "Movement jitter, curvature and randomness cannot be negative".to_string(),
            ));
        }
        if m.overshoot_distance < 0.0 || m.control_point_distance < 0.0 {
            return Err(ConfigError::ValidationError(
                "Movement distances cannot be negative".to_string(),
            ));
        }
        check_probability("movement.overshoot_probability", m.overshoot_probability)?;
        check_probability("movement.hesitation_chance", m.hesitation_chance)?;
        check_range("movement.human_hesitation", &m.human_hesitation)?;
        if m.min_steps == 0 {
            return Err(ConfigError::ValidationError(
                "movement.min_steps must be at least 1".to_string(),
            ));
        }
        if m.min_steps > m.max_steps {
            return Err(ConfigError::ValidationError(format!(
                "movement.min_steps ({}) cannot exceed max_steps ({})",
                m.min_steps, m.max_steps
            )));
        }

        check_range("click.pre_click_delay", &self.click.pre_click_delay)?;
        check_range("click.post_click_delay", &self.click.post_click_delay)?;
        check_range("click.click_duration", &self.click.click_duration)?;

        let t = &self.typing;
        check_positive("typing.wpm", t.wpm)?;
        if !(0.0..1.0).contains(&t.wpm_variation) {
            return Err(ConfigError::ValidationError(format!(
                "typing.wpm_variation must be in [0, 1), got {}",
                t.wpm_variation
            )));
        }
        check_probability("typing.error_rate", t.error_rate)?;
        check_range("typing.correction_delay", &t.correction_delay)?;
        check_probability("typing.thinking_pauses.probability", t.thinking_pauses.probability)?;
        check_range("typing.thinking_pauses.duration", &t.thinking_pauses.duration)?;
        check_positive("typing.capital_letter_delay", t.capital_letter_delay)?;
        check_positive("typing.number_delay", t.number_delay)?;
        check_positive("typing.symbol_delay", t.symbol_delay)?;

        check_profile("fatigue.mouse", &self.fatigue.mouse)?;
        check_profile("fatigue.typing", &self.fatigue.typing)?;

        Ok(())
    }

    /// Builds an engine over `backend` with these settings.
    pub fn build_engine<B: InputBackend>(&self, backend: B) -> HumanInput<B> {
        HumanInput::with_random(backend, Box::new(SeededRandom::from_optional_seed(self.seed)))
            .with_movement_config(self.movement.clone())
            .with_click_config(self.click.clone())
            .with_typing_config(self.typing.clone())
            .with_fatigue_config(self.fatigue)
    }

    // Builder-style methods for convenient configuration

    /// Sets the nominal typing speed.
    pub fn with_wpm(mut self, wpm: f64) -> Self {
        self.typing.wpm = wpm;
        self
    }

    /// Sets the base typing error rate.
    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.typing.error_rate = error_rate;
        self
    }

    /// Enables or disables thinking pauses.
    pub fn with_thinking_pauses(mut self, enabled: bool) -> Self {
        self.typing.thinking_pauses.enabled = enabled;
        self
    }

    /// Sets the pointer speed in milliseconds per step.
    pub fn with_base_speed(mut self, base_speed: f64) -> Self {
        self.movement.base_speed = base_speed;
        self
    }

    /// Sets the overshoot probability.
    pub fn with_overshoot_probability(mut self, probability: f64) -> Self {
        self.movement.overshoot_probability = probability;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// CLI argument structure for parsing command line options.
///
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
    /// Random seed.
    pub seed: Option<u64>,
    /// Typing speed in words per minute.
    pub wpm: Option<f64>,
    /// Typing error rate.
    pub error_rate: Option<f64>,
    /// Enable thinking pauses.
    pub thinking_pauses: Option<bool>,
    /// Pointer milliseconds per step.
    pub base_speed: Option<f64>,
    /// Overshoot probability.
    pub overshoot_probability: Option<f64>,
    /// Nudge the pointer before clicking.
    pub micro_movement: Option<bool>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain.
    ///
    /// 1. Default values
    /// 2. Configuration file (if specified)
    /// 3. Environment variables
    /// 4. CLI arguments (self)
    pub fn load_settings(&self) -> Result<HumanizerSettings, ConfigError> {
        let settings = if let Some(ref config_file) = self.config_file {
            HumanizerSettings::from_file(config_file)?
        } else {
            HumanizerSettings::default()
        };

        let settings = settings.merge_with_env().merge_with_args(self);
        settings.validate()?;

        Ok(settings)
    }
}
