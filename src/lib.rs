//! # human-input
//!
//! Human-like pointer and keyboard input synthesis for desktop automation.
//!
//! The crate turns a target point or a text string into a timed sequence of
//! primitive input events (moves, clicks, keystrokes) that statistically
//! resemble a human operator, and replays that sequence through a pluggable
//! backend.
//!
//! ## Features
//!
//! - **Curved pointer paths**: adaptive cubic Bézier curves with jitter,
//!   momentum, ease-in/ease-out timing and occasional overshoot-correction
//! - **Realistic typing**: WPM-derived delays shaped by key position, word
//!   context and text complexity, with typos that get corrected
//! - **Fatigue**: one shared level that slows and loosens everything over a
//!   long session and recovers during rest
//! - **Deterministic replays**: all variance flows through an injectable
//!   random source
//! - **Flexible Configuration**: TOML/JSON files, environment variables, CLI arguments
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use human_input::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = HumanizerSettings::default().with_wpm(60.0);
//!     let mut input = settings.build_engine(RecordingBackend::new());
//!
//!     input.click_at(640, 360, MouseButton::Left).await?;
//!     input.type_text("Hello, World!", TypeOptions::default()).await?;
//!
//!     println!("{:?}", input.typing_stats());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`input`]: Planners, the execution engine and input backends
//! - [`config`]: Configuration loading and management
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`HUMAN_INPUT_*`)
//! 4. CLI arguments
//!
//! See [`config::HumanizerSettings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Human-like input planning and execution.
pub mod input;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Input types
pub use input::{
    HumanInput, InputBackend, InputError, InputResult, MouseButton, MovementStats, Position,
    RecordingBackend, ScrollDirection, SharedHumanInput, SpecialKey, TypeOptions, TypingStats,
};

// Config types
pub use config::{CliArgs, ConfigError, HumanizerSettings};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use human_input::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{CliArgs, HumanizerSettings};
    pub use crate::input::{
        HumanInput, InputBackend, InputResult, MouseButton, RecordingBackend, ScrollDirection,
        TypeOptions,
    };
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
