//! Human behavior simulation
//!
//! Turns "move to (x, y)" and "type this text" into timed sequences of
//! primitive input events that carry human variance: curved pointer paths,
//! acceleration profiles, overshoots, typos with corrections, thinking
//! pauses, and a fatigue level that slowly degrades all of it.
//!
//! # Submodules
//!
//! - [`fatigue`] - Shared fatigue state and per-activity profiles
//! - [`timing`] - Per-step pointer delays and click timings
//! - [`typo`] - Typing error probability and substitute characters
//! - [`mouse`] - Pointer path planning on cubic Bézier curves
//! - [`keyboard`] - Typing pattern planning
//! - [`executor`] - The engine that replays plans against a backend
//! - [`backend`] - Primitive input backends
//! - [`bezier`] - Curve and coordinate math
//! - [`tables`] - Static keyboard and language tables
//! - [`random`] - Injectable random sources

pub mod backend;
pub mod bezier;
pub mod executor;
pub mod fatigue;
pub mod keyboard;
pub mod mouse;
pub mod random;
pub mod tables;
pub mod timing;
pub mod typo;

// Re-export commonly used types for convenience
#[cfg(feature = "os-input")]
pub use backend::EnigoBackend;
pub use backend::{EventLog, InputBackend, RecordedAction, RecordedEvent, RecordingBackend};
pub use bezier::{BezierCurve, Point, Position};
pub use executor::{HumanInput, MovementStats, SharedHumanInput, TypingStats};
pub use fatigue::{FatigueConfig, FatigueProfile, FatigueTracker};
pub use keyboard::{
    generate_pattern, CharacterStep, SpecialKey, ThinkingPauses, TypeOptions, TypingConfig,
    TypingPattern,
};
pub use mouse::{
    generate_path, MouseButton, MovementConfig, MovementHistory, MovementPath, MovementStep,
    ScrollDirection,
};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use timing::{ClickConfig, ClickPlan, DelayRange};

use thiserror::Error;

/// Result type for input operations
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur during input simulation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A primitive call on the backend failed
    #[error("Backend call '{operation}' failed: {message}")]
    Backend { operation: String, message: String },

    /// An invalid key was specified
    #[error("Invalid key: '{key}'")]
    InvalidKey { key: String },

    /// The input device is not available
    #[error("Device '{device}' is not available")]
    DeviceUnavailable { device: String },
}
