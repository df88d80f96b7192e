//! Accumulated operator fatigue
//!
//! A single scalar in `[0, 1]` shared by pointer and keyboard activity.
//! Each activity kind owns a [`FatigueProfile`] deciding how quickly it tires
//! the operator and how much a rest restores.
//!
//! The factor functions are the only place fatigue turns into a multiplier.
//! Planners apply them after every other term.

use serde::{Deserialize, Serialize};

/// Increment/decay constants for one kind of activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueProfile {
    /// Idle time (ms) at or above which an update counts as rest
    pub rest_threshold_ms: u64,
    /// Amount removed by a rest
    pub recovery_step: f64,
    /// Amount added by a continuous action
    pub activity_step: f64,
}

impl FatigueProfile {
    /// Profile applied after each pointer movement
    pub fn mouse() -> Self {
        Self {
            rest_threshold_ms: 2_000,
            recovery_step: 0.1,
            activity_step: 0.001,
        }
    }

    /// Profile applied after each typed character
    pub fn typing() -> Self {
        Self {
            rest_threshold_ms: 3_000,
            recovery_step: 0.05,
            activity_step: 0.0005,
        }
    }
}

/// Profiles for both activity kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueConfig {
    #[serde(default = "FatigueProfile::mouse")]
    pub mouse: FatigueProfile,
    #[serde(default = "FatigueProfile::typing")]
    pub typing: FatigueProfile,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            mouse: FatigueProfile::mouse(),
            typing: FatigueProfile::typing(),
        }
    }
}

/// Shared fatigue value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FatigueTracker {
    level: f64,
}

impl FatigueTracker {
    /// Creates a fully rested tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker at the given level, clamped to `[0, 1]`
    pub fn with_level(level: f64) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
        }
    }

    /// Current fatigue in `[0, 1]`
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Records an action that followed `idle_ms` of inactivity
    ///
    /// A long enough idle gap counts as rest and lowers fatigue; anything
    /// shorter counts as continuous work and raises it slightly.
    pub fn update(&mut self, idle_ms: u64, profile: &FatigueProfile) {
        if idle_ms >= profile.rest_threshold_ms {
            self.level = (self.level - profile.recovery_step).max(0.0);
        } else {
            self.level = (self.level + profile.activity_step).min(1.0);
        }
    }

    /// Back to fully rested
    pub fn reset(&mut self) {
        self.level = 0.0;
    }

}

/// Multiplier applied to delays: `1 + fatigue * 0.3`
pub fn delay_factor(fatigue: f64) -> f64 {
    1.0 + fatigue.clamp(0.0, 1.0) * 0.3
}

/// Multiplier applied to randomness and jitter: `1 + fatigue * 0.5`
pub fn randomness_factor(fatigue: f64) -> f64 {
    1.0 + fatigue.clamp(0.0, 1.0) * 0.5
}

/// Multiplier applied to typing error probability: `1 + fatigue`
pub fn error_factor(fatigue: f64) -> f64 {
    1.0 + fatigue.clamp(0.0, 1.0)
}

/// Multiplier applied to typing speed: `1 - fatigue * 0.2`
pub fn speed_factor(fatigue: f64) -> f64 {
    1.0 - fatigue.clamp(0.0, 1.0) * 0.2
}
