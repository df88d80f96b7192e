//! Human-like timing model
//!
//! Computes per-step pointer delays along a path and the discrete timings
//! of a click. Values follow common HCI observations:
//! - Mouse button hold: 70-150ms
//! - Pointer movement: slow start, cruising middle, slow approach
//! - Reaction to a noticed mistake: 150-400ms
//!
//! # Example
//!
//! ```rust
//! use human_input::input::mouse::MovementConfig;
//! use human_input::input::random::ScriptedRandom;
//! use human_input::input::timing::step_delay;
//!
//! let config = MovementConfig::default();
//! let mut rng = ScriptedRandom::constant(0.5);
//! // The first step of a path is the slowest part of the ease-in ramp
//! let first = step_delay(0, 50, &config, 0.0, &mut rng);
//! let middle = step_delay(25, 50, &config, 0.0, &mut rng);
//! assert!(first > middle);
//! ```

use super::fatigue::delay_factor;
use super::mouse::MovementConfig;
use super::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pause between the two clicks of a double-click
pub const DOUBLE_CLICK_INTERVAL: DelayRange = DelayRange::new(50, 150);

/// Settle time after relocating past the target, before correcting back
pub const OVERSHOOT_SETTLE: DelayRange = DelayRange::new(50, 150);

/// Gap between consecutive wheel notches
pub const SCROLL_NOTCH: DelayRange = DelayRange::new(30, 90);

/// Gap between pressing the button and starting a drag path
pub const DRAG_GRIP: DelayRange = DelayRange::new(40, 90);

/// Inclusive millisecond range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound in milliseconds
    pub min: u64,
    /// Upper bound in milliseconds
    pub max: u64,
}

impl DelayRange {
    /// Creates a range; callers keep `min <= max`
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Whether the bounds are ordered
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Uniform draw in `[min, max]`, rounded to whole milliseconds
    pub fn sample(&self, rng: &mut dyn RandomSource) -> u64 {
        if self.min >= self.max {
            return self.min;
        }
        rng.range(self.min as f64, self.max as f64).round() as u64
    }

    /// Normally distributed draw around the midpoint, clamped to the range
    ///
    /// Uses the Box-Muller transform; `variance` (0.0 - 1.0) widens the
    /// spread relative to the range width.
    pub fn sample_normal(&self, variance: f64, rng: &mut dyn RandomSource) -> u64 {
        if self.min >= self.max {
            return self.min;
        }

        let mean = (self.min + self.max) as f64 / 2.0;
        let std_dev = (self.max - self.min) as f64 * variance.clamp(0.0, 1.0) / 2.0;

        let u1 = rng.next_f64().max(1e-10);
        let u2 = rng.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();

        (mean + z * std_dev)
            .round()
            .clamp(self.min as f64, self.max as f64) as u64
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Click timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickConfig {
    /// Wait after arriving on the target, before pressing
    #[serde(default = "default_pre_click_delay")]
    pub pre_click_delay: DelayRange,
    /// Wait after releasing the button
    #[serde(default = "default_post_click_delay")]
    pub post_click_delay: DelayRange,
    /// How long the button is held down
    #[serde(default = "default_click_duration")]
    pub click_duration: DelayRange,
    /// Nudge the pointer by a pixel or two right before pressing
    #[serde(default = "default_micro_movement")]
    pub micro_movement_before_click: bool,
}

fn default_pre_click_delay() -> DelayRange {
    DelayRange::new(50, 150)
}

fn default_post_click_delay() -> DelayRange {
    DelayRange::new(30, 100)
}

fn default_click_duration() -> DelayRange {
    DelayRange::new(70, 150)
}

fn default_micro_movement() -> bool {
    true
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            pre_click_delay: default_pre_click_delay(),
            post_click_delay: default_post_click_delay(),
            click_duration: default_click_duration(),
            micro_movement_before_click: default_micro_movement(),
        }
    }
}

/// Planned timings of one click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClickPlan {
    /// Delay before pressing
    pub pre_click_ms: u64,
    /// Pointer nudge applied right before pressing
    pub micro_offset: Option<(i32, i32)>,
    /// Button hold duration
    pub hold_ms: u64,
    /// Delay after releasing
    pub post_click_ms: u64,
}

impl ClickPlan {
    /// Total wall-clock cost of the click
    pub fn total_ms(&self) -> u64 {
        self.pre_click_ms + self.hold_ms + self.post_click_ms
    }
}

/// Speed multiplier at a point of the path
///
/// Ease-in from 0.3 to 1.0 over the first 20%, a randomised 0.8-1.2
/// plateau, then ease-out from 1.0 down to 0.4 over the last 20%.
pub fn speed_multiplier(progress: f64, rng: &mut dyn RandomSource) -> f64 {
    let progress = progress.clamp(0.0, 1.0);
    if progress < 0.2 {
        0.3 + 0.7 * (progress / 0.2)
    } else if progress <= 0.8 {
        rng.range(0.8, 1.2)
    } else {
        1.0 - 0.6 * ((progress - 0.8) / 0.2)
    }
}

/// Delay in milliseconds to wait after reaching step `step_index` of a path
/// with `total_steps` points
///
/// Always at least 1ms.
pub fn step_delay(
    step_index: usize,
    total_steps: usize,
    config: &MovementConfig,
    fatigue: f64,
    rng: &mut dyn RandomSource,
) -> u64 {
    let progress = if total_steps > 1 {
        step_index as f64 / (total_steps - 1) as f64
    } else {
        0.0
    };

    let speed = speed_multiplier(progress, rng);
    let delay = config.base_speed / speed
        * config.acceleration
        * delay_factor(fatigue)
        * rng.range(0.7, 1.3);

    if delay.is_finite() {
        delay.round().max(1.0) as u64
    } else {
        1
    }
}

/// Plans the timings of a click
pub fn plan_click(config: &ClickConfig, fatigue: f64, rng: &mut dyn RandomSource) -> ClickPlan {
    let slow = delay_factor(fatigue);
    let scale = |ms: u64| (ms as f64 * slow).round() as u64;

    let pre_click_ms = scale(config.pre_click_delay.sample(rng));
    let micro_offset = if config.micro_movement_before_click {
        let mut nudge = || {
            let sign = if rng.chance(0.5) { 1 } else { -1 };
            sign * (1 + rng.pick_index(2) as i32)
        };
        Some((nudge(), nudge()))
    } else {
        None
    };
    let hold_ms = scale(config.click_duration.sample_normal(0.3, rng));
    let post_click_ms = scale(config.post_click_delay.sample(rng));

    ClickPlan {
        pre_click_ms,
        micro_offset,
        hold_ms,
        post_click_ms,
    }
}

/// Base per-character delay for a typing speed: `60000 / (wpm * 5)` ms
pub fn base_char_delay_ms(wpm: f64) -> f64 {
    if wpm <= 0.0 {
        return 200.0;
    }
    60_000.0 / (wpm * 5.0)
}

/// Typing speed in words per minute (5 characters per word)
pub fn calculate_wpm(char_count: usize, duration: Duration) -> f64 {
    let minutes = duration.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    (char_count as f64 / 5.0) / minutes
}
