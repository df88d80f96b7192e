//! Pointer motion planning
//!
//! Turns a start and end position into a [`MovementPath`]: a cubic Bézier
//! curve whose control points mix a perpendicular arc, distance-scaled
//! randomness and momentum from recent movements, sampled into jittered
//! integer steps with per-step delays from the timing model.
//!
//! # Example
//!
//! ```rust
//! use human_input::input::bezier::Position;
//! use human_input::input::mouse::{generate_path, MovementConfig, MovementHistory};
//! use human_input::input::random::SeededRandom;
//!
//! let config = MovementConfig::default();
//! let history = MovementHistory::new();
//! let mut rng = SeededRandom::from_seed(1);
//!
//! let path = generate_path(
//!     Position::new(100, 100),
//!     Position::new(600, 100),
//!     &config,
//!     0.0,
//!     &history,
//!     &mut rng,
//! );
//! assert!(path.len() >= config.min_steps + 1);
//! assert!(path.len() <= config.max_steps + 1);
//! ```

use super::bezier::{BezierCurve, Point, Position};
use super::fatigue::randomness_factor;
use super::random::RandomSource;
use super::timing::{step_delay, DelayRange};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::time::Instant;

/// Number of completed movements retained for momentum
pub const HISTORY_CAPACITY: usize = 10;

/// Number of most recent movements averaged into momentum
const MOMENTUM_WINDOW: usize = 3;

/// Fraction of the averaged recent displacement carried into a new curve
const MOMENTUM_WEIGHT: f64 = 0.15;

/// Below this distance (px) randomness is scaled down for precision
const PRECISION_DISTANCE: f64 = 100.0;

/// Below this distance (px) a move is treated as no move at all
const DEGENERATE_DISTANCE: f64 = 0.5;

/// Represents the different mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button (primary)
    Left,
    /// Right mouse button (secondary/context menu)
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
        }
    }
}

impl std::str::FromStr for MouseButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" | "primary" => Ok(MouseButton::Left),
            "right" | "secondary" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            other => Err(format!("Unknown mouse button: {}", other)),
        }
    }
}

/// Wheel scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    /// Unit wheel delta `(dx, dy)` for one notch; positive y scrolls down
    pub fn unit_delta(&self) -> (i32, i32) {
        match self {
            ScrollDirection::Up => (0, -1),
            ScrollDirection::Down => (0, 1),
            ScrollDirection::Left => (-1, 0),
            ScrollDirection::Right => (1, 0),
        }
    }
}

impl std::str::FromStr for ScrollDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(ScrollDirection::Up),
            "down" => Ok(ScrollDirection::Down),
            "left" => Ok(ScrollDirection::Left),
            "right" => Ok(ScrollDirection::Right),
            other => Err(format!("Unknown scroll direction: {}", other)),
        }
    }
}

/// Configuration for pointer movement behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Milliseconds per path step at cruising speed
    #[serde(default = "default_base_speed")]
    pub base_speed: f64,
    /// Multiplier applied to every step delay
    #[serde(default = "default_acceleration")]
    pub acceleration: f64,
    /// Maximum per-axis jitter (px) added to each sampled point
    #[serde(default = "default_jitter_intensity")]
    pub jitter_intensity: f64,
    /// Probability of sliding past the target and correcting back
    #[serde(default = "default_overshoot_probability")]
    pub overshoot_probability: f64,
    /// Distance (px) of the overshoot point from the target
    #[serde(default = "default_overshoot_distance")]
    pub overshoot_distance: f64,
    /// Hesitation delay before starting a movement
    #[serde(default = "default_human_hesitation")]
    pub human_hesitation: DelayRange,
    /// Probability of hesitating before a movement
    #[serde(default = "default_hesitation_chance")]
    pub hesitation_chance: f64,
    /// Perpendicular arc as a fraction of the distance
    #[serde(default = "default_curvature")]
    pub curvature: f64,
    /// Random control-point spread as a fraction of the distance
    #[serde(default = "default_randomness")]
    pub randomness: f64,
    /// Minimum perpendicular arc (px)
    #[serde(default = "default_control_point_distance")]
    pub control_point_distance: f64,
    /// Derive the step count from the distance with a little variation
    #[serde(default = "default_adaptive_steps")]
    pub adaptive_steps: bool,
    /// Fewest segments in a path
    #[serde(default = "default_min_steps")]
    pub min_steps: usize,
    /// Most segments in a path
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_base_speed() -> f64 {
    8.0
}

fn default_acceleration() -> f64 {
    1.0
}

fn default_jitter_intensity() -> f64 {
    1.0
}

fn default_overshoot_probability() -> f64 {
    0.1
}

fn default_overshoot_distance() -> f64 {
    12.0
}

fn default_human_hesitation() -> DelayRange {
    DelayRange::new(100, 400)
}

fn default_hesitation_chance() -> f64 {
    0.1
}

fn default_curvature() -> f64 {
    0.15
}

fn default_randomness() -> f64 {
    0.1
}

fn default_control_point_distance() -> f64 {
    20.0
}

fn default_adaptive_steps() -> bool {
    true
}

fn default_min_steps() -> usize {
    10
}

fn default_max_steps() -> usize {
    100
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: default_base_speed(),
            acceleration: default_acceleration(),
            jitter_intensity: default_jitter_intensity(),
            overshoot_probability: default_overshoot_probability(),
            overshoot_distance: default_overshoot_distance(),
            human_hesitation: default_human_hesitation(),
            hesitation_chance: default_hesitation_chance(),
            curvature: default_curvature(),
            randomness: default_randomness(),
            control_point_distance: default_control_point_distance(),
            adaptive_steps: default_adaptive_steps(),
            min_steps: default_min_steps(),
            max_steps: default_max_steps(),
        }
    }
}

impl MovementConfig {
    /// Settings for corrective and drag paths: flatter, steadier and slower
    pub fn corrective(&self) -> Self {
        Self {
            base_speed: self.base_speed * 1.5,
            jitter_intensity: self.jitter_intensity * 0.3,
            overshoot_probability: 0.0,
            hesitation_chance: 0.0,
            curvature: self.curvature * 0.3,
            randomness: self.randomness * 0.3,
            control_point_distance: self.control_point_distance * 0.3,
            ..self.clone()
        }
    }

    /// Largest distance (px) a sampled point may stray from the curve
    pub fn jitter_tolerance(&self, fatigue: f64) -> f64 {
        self.jitter_intensity * randomness_factor(fatigue)
    }
}

/// One point of a path and the delay to wait after reaching it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MovementStep {
    pub position: Position,
    pub delay_ms: u64,
}

/// Ordered steps from (approximately) the start to (approximately) the end
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MovementPath {
    pub steps: Vec<MovementStep>,
}

impl MovementPath {
    /// A path that stays on `position` with no delay
    pub fn single(position: Position) -> Self {
        Self {
            steps: vec![MovementStep {
                position,
                delay_ms: 0,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<&MovementStep> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&MovementStep> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovementStep> {
        self.steps.iter()
    }

    /// Sum of all step delays
    pub fn total_delay_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.delay_ms).sum()
    }
}

/// A completed movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementRecord {
    pub started_at: Instant,
    pub finished_at: Instant,
    pub start: Position,
    pub end: Position,
    pub distance: f64,
}

impl MovementRecord {
    /// Displacement vector from start to end
    pub fn delta(&self) -> Point {
        Point::from(self.end) - Point::from(self.start)
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_at
            .saturating_duration_since(self.started_at)
            .as_millis() as u64
    }
}

/// Ring buffer of the most recent movements
#[derive(Debug, Clone, Default)]
pub struct MovementHistory {
    records: VecDeque<MovementRecord>,
}

impl MovementHistory {
    pub fn new() -> Self {
        Self {
            records: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Appends a record, evicting the oldest beyond [`HISTORY_CAPACITY`]
    pub fn push(&mut self, record: MovementRecord) {
        if self.records.len() == HISTORY_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovementRecord> {
        self.records.iter()
    }

    /// Average displacement of the last three movements
    pub fn momentum(&self) -> Point {
        let recent: Vec<Point> = self
            .records
            .iter()
            .rev()
            .take(MOMENTUM_WINDOW)
            .map(MovementRecord::delta)
            .collect();
        if recent.is_empty() {
            return Point::default();
        }
        let sum = recent.iter().fold(Point::default(), |acc, d| acc + *d);
        sum * (1.0 / recent.len() as f64)
    }
}

/// Number of path segments for a distance
pub fn step_count(distance: f64, config: &MovementConfig, rng: &mut dyn RandomSource) -> usize {
    let min = config.min_steps.max(1) as f64;
    let max = config.max_steps.max(config.min_steps).max(1) as f64;
    let nominal = distance / 5.0;

    let steps = if config.adaptive_steps {
        let clamped = nominal.max(min).min(max);
        let spread = (clamped * 0.1).max(1.0);
        clamped + rng.signed() * spread
    } else {
        nominal
    };

    steps.round().max(min).min(max) as usize
}

/// Control points for a curve between `start` and `end`
fn control_points(
    start: Point,
    end: Point,
    config: &MovementConfig,
    fatigue: f64,
    history: &MovementHistory,
    rng: &mut dyn RandomSource,
) -> (Point, Point) {
    let distance = start.distance_to(&end);
    let normal = (end - start).normalized().perpendicular();

    // Arc bulging to one side of the straight line
    let arc = config
        .control_point_distance
        .max(distance * config.curvature)
        .min(distance * 0.5);
    let side = if rng.chance(0.5) { 1.0 } else { -1.0 };

    // Spread shrinks for precise short moves and grows with fatigue
    let precision = (distance / PRECISION_DISTANCE).clamp(0.2, 1.0);
    let spread = distance * config.randomness * precision * randomness_factor(fatigue);

    let recent = history.momentum();
    let momentum = if recent.magnitude() > 0.0 {
        recent.normalized() * (recent.magnitude().min(distance) * MOMENTUM_WEIGHT)
    } else {
        Point::default()
    };

    let mut displaced = |fraction: f64, momentum_share: f64| {
        let arc_offset = normal * (arc * rng.range(0.3, 1.0) * side);
        let random_offset = Point::new(rng.signed() * spread, rng.signed() * spread);
        start.lerp(&end, fraction) + arc_offset + random_offset + momentum * momentum_share
    };

    let cp1 = displaced(1.0 / 3.0, 1.0);
    let cp2 = displaced(2.0 / 3.0, 0.5);
    (cp1, cp2)
}

/// Generates a human-like path from `start` to `end`
///
/// A zero-length move yields a single step with no delay. Otherwise the path
/// holds between `min_steps + 1` and `max_steps + 1` points, the first and
/// last within [`MovementConfig::jitter_tolerance`] (plus rounding) of the
/// endpoints.
pub fn generate_path(
    start: Position,
    end: Position,
    config: &MovementConfig,
    fatigue: f64,
    history: &MovementHistory,
    rng: &mut dyn RandomSource,
) -> MovementPath {
    let distance = start.distance_to(&end);
    if distance < DEGENERATE_DISTANCE {
        return MovementPath::single(start);
    }

    let segments = step_count(distance, config, rng);
    let (from, to) = (Point::from(start), Point::from(end));
    let (cp1, cp2) = control_points(from, to, config, fatigue, history, rng);
    let curve = BezierCurve::new(from, cp1, cp2, to);

    let jitter = config.jitter_tolerance(fatigue);
    let total = segments + 1;
    let steps = (0..=segments)
        .map(|i| {
            let point = curve.evaluate_at(i as f64 / segments as f64);
            let jittered = Point::new(
                point.x + rng.signed() * jitter,
                point.y + rng.signed() * jitter,
            );
            MovementStep {
                position: jittered.into(),
                delay_ms: step_delay(i, total, config, fatigue, rng),
            }
        })
        .collect();

    MovementPath { steps }
}

/// Decides whether to overshoot and where to land first
///
/// Returns a point `overshoot_distance` away from `target` at a random
/// angle, or `None` when no overshoot happens.
pub fn plan_overshoot(
    target: Position,
    config: &MovementConfig,
    rng: &mut dyn RandomSource,
) -> Option<Position> {
    if config.overshoot_distance <= 0.0 || !rng.chance(config.overshoot_probability) {
        return None;
    }
    let angle = rng.range(0.0, std::f64::consts::TAU);
    let point = Point::from(target)
        + Point::new(angle.cos(), angle.sin()) * config.overshoot_distance;
    Some(point.into())
}
