//! Humanized input engine
//!
//! [`HumanInput`] owns the fatigue state, the recent movement history and
//! the random source, builds plans with the motion and typing planners, and
//! replays them against an [`InputBackend`]. Every planned delay becomes a
//! `tokio::time::sleep` between two primitive calls.
//!
//! Operations take `&mut self`, so one engine never runs two sequences at
//! once. Hosts that share an engine between tasks wrap it in
//! [`SharedHumanInput`].
//!
//! # Example
//!
//! ```rust
//! use human_input::input::{HumanInput, MouseButton, RecordingBackend, TypeOptions};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> human_input::input::InputResult<()> {
//! let backend = RecordingBackend::new();
//! let events = backend.events();
//! let mut input = HumanInput::with_seed(backend, 7);
//!
//! input.move_to_position(400, 300).await?;
//! input.click(MouseButton::Left).await?;
//! input.type_text("hello", TypeOptions::new().with_error_rate(0.0)).await?;
//!
//! assert!(!events.lock().is_empty());
//! assert_eq!(input.typing_stats().characters_typed, 5);
//! # Ok(())
//! # }
//! ```

use super::backend::InputBackend;
use super::bezier::Position;
use super::fatigue::{FatigueConfig, FatigueProfile, FatigueTracker};
use super::keyboard::{generate_pattern, SpecialKey, TypeOptions, TypingConfig, TypingPattern};
use super::mouse::{
    generate_path, plan_overshoot, MouseButton, MovementConfig, MovementHistory, MovementPath,
    MovementRecord, ScrollDirection,
};
use super::random::{RandomSource, SeededRandom};
use super::timing::{
    calculate_wpm, plan_click, ClickConfig, ClickPlan, DOUBLE_CLICK_INTERVAL, DRAG_GRIP,
    OVERSHOOT_SETTLE, SCROLL_NOTCH,
};
use super::typo::substitute_char;
use super::{InputError, InputResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace, warn};

/// Engine shared between tasks; one lock guards fatigue and pointer state
pub type SharedHumanInput<B> = Arc<Mutex<HumanInput<B>>>;

/// Pointer activity summary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MovementStats {
    pub total_movements: u64,
    pub total_distance: f64,
    pub average_distance: f64,
    pub average_duration_ms: f64,
    pub overshoots: u64,
    pub clicks: u64,
    pub last_position: Option<Position>,
    pub fatigue: f64,
}

/// Keyboard activity summary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TypingStats {
    pub characters_typed: u64,
    pub errors: u64,
    pub pauses: u64,
    /// Primitive key events, corrections included
    pub keystrokes: u64,
    pub total_time_ms: u64,
    pub words_per_minute: f64,
    pub fatigue: f64,
}

#[derive(Debug, Default)]
struct MovementCounters {
    movements: u64,
    distance: f64,
    duration_ms: u64,
    overshoots: u64,
    clicks: u64,
    last_position: Option<Position>,
}

#[derive(Debug, Default)]
struct TypingCounters {
    characters: u64,
    errors: u64,
    pauses: u64,
    keystrokes: u64,
    time: Duration,
}

fn backend_failed(error: InputError) -> InputError {
    warn!("Input backend call failed: {}", error);
    error
}

async fn pause(ms: u64) {
    if ms > 0 {
        sleep(Duration::from_millis(ms)).await;
    }
}

/// Human-like input engine over a primitive backend
pub struct HumanInput<B: InputBackend> {
    backend: B,
    movement: MovementConfig,
    click: ClickConfig,
    typing: TypingConfig,
    fatigue_config: FatigueConfig,
    fatigue: FatigueTracker,
    history: MovementHistory,
    rng: Box<dyn RandomSource>,
    last_activity: Option<Instant>,
    movement_counters: MovementCounters,
    typing_counters: TypingCounters,
}

impl<B: InputBackend> HumanInput<B> {
    /// Creates an engine with default settings and an entropy-seeded source
    pub fn new(backend: B) -> Self {
        Self::with_random(backend, Box::new(SeededRandom::from_entropy()))
    }

    /// Creates an engine whose plans are reproducible from `seed`
    pub fn with_seed(backend: B, seed: u64) -> Self {
        Self::with_random(backend, Box::new(SeededRandom::from_seed(seed)))
    }

    /// Creates an engine drawing all variance from `rng`
    pub fn with_random(backend: B, rng: Box<dyn RandomSource>) -> Self {
        Self {
            backend,
            movement: MovementConfig::default(),
            click: ClickConfig::default(),
            typing: TypingConfig::default(),
            fatigue_config: FatigueConfig::default(),
            fatigue: FatigueTracker::new(),
            history: MovementHistory::new(),
            rng,
            last_activity: None,
            movement_counters: MovementCounters::default(),
            typing_counters: TypingCounters::default(),
        }
    }

    pub fn with_movement_config(mut self, config: MovementConfig) -> Self {
        self.movement = config;
        self
    }

    pub fn with_click_config(mut self, config: ClickConfig) -> Self {
        self.click = config;
        self
    }

    pub fn with_typing_config(mut self, config: TypingConfig) -> Self {
        self.typing = config;
        self
    }

    pub fn with_fatigue_config(mut self, config: FatigueConfig) -> Self {
        self.fatigue_config = config;
        self
    }

    /// Wraps the engine for use from several tasks
    pub fn into_shared(self) -> SharedHumanInput<B> {
        Arc::new(Mutex::new(self))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn movement_config(&self) -> &MovementConfig {
        &self.movement
    }

    pub fn click_config(&self) -> &ClickConfig {
        &self.click
    }

    pub fn typing_config(&self) -> &TypingConfig {
        &self.typing
    }

    /// Current fatigue in `[0, 1]`
    pub fn fatigue(&self) -> f64 {
        self.fatigue.level()
    }

    pub fn history(&self) -> &MovementHistory {
        &self.history
    }

    /// Milliseconds since the previous action ended
    fn idle_ms(&self, now: Instant) -> u64 {
        self.last_activity
            .map(|last| now.saturating_duration_since(last).as_millis() as u64)
            .unwrap_or(u64::MAX)
    }

    fn note_activity(&mut self, profile: FatigueProfile) {
        let now = Instant::now();
        let idle = self.idle_ms(now);
        self.fatigue.update(idle, &profile);
        self.last_activity = Some(now);
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    /// Moves the pointer to `(x, y)` along a human-like path
    ///
    /// May hesitate before starting and may overshoot the target and
    /// correct back. Records the movement and updates fatigue.
    pub async fn move_to_position(&mut self, x: i32, y: i32) -> InputResult<()> {
        let target = Position::new(x, y);
        let started_at = Instant::now();
        let idle = self.idle_ms(started_at);
        let start = self
            .backend
            .current_position()
            .await
            .map_err(backend_failed)?;

        if self.rng.chance(self.movement.hesitation_chance) {
            let hesitation = self.movement.human_hesitation.sample(self.rng.as_mut());
            debug!("Hesitating {}ms before moving", hesitation);
            pause(hesitation).await;
        }

        let path = generate_path(
            start,
            target,
            &self.movement,
            self.fatigue.level(),
            &self.history,
            self.rng.as_mut(),
        );
        debug!(
            "Planned path {} -> {}: {} points, {}ms",
            start,
            target,
            path.len(),
            path.total_delay_ms()
        );
        self.execute_path(&path).await?;

        let overshoot = plan_overshoot(target, &self.movement, self.rng.as_mut());
        if let Some(landing) = overshoot {
            debug!("Overshooting {} to {}", target, landing);
            self.backend.move_to(landing).await.map_err(backend_failed)?;
            trace!("move_to {}", landing);
            pause(OVERSHOOT_SETTLE.sample(self.rng.as_mut())).await;

            let corrective = generate_path(
                landing,
                target,
                &self.movement.corrective(),
                self.fatigue.level(),
                &self.history,
                self.rng.as_mut(),
            );
            self.execute_path(&corrective).await?;
            self.movement_counters.overshoots += 1;
        }

        let finished_at = Instant::now();
        self.record_movement(started_at, finished_at, start, target);
        self.fatigue.update(idle, &self.fatigue_config.mouse);
        self.last_activity = Some(finished_at);
        Ok(())
    }

    fn record_movement(&mut self, started_at: Instant, finished_at: Instant, start: Position, end: Position) {
        let record = MovementRecord {
            started_at,
            finished_at,
            start,
            end,
            distance: start.distance_to(&end),
        };
        let counters = &mut self.movement_counters;
        counters.movements += 1;
        counters.distance += record.distance;
        counters.duration_ms += record.duration_ms();
        counters.last_position = Some(end);
        self.history.push(record);
    }

    /// Replays a planned path step by step
    pub async fn execute_path(&mut self, path: &MovementPath) -> InputResult<()> {
        for step in path.iter() {
            self.backend
                .move_to(step.position)
                .await
                .map_err(backend_failed)?;
            trace!("move_to {} then wait {}ms", step.position, step.delay_ms);
            pause(step.delay_ms).await;
        }
        Ok(())
    }

    async fn press_release(&mut self, button: MouseButton, hold_ms: u64) -> InputResult<()> {
        self.backend
            .button_down(button)
            .await
            .map_err(backend_failed)?;
        trace!("button_down {}", button);
        pause(hold_ms).await;
        self.backend.button_up(button).await.map_err(backend_failed)?;
        trace!("button_up {}", button);
        Ok(())
    }

    async fn nudge(&mut self, plan: &ClickPlan) -> InputResult<()> {
        if let Some((dx, dy)) = plan.micro_offset {
            let here = self
                .backend
                .current_position()
                .await
                .map_err(backend_failed)?;
            let nudged = here.offset(dx, dy);
            self.backend.move_to(nudged).await.map_err(backend_failed)?;
            trace!("micro movement to {}", nudged);
        }
        Ok(())
    }

    /// Clicks at the current pointer position
    pub async fn click(&mut self, button: MouseButton) -> InputResult<()> {
        let plan = plan_click(&self.click, self.fatigue.level(), self.rng.as_mut());
        debug!("Click {} planned: {}ms", button, plan.total_ms());

        pause(plan.pre_click_ms).await;
        self.nudge(&plan).await?;
        self.press_release(button, plan.hold_ms).await?;
        pause(plan.post_click_ms).await;

        self.movement_counters.clicks += 1;
        self.note_activity(self.fatigue_config.mouse);
        Ok(())
    }

    /// Moves to `(x, y)` and clicks there
    pub async fn click_at(&mut self, x: i32, y: i32, button: MouseButton) -> InputResult<()> {
        self.move_to_position(x, y).await?;
        self.click(button).await
    }

    /// Two clicks in quick succession at the current position
    pub async fn double_click(&mut self, button: MouseButton) -> InputResult<()> {
        let first = plan_click(&self.click, self.fatigue.level(), self.rng.as_mut());
        let second = plan_click(&self.click, self.fatigue.level(), self.rng.as_mut());
        let interval = DOUBLE_CLICK_INTERVAL.sample(self.rng.as_mut());

        pause(first.pre_click_ms).await;
        self.nudge(&first).await?;
        self.press_release(button, first.hold_ms).await?;
        pause(interval).await;
        self.press_release(button, second.hold_ms).await?;
        pause(second.post_click_ms).await;

        self.movement_counters.clicks += 2;
        self.note_activity(self.fatigue_config.mouse);
        Ok(())
    }

    /// Presses at `(x1, y1)`, drags to `(x2, y2)` and releases
    ///
    /// The dragging leg uses the steadier, slower corrective settings.
    pub async fn drag(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> InputResult<()> {
        self.move_to_position(x1, y1).await?;

        let started_at = Instant::now();
        let from = self
            .backend
            .current_position()
            .await
            .map_err(backend_failed)?;
        let to = Position::new(x2, y2);

        self.backend
            .button_down(MouseButton::Left)
            .await
            .map_err(backend_failed)?;
        pause(DRAG_GRIP.sample(self.rng.as_mut())).await;

        let path = generate_path(
            from,
            to,
            &self.movement.corrective(),
            self.fatigue.level(),
            &self.history,
            self.rng.as_mut(),
        );
        debug!("Drag {} -> {}: {} points", from, to, path.len());
        self.execute_path(&path).await?;

        self.backend
            .button_up(MouseButton::Left)
            .await
            .map_err(backend_failed)?;

        self.record_movement(started_at, Instant::now(), from, to);
        self.note_activity(self.fatigue_config.mouse);
        Ok(())
    }

    /// Scrolls `amount` wheel notches, one primitive per notch
    pub async fn scroll(&mut self, direction: ScrollDirection, amount: u32) -> InputResult<()> {
        let (dx, dy) = direction.unit_delta();
        for notch in 0..amount {
            self.backend.scroll_by(dx, dy).await.map_err(backend_failed)?;
            trace!("scroll_by ({}, {})", dx, dy);
            if notch + 1 < amount {
                pause(SCROLL_NOTCH.sample(self.rng.as_mut())).await;
            }
        }
        if amount > 0 {
            self.note_activity(self.fatigue_config.mouse);
        }
        Ok(())
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    /// Types `text` with human timing, typos and thinking pauses
    pub async fn type_text(&mut self, text: &str, options: TypeOptions) -> InputResult<()> {
        let config = options.apply(&self.typing);
        let pattern = generate_pattern(
            text,
            config.wpm,
            &config,
            self.fatigue.level(),
            self.rng.as_mut(),
        );
        debug!(
            "Planned {} characters at {:.1} WPM ({} errors, {} pauses)",
            pattern.len(),
            pattern.wpm,
            pattern.error_count(),
            pattern.pause_count()
        );
        self.execute_pattern(&pattern).await
    }

    async fn emit(&mut self, ch: char) -> InputResult<()> {
        match SpecialKey::for_char(ch) {
            Some(key) => {
                self.backend.send_key(key).await.map_err(backend_failed)?;
                trace!("send_key {}", key);
            }
            None => {
                self.backend
                    .send_character(ch)
                    .await
                    .map_err(backend_failed)?;
                trace!("send_character {:?}", ch);
            }
        }
        self.typing_counters.keystrokes += 1;
        Ok(())
    }

    /// Replays a typing pattern
    ///
    /// Per step: the thinking pause, the keystroke delay, then the character.
    /// An error step types a plausible wrong character, waits the reaction
    /// delay, deletes it and types the right one after 80% of the delay.
    pub async fn execute_pattern(&mut self, pattern: &TypingPattern) -> InputResult<()> {
        let started = Instant::now();
        let result = self.replay_steps(pattern).await;
        // Partial runs count too, so WPM stays consistent with the characters sent
        self.typing_counters.time += Instant::now().saturating_duration_since(started);
        result
    }

    async fn replay_steps(&mut self, pattern: &TypingPattern) -> InputResult<()> {
        let chars = pattern.chars();

        for (index, step) in pattern.iter().enumerate() {
            if step.pause_ms > 0 {
                trace!("Thinking pause {}ms", step.pause_ms);
                pause(step.pause_ms).await;
                self.typing_counters.pauses += 1;
            }
            pause(step.delay_ms).await;

            if step.is_error {
                let wrong = substitute_char(&chars, index, self.rng.as_mut());
                self.emit(wrong).await?;

                let reaction = self.typing.correction_delay.sample(self.rng.as_mut());
                pause(reaction).await;
                self.backend
                    .send_key(SpecialKey::Backspace)
                    .await
                    .map_err(backend_failed)?;
                self.typing_counters.keystrokes += 1;
                trace!("Corrected {:?} -> {:?} after {}ms", wrong, step.ch, reaction);

                let retype = ((step.delay_ms as f64 * 0.8).round() as u64).max(1);
                pause(retype).await;
                self.typing_counters.errors += 1;
            }
            self.emit(step.ch).await?;

            self.typing_counters.characters += 1;
            self.note_activity(self.fatigue_config.typing);
        }
        Ok(())
    }

    // ========================================================================
    // Stats and lifecycle
    // ========================================================================

    pub fn movement_stats(&self) -> MovementStats {
        let c = &self.movement_counters;
        let (average_distance, average_duration_ms) = if c.movements > 0 {
            (
                c.distance / c.movements as f64,
                c.duration_ms as f64 / c.movements as f64,
            )
        } else {
            (0.0, 0.0)
        };
        MovementStats {
            total_movements: c.movements,
            total_distance: c.distance,
            average_distance,
            average_duration_ms,
            overshoots: c.overshoots,
            clicks: c.clicks,
            last_position: c.last_position,
            fatigue: self.fatigue.level(),
        }
    }

    pub fn typing_stats(&self) -> TypingStats {
        let c = &self.typing_counters;
        TypingStats {
            characters_typed: c.characters,
            errors: c.errors,
            pauses: c.pauses,
            keystrokes: c.keystrokes,
            total_time_ms: c.time.as_millis() as u64,
            words_per_minute: calculate_wpm(c.characters as usize, c.time),
            fatigue: self.fatigue.level(),
        }
    }

    /// Starts a fresh session: rested, no history, zeroed stats
    pub fn reset(&mut self) {
        self.fatigue.reset();
        self.history.clear();
        self.last_activity = None;
        self.movement_counters = MovementCounters::default();
        self.typing_counters = TypingCounters::default();
        info!("Input engine reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::backend::{RecordedAction, RecordingBackend};
    use crate::input::random::ScriptedRandom;

    fn calm_movement() -> MovementConfig {
        MovementConfig {
            hesitation_chance: 0.0,
            overshoot_probability: 0.0,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_ends_on_target() {
        let backend = RecordingBackend::at(Position::new(0, 0));
        let events = backend.events();
        let mut input = HumanInput::with_seed(backend, 3).with_movement_config(calm_movement());

        input.move_to_position(300, 200).await.unwrap();

        let moves: Vec<Position> = events
            .lock()
            .iter()
            .filter_map(|e| match e.action {
                RecordedAction::MoveTo { position } => Some(position),
                _ => None,
            })
            .collect();
        assert!(moves.len() >= 11);
        let last = *moves.last().unwrap();
        assert!(last.distance_to(&Position::new(300, 200)) <= 3.0);

        let stats = input.movement_stats();
        assert_eq!(stats.total_movements, 1);
        assert_eq!(stats.last_position, Some(Position::new(300, 200)));
        assert_eq!(input.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_overshoot_corrects_back() {
        let backend = RecordingBackend::at(Position::new(0, 0));
        let mut input = HumanInput::with_seed(backend, 9).with_movement_config(MovementConfig {
            overshoot_probability: 1.0,
            hesitation_chance: 0.0,
            ..Default::default()
        });

        input.move_to_position(500, 500).await.unwrap();
        assert_eq!(input.movement_stats().overshoots, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overshoot_lands_past_target_then_settles() {
        let target = Position::new(500, 500);
        let backend = RecordingBackend::at(Position::new(0, 0));
        let events = backend.events();
        let mut input = HumanInput::with_random(backend, Box::new(ScriptedRandom::constant(0.5)))
            .with_movement_config(MovementConfig {
                overshoot_probability: 1.0,
                overshoot_distance: 30.0,
                jitter_intensity: 0.0,
                hesitation_chance: 0.0,
                ..Default::default()
            });

        input.move_to_position(target.x, target.y).await.unwrap();

        let moves: Vec<(u64, Position)> = events
            .lock()
            .iter()
            .filter_map(|e| match e.action {
                RecordedAction::MoveTo { position } => Some((e.at_ms, position)),
                _ => None,
            })
            .collect();

        // A 0.5 draw puts the landing point at angle pi, straight left of the target
        let landing = Position::new(470, 500);
        let index = moves.iter().position(|(_, p)| *p == landing).unwrap();
        assert!((landing.distance_to(&target) - 30.0).abs() < 1e-9);
        assert_eq!(moves[index - 1].1, target, "nominal path ends on the target");

        // The corrective path starts where the pointer landed, after the settle
        assert_eq!(moves[index + 1].1, landing);
        assert_eq!(moves[index + 1].0 - moves[index].0, 100);

        assert!(moves.len() - index > 2);
        assert_eq!(moves.last().unwrap().1, target);
        assert_eq!(input.movement_stats().last_position, Some(target));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_sequence() {
        let backend = RecordingBackend::at(Position::new(50, 50));
        let events = backend.events();
        let mut input = HumanInput::with_random(backend, Box::new(ScriptedRandom::constant(0.5)))
            .with_click_config(ClickConfig {
                micro_movement_before_click: false,
                ..Default::default()
            });

        let start = Instant::now();
        input.click(MouseButton::Right).await.unwrap();

        let actions: Vec<RecordedAction> = events.lock().iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                RecordedAction::ButtonDown { button: MouseButton::Right },
                RecordedAction::ButtonUp { button: MouseButton::Right },
            ]
        );
        // pre 100 + hold 96 + post 65
        assert_eq!(start.elapsed(), Duration::from_millis(261));
        assert_eq!(input.movement_stats().clicks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_notches() {
        let backend = RecordingBackend::new();
        let events = backend.events();
        let mut input = HumanInput::with_random(backend, Box::new(ScriptedRandom::constant(0.5)));

        let start = Instant::now();
        input.scroll(ScrollDirection::Down, 3).await.unwrap();

        let recorded = events.lock().clone();
        assert_eq!(recorded.len(), 3);
        assert!(recorded
            .iter()
            .all(|e| e.action == RecordedAction::Scroll { dx: 0, dy: 1 }));
        // two gaps at the 60ms midpoint
        assert_eq!(start.elapsed(), Duration::from_millis(120));

        input.scroll(ScrollDirection::Up, 0).await.unwrap();
        assert_eq!(events.lock().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newline_sends_enter() {
        let backend = RecordingBackend::new();
        let events = backend.events();
        let mut input = HumanInput::with_seed(backend, 1);

        let options = TypeOptions::new()
            .with_error_rate(0.0)
            .with_thinking_pauses(false);
        input.type_text("a\nb", options).await.unwrap();

        let actions: Vec<RecordedAction> = events.lock().iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                RecordedAction::Character { ch: 'a' },
                RecordedAction::Key { key: SpecialKey::Enter },
                RecordedAction::Character { ch: 'b' },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_state() {
        let backend = RecordingBackend::new();
        let mut input = HumanInput::with_seed(backend, 5).with_movement_config(calm_movement());

        input.move_to_position(100, 100).await.unwrap();
        input
            .type_text("hello there", TypeOptions::new().with_error_rate(0.0))
            .await
            .unwrap();
        assert!(input.fatigue() > 0.0);

        input.reset();
        assert_eq!(input.fatigue(), 0.0);
        assert!(input.history().is_empty());
        assert_eq!(input.movement_stats().total_movements, 0);
        assert_eq!(input.typing_stats().characters_typed, 0);
    }
}
