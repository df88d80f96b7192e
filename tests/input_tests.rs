//! Integration tests for the input simulation module
//!
//! Tests for path planning, typing patterns, fatigue, and the engine's
//! replay of plans against a recording backend in virtual time.

use human_input::input::fatigue::{FatigueConfig, FatigueProfile, FatigueTracker};
use human_input::input::keyboard::{generate_pattern, ThinkingPauses, TypingConfig};
use human_input::input::mouse::{generate_path, MovementConfig, MovementHistory};
use human_input::input::timing::{step_delay, DelayRange};
use human_input::input::{
    HumanInput, InputError, MouseButton, Position, RandomSource, RecordedAction, RecordedEvent,
    RecordingBackend, ScriptedRandom, SeededRandom, SpecialKey, TypeOptions,
};
use std::time::Duration;
use tokio::time::Instant;

/// Helpers shared by the engine tests
mod helpers {
    use super::*;

    pub fn quiet_typing() -> TypingConfig {
        TypingConfig {
            error_rate: 0.0,
            thinking_pauses: ThinkingPauses {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn calm_movement() -> MovementConfig {
        MovementConfig {
            hesitation_chance: 0.0,
            overshoot_probability: 0.0,
            ..Default::default()
        }
    }

    pub fn fixed_engine(backend: RecordingBackend) -> HumanInput<RecordingBackend> {
        HumanInput::with_random(backend, Box::new(ScriptedRandom::constant(0.5)))
    }

    pub fn typed(events: &[RecordedEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e.action {
                RecordedAction::Character { ch } => Some(ch),
                _ => None,
            })
            .collect()
    }
}

use helpers::*;

// ============================================================================
// Path Planning
// ============================================================================

#[test]
fn test_path_500px_point_count() {
    let config = MovementConfig::default();
    assert_eq!(config.min_steps, 10);
    assert_eq!(config.max_steps, 100);

    for seed in 0..25 {
        let mut rng = SeededRandom::from_seed(seed);
        let path = generate_path(
            Position::new(100, 400),
            Position::new(600, 400),
            &config,
            0.0,
            &MovementHistory::new(),
            &mut rng,
        );
        assert!(
            (11..=101).contains(&path.len()),
            "seed {} produced {} points",
            seed,
            path.len()
        );
    }
}

#[test]
fn test_path_endpoints_close_to_request() {
    let config = MovementConfig::default();
    let start = Position::new(900, 50);
    let end = Position::new(20, 700);

    for seed in 0..10 {
        let fatigue = seed as f64 / 10.0;
        let path = generate_path(
            start,
            end,
            &config,
            fatigue,
            &MovementHistory::new(),
            &mut SeededRandom::from_seed(seed),
        );
        let tolerance = config.jitter_tolerance(fatigue) + 1.0;
        let first = path.first().unwrap().position;
        let last = path.last().unwrap().position;
        assert!((first.x - start.x).abs() as f64 <= tolerance);
        assert!((first.y - start.y).abs() as f64 <= tolerance);
        assert!((last.x - end.x).abs() as f64 <= tolerance);
        assert!((last.y - end.y).abs() as f64 <= tolerance);
    }
}

#[test]
fn test_path_to_same_point_is_single_step() {
    let p = Position::new(321, 123);
    let path = generate_path(
        p,
        p,
        &MovementConfig::default(),
        1.0,
        &MovementHistory::new(),
        &mut SeededRandom::from_seed(0),
    );
    assert_eq!(path.len(), 1);
    assert_eq!(path.steps[0].position, p);
    assert_eq!(path.steps[0].delay_ms, 0);
}

#[test]
fn test_step_delay_never_below_one() {
    let config = MovementConfig {
        base_speed: 0.01,
        ..Default::default()
    };
    let mut rng = SeededRandom::from_seed(8);
    for total in [0, 1, 2, 11, 101] {
        for i in 0..total.max(1) {
            assert!(step_delay(i, total, &config, 0.0, &mut rng) >= 1);
        }
    }
}

// ============================================================================
// Fatigue
// ============================================================================

#[test]
fn test_fatigue_bounded_under_any_sequence() {
    let mut fatigue = FatigueTracker::new();
    let profiles = [FatigueProfile::mouse(), FatigueProfile::typing()];
    let mut rng = SeededRandom::from_seed(99);

    for _ in 0..20_000 {
        let idle = (rng.next_f64() * 5_000.0) as u64;
        let profile = &profiles[rng.pick_index(2)];
        fatigue.update(idle, profile);
        assert!((0.0..=1.0).contains(&fatigue.level()));
    }
}

// ============================================================================
// Typing Patterns
// ============================================================================

#[test]
fn test_pattern_length_equals_char_count() {
    let config = TypingConfig {
        error_rate: 0.3,
        ..Default::default()
    };
    let mut rng = SeededRandom::from_seed(12);
    for text in ["", " ", "The quick brown fox.", "naïve café ☕", "line one\nline two\t!"] {
        let pattern = generate_pattern(text, 45.0, &config, 0.5, &mut rng);
        assert_eq!(pattern.len(), text.chars().count());
        assert_eq!(pattern.chars(), text.chars().collect::<Vec<_>>());
    }
}

#[test]
fn test_hello_world_exact_delays() {
    let pattern = generate_pattern(
        "Hello, World!",
        45.0,
        &quiet_typing(),
        0.0,
        &mut ScriptedRandom::constant(0.5),
    );

    assert_eq!(pattern.len(), 13);
    assert_eq!(pattern.error_count(), 0);
    assert_eq!(pattern.pause_count(), 0);

    let delays: Vec<u64> = pattern.iter().map(|s| s.delay_ms).collect();
    assert_eq!(
        delays,
        vec![336, 250, 225, 225, 287, 494, 235, 373, 250, 250, 225, 258, 494]
    );
}

#[test]
fn test_fatigue_slows_typing() {
    let rested = generate_pattern(
        "steady typing",
        60.0,
        &quiet_typing(),
        0.0,
        &mut ScriptedRandom::constant(0.5),
    );
    let tired = generate_pattern(
        "steady typing",
        60.0,
        &quiet_typing(),
        1.0,
        &mut ScriptedRandom::constant(0.5),
    );
    assert!(tired.planned_ms() > rested.planned_ms());
    assert!(tired.wpm < rested.wpm);
}

// ============================================================================
// Engine: Typing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_engine_types_hello_world_on_schedule() {
    let backend = RecordingBackend::new();
    let events = backend.events();
    let mut input = fixed_engine(backend).with_typing_config(quiet_typing());

    let start = Instant::now();
    input
        .type_text("Hello, World!", TypeOptions::default())
        .await
        .unwrap();

    let recorded = events.lock().clone();
    assert_eq!(typed(&recorded), "Hello, World!");

    let expected = [336u64, 250, 225, 225, 287, 494, 235, 373, 250, 250, 225, 258, 494];
    let mut at = 0;
    for (event, delay) in recorded.iter().zip(expected) {
        at += delay;
        assert_eq!(event.at_ms, at);
    }
    assert_eq!(start.elapsed(), Duration::from_millis(3902));

    let stats = input.typing_stats();
    assert_eq!(stats.characters_typed, 13);
    assert_eq!(stats.keystrokes, 13);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.total_time_ms, 3902);
}

#[tokio::test(start_paused = true)]
async fn test_engine_forced_error_is_corrected() {
    let backend = RecordingBackend::new();
    let events = backend.events();
    let config = TypingConfig {
        error_rate: 1.0,
        ..quiet_typing()
    };
    let mut input = fixed_engine(backend).with_typing_config(config);

    let start = Instant::now();
    input.type_text("a", TypeOptions::default()).await.unwrap();

    // delay 235ms, wrong key, 275ms reaction, backspace, 188ms, right key
    let recorded = events.lock().clone();
    assert_eq!(
        recorded,
        vec![
            RecordedEvent {
                at_ms: 235,
                action: RecordedAction::Character { ch: 's' },
            },
            RecordedEvent {
                at_ms: 510,
                action: RecordedAction::Key {
                    key: SpecialKey::Backspace,
                },
            },
            RecordedEvent {
                at_ms: 698,
                action: RecordedAction::Character { ch: 'a' },
            },
        ]
    );
    assert_eq!(start.elapsed(), Duration::from_millis(698));

    let stats = input.typing_stats();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.keystrokes, 3);
    assert_eq!(stats.characters_typed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_engine_final_text_survives_typos() {
    let backend = RecordingBackend::new();
    let events = backend.events();
    let mut input = HumanInput::with_seed(backend, 31);

    let text = "Typos happen, but the final text is always right.";
    input
        .type_text(text, TypeOptions::new().with_error_rate(0.3))
        .await
        .unwrap();

    // Replay the recorded keystrokes into a buffer
    let mut buffer = String::new();
    for event in events.lock().iter() {
        match event.action {
            RecordedAction::Character { ch } => buffer.push(ch),
            RecordedAction::Key {
                key: SpecialKey::Backspace,
            } => {
                buffer.pop();
            }
            _ => {}
        }
    }
    assert_eq!(buffer, text);
    assert!(input.typing_stats().errors > 0);
}

#[tokio::test(start_paused = true)]
async fn test_backend_failure_aborts_without_retry() {
    let backend = RecordingBackend::new().fail_after(3);
    let events = backend.events();
    let mut input = fixed_engine(backend).with_typing_config(quiet_typing());

    let start = Instant::now();
    let err = input
        .type_text("hello", TypeOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, InputError::Backend { ref operation, .. } if operation == "send_character"));
    assert_eq!(typed(&events.lock()), "hel");

    // The aborted run still accounts for the time it spent
    let stats = input.typing_stats();
    assert_eq!(stats.characters_typed, 3);
    assert_eq!(stats.total_time_ms, start.elapsed().as_millis() as u64);
    assert!(stats.total_time_ms > events.lock().last().unwrap().at_ms);
    assert!(stats.words_per_minute.is_finite() && stats.words_per_minute > 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_thinking_pause_precedes_keystroke() {
    let backend = RecordingBackend::new();
    let events = backend.events();
    let config = TypingConfig {
        thinking_pauses: ThinkingPauses {
            enabled: true,
            probability: 1.0,
            duration: DelayRange::new(300, 1200),
        },
        ..quiet_typing()
    };
    let mut input = fixed_engine(backend).with_typing_config(config);

    input.type_text("ab", TypeOptions::default()).await.unwrap();

    // 750ms pause then 276ms delay for 'a'; 750ms pause then 337ms delay for 'b'
    let recorded = events.lock().clone();
    assert_eq!(
        recorded,
        vec![
            RecordedEvent {
                at_ms: 1026,
                action: RecordedAction::Character { ch: 'a' },
            },
            RecordedEvent {
                at_ms: 2113,
                action: RecordedAction::Character { ch: 'b' },
            },
        ]
    );

    let stats = input.typing_stats();
    assert_eq!(stats.pauses, 2);
    assert_eq!(stats.total_time_ms, 2113);
}

#[tokio::test(start_paused = true)]
async fn test_fatigue_accumulates_and_recovers() {
    let backend = RecordingBackend::new();
    let fatigue = FatigueConfig {
        typing: FatigueProfile {
            rest_threshold_ms: 3_000,
            recovery_step: 0.05,
            activity_step: 0.01,
        },
        ..Default::default()
    };
    let mut input = fixed_engine(backend)
        .with_typing_config(quiet_typing())
        .with_fatigue_config(fatigue);

    // The first keystroke follows no prior activity and counts as rest
    input
        .type_text(&"x".repeat(50), TypeOptions::default())
        .await
        .unwrap();
    assert!((input.fatigue() - 0.49).abs() < 1e-9);

    tokio::time::sleep(Duration::from_secs(5)).await;
    input.type_text("y", TypeOptions::default()).await.unwrap();
    assert!((input.fatigue() - 0.44).abs() < 1e-9);
}

// ============================================================================
// Engine: Pointer
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_click_at_moves_then_clicks() {
    let backend = RecordingBackend::at(Position::new(10, 10));
    let events = backend.events();
    let mut input = HumanInput::with_seed(backend, 4).with_movement_config(calm_movement());

    input.click_at(640, 480, MouseButton::Left).await.unwrap();

    let actions: Vec<RecordedAction> = events.lock().iter().map(|e| e.action).collect();
    let down = actions
        .iter()
        .position(|a| *a == RecordedAction::ButtonDown { button: MouseButton::Left })
        .unwrap();
    let up = actions
        .iter()
        .position(|a| *a == RecordedAction::ButtonUp { button: MouseButton::Left })
        .unwrap();
    assert!(down < up);
    assert!(actions[..down]
        .iter()
        .all(|a| matches!(a, RecordedAction::MoveTo { .. })));

    // The press lands within jitter and micro-movement of the target
    if let RecordedAction::MoveTo { position } = actions[down - 1] {
        assert!(position.distance_to(&Position::new(640, 480)) <= 6.0);
    }

    let stats = input.movement_stats();
    assert_eq!(stats.total_movements, 1);
    assert_eq!(stats.clicks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_hesitation_delays_first_step() {
    let first_move = |hesitation_chance: f64| async move {
        let backend = RecordingBackend::at(Position::new(10, 10));
        let events = backend.events();
        let mut input = fixed_engine(backend).with_movement_config(MovementConfig {
            hesitation_chance,
            human_hesitation: DelayRange::new(200, 400),
            ..calm_movement()
        });

        let start = Instant::now();
        input.move_to_position(240, 160).await.unwrap();
        let first = events.lock().first().unwrap().at_ms;
        (first, start.elapsed())
    };

    let (eager_first, eager_total) = first_move(0.0).await;
    let (hesitant_first, hesitant_total) = first_move(1.0).await;

    assert_eq!(eager_first, 0);
    assert_eq!(hesitant_first, 300);
    assert_eq!(hesitant_total - eager_total, Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_drag_holds_button_across_path() {
    let backend = RecordingBackend::at(Position::new(0, 0));
    let events = backend.events();
    let mut input = HumanInput::with_seed(backend, 6).with_movement_config(calm_movement());

    input.drag(100, 100, 400, 250).await.unwrap();

    let actions: Vec<RecordedAction> = events.lock().iter().map(|e| e.action).collect();
    let down = actions
        .iter()
        .position(|a| matches!(a, RecordedAction::ButtonDown { .. }))
        .unwrap();
    let up = actions
        .iter()
        .position(|a| matches!(a, RecordedAction::ButtonUp { .. }))
        .unwrap();
    assert_eq!(up, actions.len() - 1);
    assert!(up - down > 10, "drag should move while the button is held");
    assert_eq!(input.movement_stats().total_movements, 2);
}

#[tokio::test(start_paused = true)]
async fn test_movement_history_is_bounded() {
    let backend = RecordingBackend::new();
    let mut input = HumanInput::with_seed(backend, 2).with_movement_config(calm_movement());

    for i in 0..15 {
        input.move_to_position(50 + i * 30, 80 + i * 10).await.unwrap();
    }
    assert_eq!(input.history().len(), 10);
    assert_eq!(input.movement_stats().total_movements, 15);
}

#[tokio::test(start_paused = true)]
async fn test_shared_engine_serializes_tasks() {
    let shared = HumanInput::with_seed(RecordingBackend::new(), 8)
        .with_movement_config(calm_movement())
        .with_typing_config(quiet_typing())
        .into_shared();

    let mover = {
        let shared = shared.clone();
        tokio::spawn(async move { shared.lock().await.move_to_position(300, 300).await })
    };
    let typist = {
        let shared = shared.clone();
        tokio::spawn(async move {
            shared
                .lock()
                .await
                .type_text("shared", TypeOptions::default())
                .await
        })
    };

    mover.await.unwrap().unwrap();
    typist.await.unwrap().unwrap();

    let input = shared.lock().await;
    assert_eq!(input.movement_stats().total_movements, 1);
    assert_eq!(input.typing_stats().characters_typed, 6);
}
