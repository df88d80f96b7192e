//! Primitive input backends
//!
//! [`InputBackend`] is the seam between the humanization engine and whatever
//! actually moves the pointer and presses keys. The engine only ever issues
//! one primitive at a time and sleeps between them; backends never delay.
//!
//! - [`RecordingBackend`] keeps every primitive in memory with the virtual
//!   time it was issued at. Tests and `--dry-run` use it.
//! - `EnigoBackend` (feature `os-input`) drives the real desktop.

use super::bezier::Position;
use super::keyboard::SpecialKey;
use super::mouse::MouseButton;
use super::{InputError, InputResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;

/// Low-level input capability consumed by the engine
#[async_trait]
pub trait InputBackend: Send {
    /// Moves the pointer to absolute screen coordinates.
    async fn move_to(&mut self, position: Position) -> InputResult<()>;

    /// Presses a mouse button without releasing it.
    async fn button_down(&mut self, button: MouseButton) -> InputResult<()>;

    /// Releases a previously pressed mouse button.
    async fn button_up(&mut self, button: MouseButton) -> InputResult<()>;

    /// Emits a printable character.
    async fn send_character(&mut self, ch: char) -> InputResult<()>;

    /// Taps a named key.
    async fn send_key(&mut self, key: SpecialKey) -> InputResult<()>;

    /// Scrolls the wheel by whole notches; positive `dy` scrolls down.
    async fn scroll_by(&mut self, dx: i32, dy: i32) -> InputResult<()>;

    /// Where the pointer currently is.
    async fn current_position(&mut self) -> InputResult<Position>;
}

/// A primitive issued to a [`RecordingBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedAction {
    MoveTo { position: Position },
    ButtonDown { button: MouseButton },
    ButtonUp { button: MouseButton },
    Character { ch: char },
    Key { key: SpecialKey },
    Scroll { dx: i32, dy: i32 },
}

/// A primitive and when it was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordedEvent {
    /// Milliseconds since the backend was created
    pub at_ms: u64,
    pub action: RecordedAction,
}

/// Shared handle to the events recorded by a [`RecordingBackend`]
pub type EventLog = Arc<Mutex<Vec<RecordedEvent>>>;

/// In-memory backend that records every primitive
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    events: EventLog,
    position: Position,
    origin: Instant,
    calls: usize,
    fail_after: Option<usize>,
}

impl RecordingBackend {
    /// Creates a backend with the pointer at the origin
    pub fn new() -> Self {
        Self::at(Position::default())
    }

    /// Creates a backend with the pointer at `position`
    pub fn at(position: Position) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            position,
            origin: Instant::now(),
            calls: 0,
            fail_after: None,
        }
    }

    /// Makes every primitive after the first `calls` fail
    pub fn fail_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    /// Handle that stays readable after the backend moves into an engine
    pub fn events(&self) -> EventLog {
        Arc::clone(&self.events)
    }

    /// Snapshot of the events recorded so far
    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    fn record(&mut self, operation: &str, action: RecordedAction) -> InputResult<()> {
        if self.fail_after.is_some_and(|limit| self.calls >= limit) {
            return Err(InputError::Backend {
                operation: operation.to_string(),
                message: format!("recording backend configured to fail after {} calls", self.calls),
            });
        }
        self.calls += 1;

        let at_ms = Instant::now().duration_since(self.origin).as_millis() as u64;
        self.events.lock().push(RecordedEvent { at_ms, action });
        Ok(())
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputBackend for RecordingBackend {
    async fn move_to(&mut self, position: Position) -> InputResult<()> {
        self.record("move_to", RecordedAction::MoveTo { position })?;
        self.position = position;
        Ok(())
    }

    async fn button_down(&mut self, button: MouseButton) -> InputResult<()> {
        self.record("button_down", RecordedAction::ButtonDown { button })
    }

    async fn button_up(&mut self, button: MouseButton) -> InputResult<()> {
        self.record("button_up", RecordedAction::ButtonUp { button })
    }

    async fn send_character(&mut self, ch: char) -> InputResult<()> {
        self.record("send_character", RecordedAction::Character { ch })
    }

    async fn send_key(&mut self, key: SpecialKey) -> InputResult<()> {
        self.record("send_key", RecordedAction::Key { key })
    }

    async fn scroll_by(&mut self, dx: i32, dy: i32) -> InputResult<()> {
        self.record("scroll_by", RecordedAction::Scroll { dx, dy })
    }

    async fn current_position(&mut self) -> InputResult<Position> {
        Ok(self.position)
    }
}

#[cfg(feature = "os-input")]
pub use self::os::EnigoBackend;

#[cfg(feature = "os-input")]
mod os {
    use super::*;
    use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

    /// Backend driving the real desktop pointer and keyboard through `enigo`
    pub struct EnigoBackend {
        enigo: Enigo,
    }

    impl EnigoBackend {
        pub fn new() -> InputResult<Self> {
            let enigo = Enigo::new(&Settings::default()).map_err(|e| {
                InputError::DeviceUnavailable {
                    device: format!("desktop input ({:?})", e),
                }
            })?;
            Ok(Self { enigo })
        }
    }

    fn backend_error(operation: &str, error: impl std::fmt::Debug) -> InputError {
        InputError::Backend {
            operation: operation.to_string(),
            message: format!("{:?}", error),
        }
    }

    fn to_enigo_button(button: MouseButton) -> Button {
        match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
        }
    }

    fn to_enigo_key(key: SpecialKey) -> Key {
        match key {
            SpecialKey::Enter => Key::Return,
            SpecialKey::Tab => Key::Tab,
            SpecialKey::Backspace => Key::Backspace,
            SpecialKey::Delete => Key::Delete,
            SpecialKey::Escape => Key::Escape,
            SpecialKey::ArrowUp => Key::UpArrow,
            SpecialKey::ArrowDown => Key::DownArrow,
            SpecialKey::ArrowLeft => Key::LeftArrow,
            SpecialKey::ArrowRight => Key::RightArrow,
            SpecialKey::Home => Key::Home,
            SpecialKey::End => Key::End,
            SpecialKey::PageUp => Key::PageUp,
            SpecialKey::PageDown => Key::PageDown,
        }
    }

    #[async_trait]
    impl InputBackend for EnigoBackend {
        async fn move_to(&mut self, position: Position) -> InputResult<()> {
            self.enigo
                .move_mouse(position.x, position.y, Coordinate::Abs)
                .map_err(|e| backend_error("move_to", e))
        }

        async fn button_down(&mut self, button: MouseButton) -> InputResult<()> {
            self.enigo
                .button(to_enigo_button(button), Direction::Press)
                .map_err(|e| backend_error("button_down", e))
        }

        async fn button_up(&mut self, button: MouseButton) -> InputResult<()> {
            self.enigo
                .button(to_enigo_button(button), Direction::Release)
                .map_err(|e| backend_error("button_up", e))
        }

        async fn send_character(&mut self, ch: char) -> InputResult<()> {
            let mut buf = [0u8; 4];
            self.enigo
                .text(ch.encode_utf8(&mut buf))
                .map_err(|e| backend_error("send_character", e))
        }

        async fn send_key(&mut self, key: SpecialKey) -> InputResult<()> {
            self.enigo
                .key(to_enigo_key(key), Direction::Click)
                .map_err(|e| backend_error("send_key", e))
        }

        async fn scroll_by(&mut self, dx: i32, dy: i32) -> InputResult<()> {
            if dx != 0 {
                self.enigo
                    .scroll(dx, Axis::Horizontal)
                    .map_err(|e| backend_error("scroll_by", e))?;
            }
            if dy != 0 {
                self.enigo
                    .scroll(dy, Axis::Vertical)
                    .map_err(|e| backend_error("scroll_by", e))?;
            }
            Ok(())
        }

        async fn current_position(&mut self) -> InputResult<Position> {
            let (x, y) = self
                .enigo
                .location()
                .map_err(|e| backend_error("current_position", e))?;
            Ok(Position::new(x, y))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_tracks_pointer() {
        let mut backend = RecordingBackend::at(Position::new(5, 5));
        assert_eq!(backend.current_position().await.unwrap(), Position::new(5, 5));

        backend.move_to(Position::new(40, 60)).await.unwrap();
        assert_eq!(backend.current_position().await.unwrap(), Position::new(40, 60));
        assert_eq!(
            backend.snapshot()[0].action,
            RecordedAction::MoveTo {
                position: Position::new(40, 60)
            }
        );
    }

    #[tokio::test]
    async fn test_events_handle_is_shared() {
        let mut backend = RecordingBackend::new();
        let events = backend.events();
        backend.send_character('x').await.unwrap();
        backend.send_key(SpecialKey::Backspace).await.unwrap();
        assert_eq!(events.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_after() {
        let mut backend = RecordingBackend::new().fail_after(1);
        backend.button_down(MouseButton::Left).await.unwrap();
        let err = backend.button_up(MouseButton::Left).await.unwrap_err();
        assert!(matches!(err, InputError::Backend { ref operation, .. } if operation == "button_up"));
        assert_eq!(backend.snapshot().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_virtual_timestamps() {
        let mut backend = RecordingBackend::new();
        backend.scroll_by(0, 1).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        backend.scroll_by(0, 1).await.unwrap();
        let events = backend.snapshot();
        assert_eq!(events[0].at_ms, 0);
        assert_eq!(events[1].at_ms, 250);
    }
}
