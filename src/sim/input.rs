//! Keyboard and pointer input state
//!
//! Keys are identified by DOM `KeyboardEvent.code` names so the layout of the
//! user's keyboard does not matter (WASD stays WASD on AZERTY).

use std::collections::BTreeSet;

use glam::Vec2;

/// Cardinal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in surface coordinates (y grows downward)
    pub fn step(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// A physical key that contributes to movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MovementKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    KeyW,
    KeyA,
    KeyS,
    KeyD,
}

impl MovementKey {
    pub fn direction(self) -> Direction {
        match self {
            MovementKey::ArrowUp | MovementKey::KeyW => Direction::Up,
            MovementKey::ArrowDown | MovementKey::KeyS => Direction::Down,
            MovementKey::ArrowLeft | MovementKey::KeyA => Direction::Left,
            MovementKey::ArrowRight | MovementKey::KeyD => Direction::Right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementKey::ArrowUp => "ArrowUp",
            MovementKey::ArrowDown => "ArrowDown",
            MovementKey::ArrowLeft => "ArrowLeft",
            MovementKey::ArrowRight => "ArrowRight",
            MovementKey::KeyW => "W",
            MovementKey::KeyA => "A",
            MovementKey::KeyS => "S",
            MovementKey::KeyD => "D",
        }
    }
}

/// What a key press means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(MovementKey),
    /// Space
    TogglePause,
    /// Enter
    ShowHelp,
    Other,
}

impl KeyAction {
    pub fn from_code(code: &str) -> Self {
        match code {
            "ArrowUp" => KeyAction::Move(MovementKey::ArrowUp),
            "ArrowDown" => KeyAction::Move(MovementKey::ArrowDown),
            "ArrowLeft" => KeyAction::Move(MovementKey::ArrowLeft),
            "ArrowRight" => KeyAction::Move(MovementKey::ArrowRight),
            "KeyW" => KeyAction::Move(MovementKey::KeyW),
            "KeyA" => KeyAction::Move(MovementKey::KeyA),
            "KeyS" => KeyAction::Move(MovementKey::KeyS),
            "KeyD" => KeyAction::Move(MovementKey::KeyD),
            "Space" => KeyAction::TogglePause,
            "Enter" => KeyAction::ShowHelp,
            _ => KeyAction::Other,
        }
    }

    /// Keys whose default browser behaviour (scrolling, submitting) the game
    /// suppresses when the focus is not on an editable element
    pub fn blocks_default(self) -> bool {
        !matches!(self, KeyAction::Other)
    }
}

/// Currently held movement keys
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: BTreeSet<MovementKey>,
}

impl HeldKeys {
    /// Returns true if the key was not already held (auto-repeat returns false)
    pub fn press(&mut self, key: MovementKey) -> bool {
        self.keys.insert(key)
    }

    pub fn release(&mut self, key: MovementKey) {
        self.keys.remove(&key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        self.keys.iter().any(|k| k.direction() == dir)
    }

    /// Movement direction of unit length, or zero. Opposite directions cancel;
    /// two keys for the same direction count once.
    pub fn direction(&self) -> Vec2 {
        let raw = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
        .into_iter()
        .filter(|d| self.is_held(*d))
        .fold(Vec2::ZERO, |acc, d| acc + d.step());
        raw.normalize_or_zero()
    }
}

/// Single/double click disambiguation.
///
/// The tracker only remembers whether a single click is waiting for its
/// debounce deadline; the deadline itself lives in the session's timer queue.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    pending: Option<PendingClick>,
}

/// A single click waiting for the debounce window to close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingClick {
    pub at_ms: f64,
    pub x: i32,
    pub y: i32,
}

/// Result of registering a click
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickKind {
    /// First click; resolve after the window unless a second one arrives
    Pending,
    /// Second click inside the window; carries the cancelled first click
    Double(PendingClick),
}

impl ClickTracker {
    pub fn click(&mut self, at_ms: f64, x: i32, y: i32) -> ClickKind {
        match self.pending.take() {
            Some(first) => ClickKind::Double(first),
            None => {
                self.pending = Some(PendingClick { at_ms, x, y });
                ClickKind::Pending
            }
        }
    }

    /// Debounce window closed with no second click
    pub fn resolve(&mut self) -> Option<PendingClick> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&PendingClick> {
        self.pending.as_ref()
    }
}
