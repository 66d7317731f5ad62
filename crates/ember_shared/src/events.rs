//! Engine event types carried on the [`EventBus`](ember_core::EventBus).
//!
//! Input events are produced by the platform layer (or the headless driver);
//! domain events such as [`CollisionEvent`] are produced by systems.

use std::borrow::Cow;

use ember_core::{Entity, Event};
use serde::{Deserialize, Serialize};

/// Two colliders overlap this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// First entity of the pair.
    pub a: Entity,
    /// Second entity of the pair.
    pub b: Entity,
}

impl Event for CollisionEvent {}

/// Keyboard key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Return / Enter.
    Return,
    /// F5.
    F5,
    /// Left control.
    LeftCtrl,
    /// Right control.
    RightCtrl,
    /// Left shift.
    LeftShift,
    /// Right shift.
    RightShift,
    /// Left alt.
    LeftAlt,
    /// Right alt.
    RightAlt,
    /// Printable character key.
    Char(char),
}

impl Key {
    /// Lower-case key name, as scripts refer to it (`"left ctrl"`, `"a"`).
    #[must_use]
    pub fn name(self) -> Cow<'static, str> {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Space => "space",
            Self::Escape => "escape",
            Self::Return => "return",
            Self::F5 => "f5",
            Self::LeftCtrl => "left ctrl",
            Self::RightCtrl => "right ctrl",
            Self::LeftShift => "left shift",
            Self::RightShift => "right shift",
            Self::LeftAlt => "left alt",
            Self::RightAlt => "right alt",
            Self::Char(c) => return Cow::Owned(c.to_lowercase().collect()),
        };
        Cow::Borrowed(name)
    }

    /// Parses a key name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let key = match lower.as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "space" => Self::Space,
            "escape" => Self::Escape,
            "return" => Self::Return,
            "f5" => Self::F5,
            "left ctrl" => Self::LeftCtrl,
            "right ctrl" => Self::RightCtrl,
            "left shift" => Self::LeftShift,
            "right shift" => Self::RightShift,
            "left alt" => Self::LeftAlt,
            "right alt" => Self::RightAlt,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Modifier keys held while a key event fired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    /// Either shift key.
    pub shift: bool,
    /// Either control key.
    pub ctrl: bool,
    /// Either alt key.
    pub alt: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
}

/// A key went down or up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInputEvent {
    /// The key.
    pub key: Key,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
    /// `true` on press, `false` on release.
    pub pressed: bool,
}

impl KeyInputEvent {
    /// Key press without modifiers.
    #[must_use]
    pub const fn pressed(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            pressed: true,
        }
    }

    /// Key release without modifiers.
    #[must_use]
    pub const fn released(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            pressed: false,
        }
    }
}

impl Event for KeyInputEvent {}

/// Mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
}

/// A mouse button went down or up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseInputEvent {
    /// The button.
    pub button: MouseButton,
    /// Cursor x in window pixels.
    pub x: i32,
    /// Cursor y in window pixels.
    pub y: i32,
    /// `true` on press, `false` on release.
    pub pressed: bool,
}

impl Event for MouseInputEvent {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        for key in [Key::Up, Key::Space, Key::LeftCtrl, Key::RightAlt, Key::F5] {
            assert_eq!(Key::from_name(&key.name()), Some(key));
        }
        assert_eq!(Key::from_name("A"), Some(Key::Char('a')));
        assert_eq!(Key::Char('Q').name(), "q");
        assert_eq!(Key::from_name("left banana"), None);
    }
}
