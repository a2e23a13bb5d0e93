//! Pointer, touch and keyboard input
//!
//! The presentation layer translates raw DOM/OS events into [`InputEvent`]s.
//! Touch is single-point (first touch only) and its default scrolling must
//! be suppressed where the event originates.

use serde::{Deserialize, Serialize};

/// A raw input event, coordinates in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown,
    PointerMove { x: f32 },
    PointerUp,
    TouchStart,
    TouchMove { x: f32 },
    TouchEnd,
}

impl InputEvent {
    /// New dragging state this event implies, if any
    pub fn dragging(&self) -> Option<bool> {
        match self {
            InputEvent::PointerDown | InputEvent::TouchStart => Some(true),
            InputEvent::PointerUp | InputEvent::TouchEnd => Some(false),
            InputEvent::PointerMove { .. } | InputEvent::TouchMove { .. } => None,
        }
    }

    /// Requested paddle position, if this is a move
    pub fn position(&self) -> Option<f32> {
        match self {
            InputEvent::PointerMove { x } | InputEvent::TouchMove { x } => Some(*x),
            _ => None,
        }
    }

    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            InputEvent::TouchStart | InputEvent::TouchMove { .. } | InputEvent::TouchEnd
        )
    }

    /// Whether the source event's default action (scrolling) must be cancelled
    pub fn suppresses_default(&self) -> bool {
        self.is_touch()
    }
}

/// Keyboard shortcuts understood by the front-ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Start the round from the title screen
    Start,
    /// Toggle the demo autopilot
    ToggleAutopilot,
}

/// Map a DOM `KeyboardEvent.key` value to an action
pub fn key_action(key: &str) -> Option<KeyAction> {
    match key {
        " " | "Enter" => Some(KeyAction::Start),
        "i" | "I" => Some(KeyAction::ToggleAutopilot),
        _ => None,
    }
}
