//! Pointer input events.
//!
//! Positions are normalized device coordinates of the 3D viewport:
//! x and y in -1..1, +y up. The host converts from window pixels.

use serde::{Deserialize, Serialize};

/// Pointer events forwarded from the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { button: MouseButton, x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { button: MouseButton, x: f32, y: f32 },
    /// Pointer left the interactive region entirely
    Leave,
    /// Window lost focus
    Blur,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl PointerEvent {
    /// Whether this event must end any in-progress drag.
    ///
    /// Releasing any button ends a drag, as does leaving the viewport or
    /// losing focus.
    pub fn ends_drag(&self) -> bool {
        matches!(self, Self::Up { .. } | Self::Leave | Self::Blur)
    }
}
