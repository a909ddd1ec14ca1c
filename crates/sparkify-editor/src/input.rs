//! Canvas input events.
//!
//! The scene provider resolves pointer hits itself; by the time an event
//! reaches the editor it already names the node it landed on. Only
//! discrete gestures arrive here (click, double-click, drag-end,
//! transform-end, key); intermediate drag frames stay in the scene.

use sparkify_core::id::EntityId;
use sparkify_core::model::Point;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Click or tap. `target: None` means the empty backdrop was hit.
    Click { target: Option<EntityId> },

    /// Double click; on a text layer this starts inline editing.
    DoubleClick { target: Option<EntityId> },

    /// A drag finished with the node at `position` (canvas space).
    DragEnd { target: EntityId, position: Point },

    /// Transform handles released with the node's final box.
    TransformEnd {
        target: EntityId,
        position: Point,
        width: f32,
        height: f32,
    },

    Key { key: String, modifiers: Modifiers },
}

impl CanvasEvent {
    pub fn click(target: Option<EntityId>) -> Self {
        Self::Click { target }
    }

    pub fn drag_end(target: EntityId, x: f32, y: f32) -> Self {
        Self::DragEnd {
            target,
            position: Point::new(x, y),
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers,
        }
    }

    /// Node this event refers to, if any.
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Self::Click { target } | Self::DoubleClick { target } => *target,
            Self::DragEnd { target, .. } | Self::TransformEnd { target, .. } => Some(*target),
            Self::Key { .. } => None,
        }
    }
}
