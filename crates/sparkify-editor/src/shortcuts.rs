//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos onto toolbar actions, so a shortcut and the
//! matching button always do the same thing. Not consulted while a text
//! layer is being edited; those keys belong to the edit session.

use crate::input::Modifiers;
use crate::tools::ToolbarAction;

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, mods: Modifiers) -> Option<ToolbarAction> {
        if mods.command() && mods.shift {
            return match key {
                "z" | "Z" => Some(ToolbarAction::Redo),
                _ => None,
            };
        }

        if mods.command() {
            return match key {
                "z" | "Z" => Some(ToolbarAction::Undo),
                "y" | "Y" => Some(ToolbarAction::Redo),
                "d" | "D" => Some(ToolbarAction::Duplicate),
                "s" | "S" => Some(ToolbarAction::Download),
                "]" => Some(ToolbarAction::BringToFront),
                "[" => Some(ToolbarAction::SendToBack),
                _ => None,
            };
        }

        if mods.shift || mods.alt {
            return None;
        }

        match key {
            "t" | "T" => Some(ToolbarAction::AddText),
            "Delete" | "Backspace" => Some(ToolbarAction::Delete),
            "Escape" => Some(ToolbarAction::Deselect),
            _ => None,
        }
    }
}
