//! Toolbar actions.
//!
//! A closed set of actions the toolbar, shortcuts, and the browser bridge
//! dispatch through [`MemeEditor::dispatch`](crate::editor::MemeEditor::dispatch).
//! String names match the toolbar button ids.
//!
//! | Section | Actions |
//! |---------|---------|
//! | History | undo, redo |
//! | Add Content | add-text, add-image |
//! | Align | align-left, align-center, align-right, center-canvas |
//! | Arrange | duplicate, bring-to-front, send-to-back |
//! | Actions | delete, download, reset |

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    Undo,
    Redo,
    AddText,
    /// Opens the host's file picker; the upload itself arrives as a load ticket.
    AddImage,
    AlignLeft,
    AlignCenter,
    AlignRight,
    /// Center on both axes.
    CenterOnCanvas,
    Duplicate,
    BringToFront,
    SendToBack,
    Delete,
    Download,
    Reset,
    /// Shortcut only: drop the selection.
    Deselect,
}

impl ToolbarAction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::AddText => "add-text",
            Self::AddImage => "add-image",
            Self::AlignLeft => "align-left",
            Self::AlignCenter => "align-center",
            Self::AlignRight => "align-right",
            Self::CenterOnCanvas => "center-canvas",
            Self::Duplicate => "duplicate",
            Self::BringToFront => "bring-to-front",
            Self::SendToBack => "send-to-back",
            Self::Delete => "delete",
            Self::Download => "download",
            Self::Reset => "reset",
            Self::Deselect => "deselect",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "add-text" => Self::AddText,
            "add-image" => Self::AddImage,
            "align-left" => Self::AlignLeft,
            "align-center" => Self::AlignCenter,
            "align-right" => Self::AlignRight,
            "center-canvas" => Self::CenterOnCanvas,
            "duplicate" => Self::Duplicate,
            "bring-to-front" => Self::BringToFront,
            "send-to-back" => Self::SendToBack,
            "delete" => Self::Delete,
            "download" => Self::Download,
            "reset" => Self::Reset,
            "deselect" => Self::Deselect,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::AddText => "Add Text",
            Self::AddImage => "Add Image",
            Self::AlignLeft => "Align Left",
            Self::AlignCenter => "Align Center",
            Self::AlignRight => "Align Right",
            Self::CenterOnCanvas => "Center on Canvas",
            Self::Duplicate => "Duplicate",
            Self::BringToFront => "Bring to Front",
            Self::SendToBack => "Send to Back",
            Self::Delete => "Delete",
            Self::Download => "Download",
            Self::Reset => "Reset",
            Self::Deselect => "Deselect",
        }
    }

    /// Whether the action only makes sense with an active layer.
    pub fn needs_selection(self) -> bool {
        matches!(
            self,
            Self::AlignLeft
                | Self::AlignCenter
                | Self::AlignRight
                | Self::CenterOnCanvas
                | Self::Duplicate
                | Self::BringToFront
                | Self::SendToBack
                | Self::Delete
                | Self::Deselect
        )
    }
}

/// Toolbar sections in display order.
pub const TOOLBAR_LAYOUT: &[(&str, &[ToolbarAction])] = &[
    ("History", &[ToolbarAction::Undo, ToolbarAction::Redo]),
    ("Add Content", &[ToolbarAction::AddText, ToolbarAction::AddImage]),
    (
        "Align",
        &[
            ToolbarAction::AlignLeft,
            ToolbarAction::AlignCenter,
            ToolbarAction::AlignRight,
            ToolbarAction::CenterOnCanvas,
        ],
    ),
    (
        "Arrange",
        &[
            ToolbarAction::Duplicate,
            ToolbarAction::BringToFront,
            ToolbarAction::SendToBack,
        ],
    ),
    (
        "Actions",
        &[ToolbarAction::Delete, ToolbarAction::Download, ToolbarAction::Reset],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolbarItem {
    pub id: &'static str,
    pub label: &'static str,
    pub enabled: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolbarSection {
    pub title: &'static str,
    pub tools: Vec<ToolbarItem>,
}
