//! Editor state for the Sparkify meme canvas.
//!
//! The entity store is the source of truth; the scene provider only mirrors
//! it. All mutations go through [`MemeEditor`], which records undo history
//! and rebuilds the scene after each one.

pub mod assets;
pub mod edit;
pub mod editor;
pub mod history;
pub mod input;
pub mod selection;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use assets::{AssetLoader, LoadTarget, LoadTicket};
pub use edit::{EditKey, EditState, TextEditSession};
pub use editor::{DispatchOutcome, ExportedImage, MemeEditor};
pub use history::{History, HistorySnapshot};
pub use input::{CanvasEvent, Modifiers};
pub use selection::{AlignEdge, SelectionController};
pub use shortcuts::ShortcutMap;
pub use store::EntityStore;
pub use tools::{ToolbarAction, ToolbarItem, ToolbarSection};

/// Editor backed by the in-memory scene, used for tests and headless export.
pub type HeadlessEditor = MemeEditor<sparkify_render::RetainedScene>;
