//! Boundary to the retained-mode scene graph that draws the canvas.
//!
//! The editor never draws. It pushes derived [`SceneNode`]s into a
//! [`SceneProvider`], binds the provider's transform handles to at most one
//! node, and asks it for hit tests and a rasterized export. Nodes are a
//! mirror of the entity store and are rebuilt from it freely.

use crate::error::ExportError;
use crate::id::EntityId;
use crate::model::{CanvasConfig, EntityKind, ImageHandle, Point, TextStyle};
use serde::{Deserialize, Serialize};

/// Encoding of an exported canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    /// Lossy, no alpha. `quality` is a percentage, 1..=100.
    Jpeg { quality: u8 },
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    /// File name suffixes accepted for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ExportFormat::Png => &[".png"],
            ExportFormat::Jpeg { .. } => &[".jpg", ".jpeg"],
        }
    }

    pub fn matches_file_name(self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.extensions().iter().any(|ext| lower.ends_with(ext))
    }
}

/// Drawable content of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Image {
        image: ImageHandle,
        width: f32,
        height: f32,
        rotation: f32,
        opacity: f32,
    },
    Text {
        content: String,
        style: TextStyle,
    },
}

/// One draggable node placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Point,
    pub body: NodeBody,
}

pub trait SceneProvider {
    /// Provider-side node reference, as returned by [`find_node`](Self::find_node).
    type Node: Clone;

    /// Draw the canvas background: fill color, optional stretched image,
    /// and the canvas dimensions.
    fn set_backdrop(&mut self, canvas: &CanvasConfig);

    /// Place a node on top of the existing ones, replacing any node with
    /// the same id.
    fn place_node(&mut self, node: SceneNode);

    fn remove_node(&mut self, id: EntityId);

    /// Drop every node. The backdrop is kept.
    fn clear_nodes(&mut self);

    fn find_node(&self, id: EntityId) -> Option<Self::Node>;

    /// Bind the transform-handle overlay to exactly `nodes`. An empty slice
    /// hides the overlay.
    fn bind_transform(&mut self, nodes: &[Self::Node]);

    fn set_node_visible(&mut self, id: EntityId, visible: bool);

    /// Display scale, `1.0` = 100%. Node coordinates stay in canvas space.
    fn set_zoom(&mut self, scale: f32);

    /// Topmost listening node at a canvas-space point. `None` means the
    /// background was hit.
    fn hit_test(&self, x: f32, y: f32) -> Option<EntityId>;

    /// Rasterize the current scene and encode it as `format`.
    fn export_image(&mut self, format: ExportFormat) -> Result<Vec<u8>, ExportError>;
}
