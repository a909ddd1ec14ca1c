//! Headless retained scene.
//!
//! Keeps placed nodes in paint order, the transform overlay binding, and a
//! registry of decoded bitmaps keyed by [`AssetId`]. Used by native hosts
//! and tests; the browser bridge has its own Canvas2D provider.

use crate::decode::decode_image;
use crate::hit::{hit_test, node_transform, to_rect};
use crate::raster::rasterize;
use image::RgbaImage;
use kurbo::{Affine, Rect};
use smallvec::SmallVec;
use sparkify_core::error::{AssetError, ExportError};
use sparkify_core::id::{AssetId, EntityId};
use sparkify_core::model::{Bounds, CanvasConfig, ImageHandle, TextLayer};
use sparkify_core::scene::{ExportFormat, NodeBody, SceneNode, SceneProvider};
use std::collections::HashMap;

/// A node as the scene holds it.
#[derive(Debug, Clone)]
pub struct RenderNode {
    pub node: SceneNode,
    pub visible: bool,
}

impl RenderNode {
    /// Unrotated size, origin at the node position.
    pub fn size(&self) -> (f32, f32) {
        match &self.node.body {
            NodeBody::Image { width, height, .. } => (*width, *height),
            NodeBody::Text { content, style } => {
                let estimate = TextLayer {
                    id: self.node.id,
                    content: content.clone(),
                    position: self.node.position,
                    style: style.clone(),
                }
                .estimated_bounds();
                (estimate.width, estimate.height)
            }
        }
    }

    pub fn rotation(&self) -> f32 {
        match &self.node.body {
            NodeBody::Image { rotation, .. } => *rotation,
            NodeBody::Text { .. } => 0.0,
        }
    }

    pub(crate) fn local_rect(&self) -> Rect {
        let (width, height) = self.size();
        to_rect(Bounds {
            x: 0.0,
            y: 0.0,
            width,
            height,
        })
    }

    pub(crate) fn transform(&self) -> Affine {
        node_transform(self.node.position.x, self.node.position.y, self.rotation())
    }
}

pub struct RetainedScene {
    backdrop: CanvasConfig,
    nodes: Vec<RenderNode>,
    overlay: SmallVec<[EntityId; 1]>,
    bitmaps: HashMap<AssetId, RgbaImage>,
    zoom: f32,
}

impl Default for RetainedScene {
    fn default() -> Self {
        Self::new()
    }
}

impl RetainedScene {
    pub fn new() -> Self {
        Self {
            backdrop: CanvasConfig::default(),
            nodes: Vec::new(),
            overlay: SmallVec::new(),
            bitmaps: HashMap::new(),
            zoom: 1.0,
        }
    }

    /// Decode encoded image bytes and keep the pixels for export.
    pub fn register_bytes(&mut self, bytes: &[u8], source: &str) -> Result<ImageHandle, AssetError> {
        let (handle, pixels) = decode_image(bytes, source)?;
        self.bitmaps.insert(handle.asset, pixels);
        Ok(handle)
    }

    /// Keep already-decoded pixels.
    pub fn register_bitmap(&mut self, pixels: RgbaImage, source: &str) -> ImageHandle {
        let handle = ImageHandle {
            asset: AssetId::next(),
            source: source.to_string(),
            width: pixels.width(),
            height: pixels.height(),
        };
        self.bitmaps.insert(handle.asset, pixels);
        handle
    }

    pub fn bitmap(&self, asset: AssetId) -> Option<&RgbaImage> {
        self.bitmaps.get(&asset)
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn node(&self, id: EntityId) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.node.id == id)
    }

    /// Ids in paint order, back to front.
    pub fn paint_order(&self) -> Vec<EntityId> {
        self.nodes.iter().map(|n| n.node.id).collect()
    }

    /// Nodes the transform handles are bound to.
    pub fn overlay(&self) -> &[EntityId] {
        &self.overlay
    }

    pub fn backdrop(&self) -> &CanvasConfig {
        &self.backdrop
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }
}

impl SceneProvider for RetainedScene {
    type Node = EntityId;

    fn set_backdrop(&mut self, canvas: &CanvasConfig) {
        log::trace!("SCENE backdrop {}x{}", canvas.width, canvas.height);
        self.backdrop = canvas.clone();
    }

    fn place_node(&mut self, node: SceneNode) {
        log::trace!("SCENE place {} at ({}, {})", node.id, node.position.x, node.position.y);
        self.nodes.retain(|n| n.node.id != node.id);
        self.nodes.push(RenderNode {
            node,
            visible: true,
        });
    }

    fn remove_node(&mut self, id: EntityId) {
        self.nodes.retain(|n| n.node.id != id);
        self.overlay.retain(|bound| *bound != id);
    }

    fn clear_nodes(&mut self) {
        self.nodes.clear();
        self.overlay.clear();
    }

    fn find_node(&self, id: EntityId) -> Option<EntityId> {
        self.node(id).map(|n| n.node.id)
    }

    fn bind_transform(&mut self, nodes: &[EntityId]) {
        self.overlay = nodes.iter().copied().collect();
    }

    fn set_node_visible(&mut self, id: EntityId, visible: bool) {
        if let Some(n) = self.nodes.iter_mut().find(|n| n.node.id == id) {
            n.visible = visible;
        }
    }

    fn set_zoom(&mut self, scale: f32) {
        self.zoom = scale;
    }

    fn hit_test(&self, x: f32, y: f32) -> Option<EntityId> {
        hit_test(&self.nodes, x, y)
    }

    fn export_image(&mut self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        rasterize(&self.backdrop, &self.nodes, &self.bitmaps, format)
    }
}
