//! Canvas2D scene provider.
//!
//! Keeps the node mirror pushed by the editor and paints it to an HTML
//! `<canvas>` on [`CanvasScene::paint`]. Decoded `<img>` elements are kept
//! in a registry keyed by [`AssetId`]; layers only carry the handle.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sparkify_core::error::ExportError;
use sparkify_core::id::{AssetId, EntityId};
use sparkify_core::model::{CanvasConfig, ImageHandle, Point, TextStyle};
use sparkify_core::scene::{ExportFormat, NodeBody, SceneNode, SceneProvider};
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

const HANDLE_SIZE: f64 = 8.0;
const OVERLAY_COLOR: &str = "#0096FF";

struct PlacedNode {
    node: SceneNode,
    visible: bool,
}

pub struct CanvasScene {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    backdrop: CanvasConfig,
    nodes: Vec<PlacedNode>,
    overlay: Vec<EntityId>,
    images: HashMap<AssetId, HtmlImageElement>,
    zoom: f32,
    dirty: bool,
}

impl CanvasScene {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self {
            canvas,
            ctx,
            backdrop: CanvasConfig::default(),
            nodes: Vec::new(),
            overlay: Vec::new(),
            images: HashMap::new(),
            zoom: 1.0,
            dirty: true,
        }
    }

    /// Keep a loaded `<img>` for drawing and hand back its handle.
    pub fn register_image(&mut self, img: HtmlImageElement, source: &str) -> ImageHandle {
        let handle = ImageHandle {
            asset: AssetId::next(),
            source: source.to_string(),
            width: img.natural_width(),
            height: img.natural_height(),
        };
        self.images.insert(handle.asset, img);
        handle
    }

    /// Show a node at `position` while a drag is in progress. The store is
    /// only told on drag-end; the next rebuild overwrites this.
    pub fn preview_position(&mut self, id: EntityId, position: Point) {
        if let Some(p) = self.nodes.iter_mut().find(|p| p.node.id == id) {
            p.node.position = position;
            self.dirty = true;
        }
    }

    /// Show a node with a new box while its resize handle is dragged.
    pub fn preview_size(&mut self, id: EntityId, w: f32, h: f32) {
        if let Some(p) = self.nodes.iter_mut().find(|p| p.node.id == id)
            && let NodeBody::Image { width, height, .. } = &mut p.node.body
        {
            *width = w;
            *height = h;
            self.dirty = true;
        }
    }

    /// Canvas-space box of a node.
    pub fn node_box(&self, id: EntityId) -> Option<(Point, f32, f32)> {
        let placed = self.nodes.iter().find(|p| p.node.id == id)?;
        let (w, h) = self.node_size(&placed.node);
        Some((placed.node.position, w, h))
    }

    /// Node whose resize handle (bottom-right corner) is under the point.
    pub fn handle_at(&self, x: f32, y: f32) -> Option<EntityId> {
        let id = *self.overlay.first()?;
        let (pos, w, h) = self.node_box(id)?;
        let half = (HANDLE_SIZE / 2.0) as f32 / self.zoom;
        let (hx, hy) = (pos.x + w, pos.y + h);
        ((x - hx).abs() <= half && (y - hy).abs() <= half).then_some(id)
    }

    /// Repaint if anything changed since the last paint.
    pub fn paint(&mut self) {
        if !self.dirty {
            return;
        }
        self.draw(true);
        self.dirty = false;
    }

    fn draw(&self, with_overlay: bool) {
        let ctx = &self.ctx;
        let zoom = self.zoom as f64;
        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
        let _ = ctx.scale(zoom, zoom);

        let (w, h) = (self.backdrop.width as f64, self.backdrop.height as f64);
        ctx.set_fill_style_str(&self.backdrop.background_color.to_hex());
        ctx.fill_rect(0.0, 0.0, w, h);
        if let Some(bg) = &self.backdrop.background_image
            && let Some(img) = self.images.get(&bg.asset)
        {
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, w, h);
        }

        for placed in self.nodes.iter().filter(|p| p.visible) {
            let node = &placed.node;
            match &node.body {
                NodeBody::Image {
                    image,
                    width,
                    height,
                    rotation,
                    opacity,
                } => {
                    let Some(img) = self.images.get(&image.asset) else {
                        log::warn!("canvas: node {} references unloaded {}", node.id, image.source);
                        continue;
                    };
                    ctx.save();
                    let _ = ctx.translate(node.position.x as f64, node.position.y as f64);
                    let _ = ctx.rotate((*rotation as f64).to_radians());
                    ctx.set_global_alpha(*opacity as f64);
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img,
                        0.0,
                        0.0,
                        *width as f64,
                        *height as f64,
                    );
                    ctx.restore();
                }
                NodeBody::Text { content, style } => draw_text(ctx, node.position, content, style),
            }
        }

        if with_overlay {
            for id in &self.overlay {
                if let Some((pos, w, h)) = self.node_box(*id) {
                    draw_overlay(ctx, pos, w as f64, h as f64, zoom);
                }
            }
        }
    }

    fn node_size(&self, node: &SceneNode) -> (f32, f32) {
        match &node.body {
            NodeBody::Image { width, height, .. } => (*width, *height),
            NodeBody::Text { content, style } => {
                self.ctx.set_font(&font_spec(style));
                let width = content
                    .lines()
                    .map(|line| match self.ctx.measure_text(line) {
                        Ok(metrics) => metrics.width() as f32,
                        Err(_) => estimate_width(line, style.font_size),
                    })
                    .fold(0.0_f32, f32::max);
                (width, text_height(content, style.font_size))
            }
        }
    }
}

impl SceneProvider for CanvasScene {
    type Node = EntityId;

    fn set_backdrop(&mut self, canvas: &CanvasConfig) {
        if self.backdrop.width != canvas.width || self.backdrop.height != canvas.height {
            self.resize_element(canvas.width, canvas.height);
        }
        self.backdrop = canvas.clone();
        self.dirty = true;
    }

    fn place_node(&mut self, node: SceneNode) {
        self.nodes.retain(|p| p.node.id != node.id);
        self.nodes.push(PlacedNode {
            node,
            visible: true,
        });
        self.dirty = true;
    }

    fn remove_node(&mut self, id: EntityId) {
        self.nodes.retain(|p| p.node.id != id);
        self.overlay.retain(|bound| *bound != id);
        self.dirty = true;
    }

    fn clear_nodes(&mut self) {
        self.nodes.clear();
        self.overlay.clear();
        self.dirty = true;
    }

    fn find_node(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.iter().find(|p| p.node.id == id).map(|p| p.node.id)
    }

    fn bind_transform(&mut self, nodes: &[EntityId]) {
        self.overlay = nodes.to_vec();
        self.dirty = true;
    }

    fn set_node_visible(&mut self, id: EntityId, visible: bool) {
        if let Some(p) = self.nodes.iter_mut().find(|p| p.node.id == id) {
            p.visible = visible;
            self.dirty = true;
        }
    }

    fn set_zoom(&mut self, scale: f32) {
        self.zoom = scale;
        self.resize_element(self.backdrop.width, self.backdrop.height);
        self.dirty = true;
    }

    fn hit_test(&self, x: f32, y: f32) -> Option<EntityId> {
        self.nodes
            .iter()
            .rev()
            .filter(|p| p.visible)
            .find(|p| {
                let (w, h) = self.node_size(&p.node);
                let pos = p.node.position;
                x >= pos.x && x <= pos.x + w && y >= pos.y && y <= pos.y + h
            })
            .map(|p| p.node.id)
    }

    fn export_image(&mut self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let zoom = self.zoom;
        if zoom != 1.0 {
            self.zoom = 1.0;
            self.resize_element(self.backdrop.width, self.backdrop.height);
        }
        self.draw(false);
        let url = match format {
            ExportFormat::Png => self.canvas.to_data_url_with_type(format.mime_type()),
            ExportFormat::Jpeg { quality } => self.canvas.to_data_url_with_type_and_encoder_options(
                format.mime_type(),
                &JsValue::from_f64(f64::from(quality.clamp(1, 100)) / 100.0),
            ),
        };
        if zoom != 1.0 {
            self.zoom = zoom;
            self.resize_element(self.backdrop.width, self.backdrop.height);
        }
        self.dirty = true;

        let url = url.map_err(|e| ExportError::Encode(js_error(&e)))?;
        decode_data_url(&url, format)
    }
}

impl CanvasScene {
    fn resize_element(&self, width: u32, height: u32) {
        self.canvas.set_width((width as f32 * self.zoom).round() as u32);
        self.canvas.set_height((height as f32 * self.zoom).round() as u32);
    }
}

fn draw_text(ctx: &CanvasRenderingContext2d, pos: Point, content: &str, style: &TextStyle) {
    ctx.set_font(&font_spec(style));
    ctx.set_text_baseline("top");
    ctx.set_fill_style_str(&style.fill.to_hex());
    ctx.set_stroke_style_str(&style.stroke.to_hex());
    ctx.set_line_width(style.stroke_width as f64);
    for (i, line) in content.lines().enumerate() {
        let y = pos.y as f64 + i as f64 * style.font_size as f64;
        let _ = ctx.fill_text(line, pos.x as f64, y);
        if style.stroke_width > 0.0 {
            let _ = ctx.stroke_text(line, pos.x as f64, y);
        }
    }
}

fn draw_overlay(ctx: &CanvasRenderingContext2d, pos: Point, w: f64, h: f64, zoom: f64) {
    let (x, y) = (pos.x as f64, pos.y as f64);
    ctx.set_stroke_style_str(OVERLAY_COLOR);
    ctx.set_line_width(1.0 / zoom);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(4.0 / zoom),
        &JsValue::from_f64(4.0 / zoom),
    ));
    ctx.stroke_rect(x, y, w, h);
    let _ = ctx.set_line_dash(&js_sys::Array::new());

    let size = HANDLE_SIZE / zoom;
    ctx.set_fill_style_str("#FFFFFF");
    for (cx, cy) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
        ctx.fill_rect(cx - size / 2.0, cy - size / 2.0, size, size);
        ctx.stroke_rect(cx - size / 2.0, cy - size / 2.0, size, size);
    }
}

fn font_spec(style: &TextStyle) -> String {
    let weight = if style.bold { "bold" } else { "normal" };
    format!("{weight} {}px {}", style.font_size, style.font_family)
}

fn estimate_width(line: &str, font_size: f32) -> f32 {
    line.chars().count() as f32 * font_size * 0.6
}

fn text_height(content: &str, font_size: f32) -> f32 {
    content.lines().count().max(1) as f32 * font_size
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn data_url_prefix(format: ExportFormat) -> String {
    format!("data:{};base64,", format.mime_type())
}

/// Bytes of a `data:image/...;base64,` URL of the expected format.
pub(crate) fn decode_data_url(url: &str, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let payload = url
        .strip_prefix(&data_url_prefix(format))
        .ok_or(ExportError::NoSurface)?;
    STANDARD
        .decode(payload)
        .map_err(|e| ExportError::Encode(e.to_string()))
}

/// `data:` URL for exported bytes, for download links.
pub(crate) fn encode_data_url(bytes: &[u8], format: ExportFormat) -> String {
    format!("{}{}", data_url_prefix(format), STANDARD.encode(bytes))
}
