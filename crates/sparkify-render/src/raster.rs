//! Scene → PNG or JPEG.
//!
//! Composites the backdrop fill, the stretched background image, and every
//! visible image node into one RGBA buffer at canvas resolution, then
//! encodes it. Text nodes need a font context and are not rasterized here.

use crate::scene::RenderNode;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use sparkify_core::error::ExportError;
use sparkify_core::id::AssetId;
use sparkify_core::model::CanvasConfig;
use sparkify_core::scene::{ExportFormat, NodeBody};
use std::collections::HashMap;
use std::io::Cursor;

pub fn rasterize(
    backdrop: &CanvasConfig,
    nodes: &[RenderNode],
    bitmaps: &HashMap<AssetId, RgbaImage>,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    let mut out = RgbaImage::from_pixel(
        backdrop.width,
        backdrop.height,
        Rgba(backdrop.background_color.to_rgba8()),
    );

    if let Some(bg) = &backdrop.background_image {
        match bitmaps.get(&bg.asset) {
            Some(pixels) => {
                let stretched =
                    imageops::resize(pixels, backdrop.width, backdrop.height, FilterType::Triangle);
                imageops::overlay(&mut out, &stretched, 0, 0);
            }
            None => log::warn!("background {} has no pixels, skipped", bg.source),
        }
    }

    for rn in nodes.iter().filter(|n| n.visible) {
        match &rn.node.body {
            NodeBody::Image {
                image,
                width,
                height,
                rotation,
                opacity,
            } => {
                let Some(pixels) = bitmaps.get(&image.asset) else {
                    log::warn!("node {} references missing asset {:?}", rn.node.id, image.asset);
                    continue;
                };
                if *rotation != 0.0 {
                    log::trace!("node {} rotation {rotation} ignored in raster export", rn.node.id);
                }
                let (w, h) = (width.round().max(1.0) as u32, height.round().max(1.0) as u32);
                let mut scaled = imageops::resize(pixels, w, h, FilterType::Triangle);
                apply_opacity(&mut scaled, *opacity);
                imageops::overlay(
                    &mut out,
                    &scaled,
                    rn.node.position.x.round() as i64,
                    rn.node.position.y.round() as i64,
                );
            }
            NodeBody::Text { content, .. } => {
                log::trace!("TEXT {} {:?} not rasterized", rn.node.id, content);
            }
        }
    }

    encode(out, format)
}

fn encode(out: RgbaImage, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let written = match format {
        ExportFormat::Png => out.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png),
        ExportFormat::Jpeg { quality } => {
            // JPEG has no alpha channel; the backdrop fill is opaque anyway.
            let rgb = DynamicImage::ImageRgba8(out).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)
        }
    };
    written.map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn apply_opacity(img: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity >= 1.0 {
        return;
    }
    for px in img.pixels_mut() {
        px.0[3] = (px.0[3] as f32 * opacity).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RetainedScene;
    use pretty_assertions::assert_eq;
    use sparkify_core::id::EntityId;
    use sparkify_core::model::{Color, EntityKind, Point};
    use sparkify_core::scene::{SceneNode, SceneProvider};

    fn decode(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory(bytes).unwrap().to_rgba8()
    }

    #[test]
    fn export_fills_backdrop() {
        let mut scene = RetainedScene::new();
        let mut canvas = CanvasConfig::new(4, 3);
        canvas.background_color = Color::from_hex("#FF0000").unwrap();
        scene.set_backdrop(&canvas);

        let png = scene.export_image(ExportFormat::Png).unwrap();
        let img = decode(&png);
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(2, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn export_composites_image_nodes() {
        let mut scene = RetainedScene::new();
        scene.set_backdrop(&CanvasConfig::new(10, 10));
        let handle = scene.register_bitmap(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 255])), "blue");
        scene.place_node(SceneNode {
            id: EntityId::intern("raster_blue"),
            kind: EntityKind::Image,
            position: Point::new(5.0, 5.0),
            body: NodeBody::Image {
                image: handle,
                width: 5.0,
                height: 5.0,
                rotation: 0.0,
                opacity: 1.0,
            },
        });

        let img = decode(&scene.export_image(ExportFormat::Png).unwrap());
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(7, 7), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn jpeg_export_drops_alpha() {
        let mut scene = RetainedScene::new();
        let mut canvas = CanvasConfig::new(16, 8);
        canvas.background_color = Color::from_hex("#0000FF").unwrap();
        scene.set_backdrop(&canvas);

        let bytes = scene.export_image(ExportFormat::Jpeg { quality: 90 }).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
        assert!(!img.color().has_alpha());
        let px = img.to_rgb8().get_pixel(8, 4).0;
        assert!(px[2] > 240 && px[0] < 15, "expected blue, got {px:?}");
    }

    #[test]
    fn hidden_nodes_are_not_exported() {
        let mut scene = RetainedScene::new();
        scene.set_backdrop(&CanvasConfig::new(2, 2));
        let handle = scene.register_bitmap(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])), "black");
        let id = EntityId::intern("raster_hidden");
        scene.place_node(SceneNode {
            id,
            kind: EntityKind::Image,
            position: Point::new(0.0, 0.0),
            body: NodeBody::Image {
                image: handle,
                width: 2.0,
                height: 2.0,
                rotation: 0.0,
                opacity: 1.0,
            },
        });
        scene.set_node_visible(id, false);

        let img = decode(&scene.export_image(ExportFormat::Png).unwrap());
        assert_eq!(img.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    }
}
