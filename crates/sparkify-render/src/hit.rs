//! Hit testing: point → node lookup.
//!
//! Walks placed nodes in reverse paint order (front-to-back) and returns the
//! first one whose local bounds contain the point. Rotation is applied
//! around the node's origin, matching how the node is drawn.

use crate::scene::RenderNode;
use kurbo::{Affine, Point, Rect};
use sparkify_core::id::EntityId;
use sparkify_core::model::Bounds;

/// Find the topmost visible node at canvas position (px, py).
/// Returns `None` if only the backdrop is hit.
pub fn hit_test(nodes: &[RenderNode], px: f32, py: f32) -> Option<EntityId> {
    let point = Point::new(px as f64, py as f64);
    nodes
        .iter()
        .rev()
        .filter(|n| n.visible)
        .find(|n| contains(n, point))
        .map(|n| n.node.id)
}

fn contains(node: &RenderNode, point: Point) -> bool {
    let local = node.transform().inverse() * point;
    node.local_rect().contains(local)
}

pub(crate) fn to_rect(b: Bounds) -> Rect {
    Rect::new(
        b.x as f64,
        b.y as f64,
        (b.x + b.width) as f64,
        (b.y + b.height) as f64,
    )
}

pub(crate) fn node_transform(x: f32, y: f32, rotation_deg: f32) -> Affine {
    Affine::translate((x as f64, y as f64)) * Affine::rotate((rotation_deg as f64).to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RetainedScene;
    use image::RgbaImage;
    use sparkify_core::model::{EntityKind, Point as CanvasPoint, TextStyle};
    use sparkify_core::scene::{NodeBody, SceneNode, SceneProvider};

    fn image_node(scene: &mut RetainedScene, name: &str, x: f32, y: f32, rotation: f32) -> EntityId {
        let handle = scene.register_bitmap(RgbaImage::new(10, 10), name);
        let id = EntityId::intern(name);
        scene.place_node(SceneNode {
            id,
            kind: EntityKind::Image,
            position: CanvasPoint::new(x, y),
            body: NodeBody::Image {
                image: handle,
                width: 100.0,
                height: 50.0,
                rotation,
                opacity: 1.0,
            },
        });
        id
    }

    #[test]
    fn topmost_node_wins() {
        let mut scene = RetainedScene::new();
        let below = image_node(&mut scene, "hit_below", 0.0, 0.0, 0.0);
        let above = image_node(&mut scene, "hit_above", 50.0, 0.0, 0.0);

        assert_eq!(hit_test(scene.nodes(), 10.0, 10.0), Some(below));
        assert_eq!(hit_test(scene.nodes(), 60.0, 10.0), Some(above));
        assert_eq!(hit_test(scene.nodes(), 400.0, 300.0), None);
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let mut scene = RetainedScene::new();
        let id = image_node(&mut scene, "hit_hidden", 0.0, 0.0, 0.0);
        scene.set_node_visible(id, false);
        assert_eq!(hit_test(scene.nodes(), 10.0, 10.0), None);
    }

    #[test]
    fn rotation_moves_hit_area() {
        let mut scene = RetainedScene::new();
        let id = image_node(&mut scene, "hit_rotated", 100.0, 100.0, 90.0);
        // Rotated 90° clockwise around (100, 100): the 100×50 box now spans
        // x ∈ [50, 100], y ∈ [100, 200].
        assert_eq!(hit_test(scene.nodes(), 75.0, 150.0), Some(id));
        assert_eq!(hit_test(scene.nodes(), 150.0, 120.0), None);
    }

    #[test]
    fn text_uses_estimated_bounds() {
        let mut scene = RetainedScene::new();
        let id = EntityId::intern("hit_text");
        scene.place_node(SceneNode {
            id,
            kind: EntityKind::Text,
            position: CanvasPoint::new(0.0, 0.0),
            body: NodeBody::Text {
                content: "Hello".to_string(),
                style: TextStyle::default(),
            },
        });
        assert_eq!(hit_test(scene.nodes(), 5.0, 5.0), Some(id));
        assert_eq!(hit_test(scene.nodes(), 5.0, 40.0), None);
    }
}
