//! Selection & transform handles.
//!
//! The active id itself lives in the [`EntityStore`] (it is part of every
//! snapshot). This controller reacts to changes of that id: it binds the
//! scene's transform overlay to the matching node, and it computes the
//! deterministic left/center/right alignment of the active layer.

use crate::store::EntityStore;
use smallvec::SmallVec;
use sparkify_core::config::AlignConfig;
use sparkify_core::id::EntityId;
use sparkify_core::model::Point;
use sparkify_core::scene::SceneProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignEdge {
    Left,
    Center,
    Right,
}

impl AlignEdge {
    /// Target x for a layer of `width` on a canvas of `canvas_width`.
    pub fn target_x(self, canvas_width: f32, width: f32, margin: f32) -> f32 {
        match self {
            AlignEdge::Left => margin,
            AlignEdge::Center => (canvas_width - width) / 2.0,
            AlignEdge::Right => canvas_width - width - margin,
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionController {
    /// Id the overlay was last bound for. `None` = overlay hidden.
    bound: Option<EntityId>,
    /// Force the next sync even if the id did not change (the scene was
    /// rebuilt and old node references are gone).
    stale: bool,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, store: &mut EntityStore, id: Option<EntityId>) {
        store.set_selection(id);
    }

    pub fn deselect(&self, store: &mut EntityStore) {
        self.select(store, None);
    }

    /// Mark the binding as outdated, e.g. after the scene was rebuilt.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn bound(&self) -> Option<EntityId> {
        self.bound
    }

    /// Rebind the transform overlay if the active id changed. Binds the
    /// empty set when nothing is selected or the node is not in the scene.
    /// Returns `true` if the overlay was rebound.
    pub fn sync_handles<S: SceneProvider>(&mut self, store: &EntityStore, scene: &mut S) -> bool {
        let active = store.selection();
        if active == self.bound && !self.stale {
            return false;
        }
        let nodes: SmallVec<[S::Node; 1]> = active.and_then(|id| scene.find_node(id)).into_iter().collect();
        if nodes.is_empty()
            && let Some(id) = active
        {
            log::debug!("selection: no scene node for {id}, hiding handles");
        }
        scene.bind_transform(&nodes);
        self.bound = active;
        self.stale = false;
        true
    }

    /// Move the active layer to the given edge. Text width is assumed, not
    /// measured. Returns `false` when nothing is selected or nothing moved.
    pub fn align_active(&self, store: &mut EntityStore, edge: AlignEdge, align: &AlignConfig) -> bool {
        let Some(id) = store.selection() else {
            return false;
        };
        let Some(bounds) = store.bounds_of(id, align.assumed_text_width) else {
            return false;
        };
        let canvas_width = store.canvas().width as f32;
        let x = edge.target_x(canvas_width, bounds.width, align.margin);
        store.move_entity(id, Point::new(x, bounds.y))
    }

    /// Center the active layer on both axes, ignoring the margin.
    pub fn center_active(&self, store: &mut EntityStore, align: &AlignConfig) -> bool {
        let Some(id) = store.selection() else {
            return false;
        };
        let Some(bounds) = store.bounds_of(id, align.assumed_text_width) else {
            return false;
        };
        let canvas = store.canvas();
        let x = AlignEdge::Center.target_x(canvas.width as f32, bounds.width, 0.0);
        let y = (canvas.height as f32 - bounds.height) / 2.0;
        store.move_entity(id, Point::new(x, y))
    }
}
