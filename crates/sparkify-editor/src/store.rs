//! Entity store: the single source of truth for everything on the canvas.
//!
//! Owns text layers, image layers, the character slot, the canvas config
//! (including the background image), the active selection, and which
//! catalog entries are picked. Unknown ids are ignored everywhere; the
//! `bool`/`Option` returns only report whether anything changed.

use crate::history::HistorySnapshot;
use sparkify_core::id::EntityId;
use sparkify_core::model::*;

#[derive(Debug, Clone)]
pub struct EntityStore {
    canvas: CanvasConfig,
    texts: Vec<TextLayer>,
    images: Vec<ImageLayer>,
    character: CharacterSlot,
    /// Configured sprite edge length. `clear` rebuilds the slot from it.
    character_size: f32,
    selection: Option<EntityId>,
    selected_template: Option<String>,
    selected_character: Option<String>,
}

impl EntityStore {
    pub fn new(canvas: CanvasConfig, character_size: f32) -> Self {
        let character = default_character(&canvas, character_size);
        Self {
            canvas,
            texts: Vec::new(),
            images: Vec::new(),
            character,
            character_size,
            selection: None,
            selected_template: None,
            selected_character: None,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn texts(&self) -> &[TextLayer] {
        &self.texts
    }

    pub fn images(&self) -> &[ImageLayer] {
        &self.images
    }

    pub fn character(&self) -> &CharacterSlot {
        &self.character
    }

    pub fn text(&self, id: EntityId) -> Option<&TextLayer> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn image(&self, id: EntityId) -> Option<&ImageLayer> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn selection(&self) -> Option<EntityId> {
        self.selection
    }

    pub fn selected_template(&self) -> Option<&str> {
        self.selected_template.as_deref()
    }

    pub fn selected_character(&self) -> Option<&str> {
        self.selected_character.as_deref()
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        if self.text(id).is_some() {
            Some(EntityKind::Text)
        } else if self.image(id).is_some() {
            Some(EntityKind::Image)
        } else if id == EntityId::character() && self.character.is_placed() {
            Some(EntityKind::Character)
        } else {
            None
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.kind_of(id).is_some()
    }

    /// Bounds used for alignment. Text has no measured width, so
    /// `text_width` stands in for it.
    pub fn bounds_of(&self, id: EntityId, text_width: f32) -> Option<Bounds> {
        match self.kind_of(id)? {
            EntityKind::Text => self.text(id).map(|t| Bounds {
                x: t.position.x,
                y: t.position.y,
                width: text_width,
                height: t.style.font_size,
            }),
            EntityKind::Image => self.image(id).map(ImageLayer::bounds),
            EntityKind::Character => Some(self.character.bounds()),
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Set the active id. No existence check; pass known ids or `None`.
    pub fn set_selection(&mut self, id: Option<EntityId>) {
        self.selection = id;
    }

    // ─── Text ────────────────────────────────────────────────────────────

    /// Append a text layer and make it the active selection.
    pub fn add_text(&mut self, initial_text: &str, position: Point, style: TextStyle) -> EntityId {
        let id = EntityId::with_prefix(EntityKind::Text.id_prefix());
        self.texts.push(TextLayer {
            id,
            content: initial_text.to_string(),
            position,
            style,
        });
        self.selection = Some(id);
        id
    }

    pub fn update_text(&mut self, id: EntityId, content: &str) -> bool {
        match self.texts.iter_mut().find(|t| t.id == id) {
            Some(t) if t.content != content => {
                t.content = content.to_string();
                true
            }
            _ => false,
        }
    }

    // ─── Images ──────────────────────────────────────────────────────────

    /// Append an image layer and make it the active selection.
    pub fn add_image(&mut self, image: ImageHandle, position: Point, width: f32, height: f32) -> EntityId {
        let id = EntityId::with_prefix(EntityKind::Image.id_prefix());
        self.images.push(ImageLayer {
            id,
            image,
            position,
            width,
            height,
            rotation: 0.0,
            opacity: 1.0,
        });
        self.selection = Some(id);
        id
    }

    // ─── Generic layer operations ────────────────────────────────────────

    /// Freeform move; positions are not clamped to the canvas.
    pub fn move_entity(&mut self, id: EntityId, position: Point) -> bool {
        let slot = match self.kind_of(id) {
            Some(EntityKind::Text) => self.texts.iter_mut().find(|t| t.id == id).map(|t| &mut t.position),
            Some(EntityKind::Image) => self.images.iter_mut().find(|i| i.id == id).map(|i| &mut i.position),
            Some(EntityKind::Character) => Some(&mut self.character.position),
            None => None,
        };
        match slot {
            Some(p) if *p != position => {
                *p = position;
                true
            }
            _ => false,
        }
    }

    /// Resize an image layer or the character. Text is sized by its font.
    /// Sizes below `min_size` are rejected.
    pub fn resize_entity(&mut self, id: EntityId, width: f32, height: f32, min_size: f32) -> bool {
        if width < min_size || height < min_size {
            return false;
        }
        let dims = match self.kind_of(id) {
            Some(EntityKind::Image) => self
                .images
                .iter_mut()
                .find(|i| i.id == id)
                .map(|i| (&mut i.width, &mut i.height)),
            Some(EntityKind::Character) => Some((&mut self.character.width, &mut self.character.height)),
            _ => None,
        };
        match dims {
            Some((w, h)) if (*w, *h) != (width, height) => {
                *w = width;
                *h = height;
                true
            }
            _ => false,
        }
    }

    /// Remove a layer. Removing the character empties its slot. Clears the
    /// selection if it pointed at `id`. A second call is a no-op.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let removed = match self.kind_of(id) {
            Some(EntityKind::Text) => {
                self.texts.retain(|t| t.id != id);
                true
            }
            Some(EntityKind::Image) => {
                self.images.retain(|i| i.id != id);
                true
            }
            Some(EntityKind::Character) => {
                self.character.image = None;
                self.selected_character = None;
                true
            }
            None => false,
        };
        if self.selection == Some(id) {
            self.selection = None;
        }
        removed
    }

    /// Copy a text or image layer, offset by `(offset, offset)`, and select
    /// the copy. The character is a singleton and cannot be duplicated.
    pub fn duplicate_entity(&mut self, id: EntityId, offset: f32) -> Option<EntityId> {
        match self.kind_of(id)? {
            EntityKind::Text => {
                let mut copy = self.text(id)?.clone();
                copy.id = EntityId::with_prefix(EntityKind::Text.id_prefix());
                copy.position = copy.position.offset(offset, offset);
                let new_id = copy.id;
                self.texts.push(copy);
                self.selection = Some(new_id);
                Some(new_id)
            }
            EntityKind::Image => {
                let mut copy = self.image(id)?.clone();
                copy.id = EntityId::with_prefix(EntityKind::Image.id_prefix());
                copy.position = copy.position.offset(offset, offset);
                let new_id = copy.id;
                self.images.push(copy);
                self.selection = Some(new_id);
                Some(new_id)
            }
            EntityKind::Character => None,
        }
    }

    /// Move a layer to the top of its collection's paint order.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        match self.kind_of(id) {
            Some(EntityKind::Text) => move_to_end(&mut self.texts, |t| t.id == id),
            Some(EntityKind::Image) => move_to_end(&mut self.images, |i| i.id == id),
            _ => false,
        }
    }

    /// Move a layer to the bottom of its collection's paint order.
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        match self.kind_of(id) {
            Some(EntityKind::Text) => move_to_start(&mut self.texts, |t| t.id == id),
            Some(EntityKind::Image) => move_to_start(&mut self.images, |i| i.id == id),
            _ => false,
        }
    }

    // ─── Background & character ──────────────────────────────────────────

    /// Replace the background image, optionally resizing the canvas.
    pub fn set_background(&mut self, image: ImageHandle, resize_to: Option<(u32, u32)>, template: Option<String>) {
        if let Some((w, h)) = resize_to {
            self.canvas.resize(w, h);
        }
        self.canvas.background_image = Some(image);
        if template.is_some() {
            self.selected_template = template;
        }
    }

    /// Resize the canvas, keeping the background image.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> bool {
        let before = (self.canvas.width, self.canvas.height);
        self.canvas.resize(width, height);
        before != (self.canvas.width, self.canvas.height)
    }

    pub fn set_character(&mut self, image: ImageHandle, character: Option<String>) {
        self.character.image = Some(image);
        if character.is_some() {
            self.selected_character = character;
        }
    }

    /// Empty every collection and reset the canvas to `default_canvas`.
    pub fn clear(&mut self, default_canvas: &CanvasConfig) {
        self.canvas = default_canvas.clone();
        self.canvas.background_image = None;
        self.texts.clear();
        self.images.clear();
        self.character = default_character(&self.canvas, self.character_size);
        self.selection = None;
        self.selected_template = None;
        self.selected_character = None;
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Deep copy of the current state.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            texts: self.texts.clone(),
            character_position: self.character.position,
            character_size: (self.character.width, self.character.height),
            character_image: self.character.image.clone(),
            images: self.images.clone(),
            selection: self.selection,
            canvas: self.canvas.clone(),
            selected_template: self.selected_template.clone(),
            selected_character: self.selected_character.clone(),
        }
    }

    /// Overwrite the live state with a snapshot. A selection that does not
    /// resolve in the restored state is dropped.
    pub fn restore(&mut self, snapshot: &HistorySnapshot) {
        self.texts = snapshot.texts.clone();
        self.images = snapshot.images.clone();
        self.character.position = snapshot.character_position;
        (self.character.width, self.character.height) = snapshot.character_size;
        self.character.image = snapshot.character_image.clone();
        self.canvas = snapshot.canvas.clone();
        self.selected_template = snapshot.selected_template.clone();
        self.selected_character = snapshot.selected_character.clone();
        self.selection = snapshot.selection.filter(|id| self.contains(*id));
    }
}

fn default_character(canvas: &CanvasConfig, size: f32) -> CharacterSlot {
    let center = canvas.center();
    CharacterSlot {
        image: None,
        position: Point::new(center.x - size / 2.0, center.y - size / 2.0),
        width: size,
        height: size,
    }
}

fn move_to_end<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    match items.iter().position(pred) {
        Some(pos) if pos + 1 != items.len() => {
            let item = items.remove(pos);
            items.push(item);
            true
        }
        _ => false,
    }
}

fn move_to_start<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    match items.iter().position(pred) {
        Some(pos) if pos != 0 => {
            let item = items.remove(pos);
            items.insert(0, item);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sparkify_core::id::AssetId;

    fn store() -> EntityStore {
        EntityStore::new(CanvasConfig::default(), 150.0)
    }

    fn handle(source: &str) -> ImageHandle {
        ImageHandle {
            asset: AssetId::next(),
            source: source.to_string(),
            width: 40,
            height: 20,
        }
    }

    #[test]
    fn add_text_selects_new_layer() {
        let mut s = store();
        let id = s.add_text("hi", Point::new(1.0, 2.0), TextStyle::default());
        assert_eq!(s.selection(), Some(id));
        assert_eq!(s.kind_of(id), Some(EntityKind::Text));
        assert_eq!(s.text(id).map(|t| t.content.as_str()), Some("hi"));
    }

    #[test]
    fn text_ids_are_unique() {
        let mut s = store();
        let ids: Vec<EntityId> = (0..20)
            .map(|_| s.add_text("x", Point::default(), TextStyle::default()))
            .collect();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn update_text_preserves_other_fields() {
        let mut s = store();
        let id = s.add_text("before", Point::new(5.0, 6.0), TextStyle::default());
        assert!(s.update_text(id, "after"));
        let t = s.text(id).unwrap();
        assert_eq!(t.content, "after");
        assert_eq!(t.position, Point::new(5.0, 6.0));
        assert_eq!(t.style, TextStyle::default());
        assert!(!s.update_text(EntityId::intern("missing"), "x"));
    }

    #[test]
    fn move_is_unclamped() {
        let mut s = store();
        let id = s.add_text("x", Point::default(), TextStyle::default());
        assert!(s.move_entity(id, Point::new(-50.0, 9000.0)));
        assert_eq!(s.text(id).unwrap().position, Point::new(-50.0, 9000.0));
    }

    #[test]
    fn move_unknown_is_noop() {
        let mut s = store();
        let before = s.snapshot();
        assert!(!s.move_entity(EntityId::intern("ghost"), Point::new(1.0, 1.0)));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn character_exists_only_when_loaded() {
        let mut s = store();
        let sparky = EntityId::character();
        assert!(!s.contains(sparky));
        assert!(!s.move_entity(sparky, Point::new(1.0, 1.0)));

        s.set_character(handle("/sparky.png"), Some("sparky-1".to_string()));
        assert_eq!(s.kind_of(sparky), Some(EntityKind::Character));
        assert!(s.move_entity(sparky, Point::new(1.0, 1.0)));

        s.set_selection(Some(sparky));
        assert!(s.remove_entity(sparky));
        assert_eq!(s.selection(), None);
        assert_eq!(s.selected_character(), None);
        assert!(s.character().image.is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut s = store();
        let keep = s.add_text("keep", Point::default(), TextStyle::default());
        let gone = s.add_text("gone", Point::default(), TextStyle::default());
        assert!(s.remove_entity(gone));
        let after_first = s.snapshot();
        assert!(!s.remove_entity(gone));
        assert_eq!(s.snapshot(), after_first);
        assert_eq!(s.texts().len(), 1);
        assert_eq!(s.texts()[0].id, keep);
    }

    #[test]
    fn removing_selected_clears_selection_only_for_that_id() {
        let mut s = store();
        let a = s.add_text("a", Point::default(), TextStyle::default());
        let b = s.add_text("b", Point::default(), TextStyle::default());
        assert_eq!(s.selection(), Some(b));
        s.remove_entity(a);
        assert_eq!(s.selection(), Some(b));
        s.remove_entity(b);
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn resize_respects_minimum() {
        let mut s = store();
        let id = s.add_image(handle("a.png"), Point::default(), 40.0, 20.0);
        assert!(!s.resize_entity(id, 4.0, 100.0, 5.0));
        assert!(s.resize_entity(id, 80.0, 40.0, 5.0));
        assert_eq!(s.image(id).map(|i| (i.width, i.height)), Some((80.0, 40.0)));
    }

    #[test]
    fn duplicate_offsets_and_selects() {
        let mut s = store();
        let id = s.add_image(handle("a.png"), Point::new(10.0, 10.0), 40.0, 20.0);
        let copy = s.duplicate_entity(id, 10.0).unwrap();
        assert_ne!(copy, id);
        assert_eq!(s.selection(), Some(copy));
        assert_eq!(s.image(copy).unwrap().position, Point::new(20.0, 20.0));
        assert_eq!(s.image(copy).unwrap().image, s.image(id).unwrap().image);
    }

    #[test]
    fn reorder_within_collection() {
        let mut s = store();
        let a = s.add_text("a", Point::default(), TextStyle::default());
        let b = s.add_text("b", Point::default(), TextStyle::default());
        let c = s.add_text("c", Point::default(), TextStyle::default());
        assert!(s.bring_to_front(a));
        assert!(!s.bring_to_front(a));
        let order: Vec<_> = s.texts().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![b, c, a]);
        assert!(s.send_to_back(c));
        let order: Vec<_> = s.texts().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut s = store();
        s.add_text("a", Point::default(), TextStyle::default());
        s.add_image(handle("a.png"), Point::default(), 10.0, 10.0);
        s.set_background(handle("/bg1.png"), Some((500, 500)), Some("bg-1".to_string()));
        s.set_character(handle("/sparky.png"), None);

        s.clear(&CanvasConfig::default());
        assert!(s.texts().is_empty());
        assert!(s.images().is_empty());
        assert!(s.canvas().background_image.is_none());
        assert_eq!((s.canvas().width, s.canvas().height), (800, 400));
        assert!(!s.character().is_placed());
        assert_eq!(s.selection(), None);
        assert_eq!(s.selected_template(), None);
    }

    #[test]
    fn clear_restores_configured_character_slot() {
        let mut s = store();
        let blank = s.snapshot();
        s.set_character(handle("/sparky.png"), Some("sparky-1".to_string()));
        let sparky = EntityId::character();
        assert!(s.resize_entity(sparky, 300.0, 300.0, 5.0));
        assert!(s.move_entity(sparky, Point::new(250.0, 50.0)));

        s.clear(&CanvasConfig::default());
        assert_eq!(s.snapshot(), blank);
        assert_eq!((s.character().width, s.character().height), (150.0, 150.0));
        assert_eq!(s.character().position, Point::new(325.0, 125.0));
    }

    #[test]
    fn snapshot_is_independent_of_live_state() {
        let mut s = store();
        let id = s.add_text("original", Point::default(), TextStyle::default());
        let snap = s.snapshot();
        s.update_text(id, "changed");
        assert_eq!(snap.texts[0].content, "original");

        s.restore(&snap);
        assert_eq!(s.text(id).unwrap().content, "original");
    }

    #[test]
    fn restore_drops_dangling_selection() {
        let mut s = store();
        let mut snap = s.snapshot();
        snap.selection = Some(EntityId::intern("not_there"));
        s.restore(&snap);
        assert_eq!(s.selection(), None);
    }
}
