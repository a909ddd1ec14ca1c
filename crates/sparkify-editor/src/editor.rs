//! Composition root.
//!
//! `MemeEditor` owns the store, history, selection, edit session, and
//! asset tickets, and drives one [`SceneProvider`]. Every state-changing
//! entry point follows the same tail: mutate the store, record a snapshot,
//! rebuild the scene from the store.

use crate::assets::{AssetLoader, LoadTarget, LoadTicket};
use crate::edit::{EditKey, TextEditSession};
use crate::history::History;
use crate::input::{CanvasEvent, Modifiers};
use crate::selection::{AlignEdge, SelectionController};
use crate::shortcuts::ShortcutMap;
use crate::store::EntityStore;
use crate::tools::{TOOLBAR_LAYOUT, ToolbarAction, ToolbarItem, ToolbarSection};
use sparkify_core::catalog::{Catalog, Character, Template, TemplateCategory};
use sparkify_core::config::{EditorConfig, TemplateSizing};
use sparkify_core::error::{AssetError, ExportError};
use sparkify_core::id::EntityId;
use sparkify_core::model::{EntityKind, ImageHandle, Point, fit_within};
use sparkify_core::scene::{ExportFormat, NodeBody, SceneNode, SceneProvider};

/// A rendered canvas ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Result of [`MemeEditor::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Applied,
    /// Nothing to do (no selection, history boundary, ...).
    Ignored,
    /// The host should open its file picker and call
    /// [`MemeEditor::request_upload`] with the chosen file.
    OpenFilePicker,
    Exported(ExportedImage),
}

impl DispatchOutcome {
    fn from_changed(changed: bool) -> Self {
        if changed { Self::Applied } else { Self::Ignored }
    }
}

pub struct MemeEditor<S: SceneProvider> {
    config: EditorConfig,
    catalog: Catalog,
    store: EntityStore,
    history: History,
    selection: SelectionController,
    edit: TextEditSession,
    assets: AssetLoader,
    scene: S,
    /// Display zoom in percent.
    zoom: u32,
}

impl<S: SceneProvider> MemeEditor<S> {
    pub fn new(config: EditorConfig, catalog: Catalog, scene: S) -> Self {
        let store = EntityStore::new(config.canvas.clone(), config.character_size);
        let mut history = History::new(config.history_depth);
        history.reset(store.snapshot());
        let mut editor = Self {
            config,
            catalog,
            store,
            history,
            selection: SelectionController::new(),
            edit: TextEditSession::new(),
            assets: AssetLoader::new(),
            scene,
            zoom: 100,
        };
        editor.refresh();
        editor
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable provider access, for registering decoded images.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn selection(&self) -> Option<EntityId> {
        self.store.selection()
    }

    pub fn editing(&self) -> Option<EntityId> {
        self.edit.editing()
    }

    pub fn edit_draft(&self) -> Option<&str> {
        self.edit.draft()
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn is_loading(&self) -> bool {
        self.assets.is_loading()
    }

    // ─── Catalog & asset loads ───────────────────────────────────────────

    /// Start loading a background or meme template. `None` for unknown ids.
    pub fn select_template(&mut self, id: &str) -> Option<LoadTicket> {
        let Some(template) = self.catalog.template(id) else {
            log::warn!("editor: unknown template {id}");
            return None;
        };
        let resize_to = match self.config.template_sizing {
            TemplateSizing::Fixed => None,
            TemplateSizing::MatchTemplate => Some((template.width, template.height)),
        };
        log::info!("editor: template {} ({})", template.id, template.name);
        let source = template.image_url.clone();
        let target = LoadTarget::Background {
            template: Some(template.id.clone()),
            resize_to,
        };
        Some(self.assets.begin(&source, target))
    }

    /// Start loading a character sprite. `None` for unknown ids.
    pub fn select_character(&mut self, id: &str) -> Option<LoadTicket> {
        let Some(character) = self.catalog.character(id) else {
            log::warn!("editor: unknown character {id}");
            return None;
        };
        log::info!("editor: character {} ({})", character.id, character.name);
        let source = character.image_url.clone();
        let target = LoadTarget::Character {
            character: Some(character.id.clone()),
        };
        Some(self.assets.begin(&source, target))
    }

    /// Start an image upload. The host reads and decodes the file, then
    /// calls [`finish_load`](Self::finish_load).
    pub fn request_upload(&mut self, file_name: &str) -> LoadTicket {
        self.assets.begin(
            file_name,
            LoadTarget::Upload {
                file_name: file_name.to_string(),
            },
        )
    }

    /// Apply a finished load. Failed, stale, and unknown tickets leave the
    /// state untouched and return `false`.
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: Result<ImageHandle, AssetError>) -> bool {
        let target = match self.assets.finish(ticket) {
            Ok(target) => target,
            Err(err) => {
                log::warn!("editor: dropping load of {}: {err}", ticket.source);
                return false;
            }
        };
        let image = match result {
            Ok(image) => image,
            Err(err) => {
                log::warn!("editor: load of {} failed: {err}", ticket.source);
                return false;
            }
        };
        match target {
            LoadTarget::Background { template, resize_to } => {
                self.store.set_background(image, resize_to, template);
            }
            LoadTarget::Character { character } => {
                self.store.set_character(image, character);
            }
            LoadTarget::Upload { file_name } => {
                let max = self.config.upload_max_size;
                let (width, height) = fit_within(image.width, image.height, max, max);
                let center = self.store.canvas().center();
                let position = Point::new(center.x - width / 2.0, center.y - height / 2.0);
                let id = self.store.add_image(image, position, width, height);
                log::info!("editor: uploaded {file_name} as {id}");
            }
        }
        self.commit();
        self.refresh();
        true
    }

    /// Resize the canvas to one of the catalog's presets.
    pub fn apply_preset(&mut self, id: &str) -> bool {
        let Some(preset) = self.catalog.presets.iter().find(|p| p.id == id) else {
            log::warn!("editor: unknown canvas preset {id}");
            return false;
        };
        let (width, height) = (preset.width, preset.height);
        let changed = self.store.resize_canvas(width, height);
        self.after(changed)
    }

    pub fn filter_templates(&self, category: TemplateCategory, term: &str) -> Vec<&Template> {
        match category {
            TemplateCategory::Background => self.catalog.filter_backgrounds(term).collect(),
            TemplateCategory::Meme => self.catalog.filter_memes(term).collect(),
        }
    }

    pub fn filter_characters(&self, term: &str) -> Vec<&Character> {
        self.catalog.filter_characters(term).collect()
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    /// Add a text layer with the configured default content and style,
    /// roughly centered, and select it.
    pub fn add_text(&mut self) -> EntityId {
        self.finish_running_edit();
        let center = self.store.canvas().center();
        let position = Point::new(center.x - self.config.align.assumed_text_width / 2.0, center.y);
        let id = self
            .store
            .add_text(&self.config.default_text, position, self.config.text_style.clone());
        self.commit();
        self.refresh();
        id
    }

    pub fn align(&mut self, edge: AlignEdge) -> bool {
        let changed = self.selection.align_active(&mut self.store, edge, &self.config.align);
        self.after(changed)
    }

    pub fn center_selected(&mut self) -> bool {
        let changed = self.selection.center_active(&mut self.store, &self.config.align);
        self.after(changed)
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.store.selection() else {
            return false;
        };
        if self.edit.editing() == Some(id) {
            self.edit.cancel();
        }
        let changed = self.store.remove_entity(id);
        self.after(changed)
    }

    pub fn duplicate_selected(&mut self) -> Option<EntityId> {
        let id = self.store.selection()?;
        self.finish_running_edit();
        let copy = self.store.duplicate_entity(id, self.config.duplicate_offset);
        self.after(copy.is_some());
        copy
    }

    pub fn bring_to_front(&mut self) -> bool {
        let changed = self.store.selection().is_some_and(|id| self.store.bring_to_front(id));
        self.after(changed)
    }

    pub fn send_to_back(&mut self) -> bool {
        let changed = self.store.selection().is_some_and(|id| self.store.send_to_back(id));
        self.after(changed)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route a canvas event. Returns `true` if editor state changed.
    pub fn handle_event(&mut self, event: CanvasEvent) -> bool {
        match event {
            CanvasEvent::Click { target } => {
                // Clicking away from the input commits, like a blur.
                let committed = self.finish_running_edit();
                let target = target.filter(|id| self.store.contains(*id));
                if target == self.store.selection() {
                    if committed {
                        self.refresh();
                    }
                    return committed;
                }
                self.selection.select(&mut self.store, target);
                self.refresh();
                true
            }
            CanvasEvent::DoubleClick { target } => {
                let Some(id) = target.filter(|id| self.store.text(*id).is_some()) else {
                    return false;
                };
                if self.edit.editing() == Some(id) {
                    return false;
                }
                // The running edit may target another layer; write it back
                // before reading the content the new session starts from.
                self.finish_running_edit();
                let Some(content) = self.store.text(id).map(|t| t.content.clone()) else {
                    return false;
                };
                self.edit.begin(id, &content);
                self.selection.select(&mut self.store, Some(id));
                self.refresh();
                true
            }
            CanvasEvent::DragEnd { target, position } => {
                let changed = self.store.move_entity(target, position);
                self.after(changed)
            }
            CanvasEvent::TransformEnd {
                target,
                position,
                width,
                height,
            } => {
                let min = self.config.min_layer_size;
                if width < min || height < min {
                    log::debug!("editor: {target} resize to {width}x{height} below {min}, ignored");
                    return false;
                }
                let resized = self.store.resize_entity(target, width, height, min);
                let moved = self.store.move_entity(target, position);
                self.after(moved || resized)
            }
            CanvasEvent::Key { key, modifiers } => self.handle_key(&key, modifiers),
        }
    }

    /// Keys go to the edit session while a text layer is being edited and
    /// to the shortcut map otherwise.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        if self.edit.editing().is_some() {
            return match EditKey::classify(key, modifiers.shift) {
                EditKey::Commit => self.commit_edit(),
                EditKey::Cancel => self.cancel_edit(),
                EditKey::PassThrough => false,
            };
        }
        match ShortcutMap::resolve(key, modifiers) {
            Some(action) => match self.dispatch(action) {
                Ok(outcome) => outcome != DispatchOutcome::Ignored,
                Err(err) => {
                    log::warn!("editor: {} failed: {err}", action.name());
                    false
                }
            },
            None => false,
        }
    }

    pub fn edit_input(&mut self, text: &str) {
        self.edit.input(text);
    }

    /// Write the draft back to its text layer.
    pub fn commit_edit(&mut self) -> bool {
        let was_editing = self.finish_running_edit();
        if was_editing {
            self.refresh();
        }
        was_editing
    }

    /// Drop the draft; the layer keeps its previous content.
    pub fn cancel_edit(&mut self) -> bool {
        let Some((id, _)) = self.edit.cancel() else {
            return false;
        };
        log::debug!("editor: edit of {id} cancelled");
        self.refresh();
        true
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.edit.cancel();
        self.store.restore(&snapshot);
        self.refresh();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.edit.cancel();
        self.store.restore(&snapshot);
        self.refresh();
        true
    }

    /// Clear the canvas and history. Loads still in flight are dropped
    /// when they complete.
    pub fn reset(&mut self) {
        self.edit.cancel();
        self.store.clear(&self.config.canvas);
        self.assets.invalidate();
        self.history.reset(self.store.snapshot());
        log::info!("editor: canvas reset");
        self.refresh();
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Set display zoom in percent, clamped to the configured range.
    pub fn set_zoom(&mut self, percent: u32) -> u32 {
        self.zoom = percent.clamp(self.config.zoom_min, self.config.zoom_max);
        self.scene.set_zoom(self.zoom as f32 / 100.0);
        self.zoom
    }

    /// Rasterize the canvas without transform handles.
    pub fn export(&mut self) -> Result<ExportedImage, ExportError> {
        if self.finish_running_edit() {
            self.refresh();
        }
        self.scene.bind_transform(&[]);
        let format = self.config.export_format;
        let result = self.scene.export_image(format);
        self.selection.invalidate();
        self.selection.sync_handles(&self.store, &mut self.scene);
        let bytes = result?;
        log::info!(
            "editor: exported {} as {} ({} bytes)",
            self.config.export_file_name,
            format.mime_type(),
            bytes.len()
        );
        Ok(ExportedImage {
            file_name: self.config.export_file_name.clone(),
            format,
            bytes,
        })
    }

    pub fn toolbar(&self) -> Vec<ToolbarSection> {
        let has_selection = self.store.selection().is_some();
        let loading = self.assets.is_loading();
        TOOLBAR_LAYOUT
            .iter()
            .map(|&(title, actions)| ToolbarSection {
                title,
                tools: actions
                    .iter()
                    .map(|&action| {
                        let enabled = match action {
                            ToolbarAction::Undo => self.history.can_undo(),
                            ToolbarAction::Redo => self.history.can_redo(),
                            ToolbarAction::AddImage => !loading,
                            a if a.needs_selection() => has_selection,
                            _ => true,
                        };
                        ToolbarItem {
                            id: action.name(),
                            label: action.label(),
                            enabled,
                            loading: action == ToolbarAction::AddImage && loading,
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn dispatch(&mut self, action: ToolbarAction) -> Result<DispatchOutcome, ExportError> {
        log::trace!("editor: dispatch {}", action.name());
        let outcome = match action {
            ToolbarAction::Undo => DispatchOutcome::from_changed(self.undo()),
            ToolbarAction::Redo => DispatchOutcome::from_changed(self.redo()),
            ToolbarAction::AddText => {
                self.add_text();
                DispatchOutcome::Applied
            }
            ToolbarAction::AddImage if self.assets.is_loading() => DispatchOutcome::Ignored,
            ToolbarAction::AddImage => DispatchOutcome::OpenFilePicker,
            ToolbarAction::Duplicate => DispatchOutcome::from_changed(self.duplicate_selected().is_some()),
            ToolbarAction::BringToFront => DispatchOutcome::from_changed(self.bring_to_front()),
            ToolbarAction::SendToBack => DispatchOutcome::from_changed(self.send_to_back()),
            ToolbarAction::Delete => DispatchOutcome::from_changed(self.delete_selected()),
            ToolbarAction::Deselect => {
                let had = self.store.selection().is_some();
                self.selection.deselect(&mut self.store);
                self.refresh();
                DispatchOutcome::from_changed(had)
            }
            ToolbarAction::Download => DispatchOutcome::Exported(self.export()?),
            ToolbarAction::Reset => {
                self.reset();
                DispatchOutcome::Applied
            }
            ToolbarAction::AlignLeft => DispatchOutcome::from_changed(self.align(AlignEdge::Left)),
            ToolbarAction::AlignCenter => DispatchOutcome::from_changed(self.align(AlignEdge::Center)),
            ToolbarAction::AlignRight => DispatchOutcome::from_changed(self.align(AlignEdge::Right)),
            ToolbarAction::CenterOnCanvas => DispatchOutcome::from_changed(self.center_selected()),
        };
        Ok(outcome)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Commit a running text edit, if any. Returns whether one was running.
    fn finish_running_edit(&mut self) -> bool {
        let Some((id, draft)) = self.edit.commit() else {
            return false;
        };
        if self.store.update_text(id, &draft) {
            self.commit();
        }
        true
    }

    fn after(&mut self, changed: bool) -> bool {
        if changed {
            self.commit();
            self.refresh();
        }
        changed
    }

    fn commit(&mut self) {
        self.history.record(self.store.snapshot());
    }

    /// Rebuild the scene from the store.
    fn refresh(&mut self) {
        self.scene.set_backdrop(self.store.canvas());
        self.scene.clear_nodes();

        let character = self.store.character();
        if let Some(image) = &character.image {
            self.scene.place_node(SceneNode {
                id: character.id(),
                kind: EntityKind::Character,
                position: character.position,
                body: NodeBody::Image {
                    image: image.clone(),
                    width: character.width,
                    height: character.height,
                    rotation: 0.0,
                    opacity: 1.0,
                },
            });
        }
        for text in self.store.texts() {
            self.scene.place_node(SceneNode {
                id: text.id,
                kind: EntityKind::Text,
                position: text.position,
                body: NodeBody::Text {
                    content: text.content.clone(),
                    style: text.style.clone(),
                },
            });
        }
        for layer in self.store.images() {
            self.scene.place_node(SceneNode {
                id: layer.id,
                kind: EntityKind::Image,
                position: layer.position,
                body: NodeBody::Image {
                    image: layer.image.clone(),
                    width: layer.width,
                    height: layer.height,
                    rotation: layer.rotation,
                    opacity: layer.opacity,
                },
            });
        }

        if let Some(id) = self.edit.editing() {
            self.scene.set_node_visible(id, false);
        }
        self.selection.invalidate();
        self.selection.sync_handles(&self.store, &mut self.scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sparkify_render::RetainedScene;

    fn editor() -> MemeEditor<RetainedScene> {
        MemeEditor::new(EditorConfig::default(), Catalog::builtin(), RetainedScene::new())
    }

    #[test]
    fn starts_with_one_blank_snapshot() {
        let editor = editor();
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.history().can_undo());
        assert_eq!(editor.scene().nodes().len(), 0);
    }

    #[test]
    fn add_text_places_selected_node() {
        let mut editor = editor();
        let id = editor.add_text();
        assert_eq!(editor.selection(), Some(id));
        assert_eq!(editor.scene().overlay(), &[id]);
        assert_eq!(editor.store().text(id).unwrap().position, Point::new(300.0, 200.0));
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn click_on_backdrop_deselects() {
        let mut editor = editor();
        editor.add_text();
        assert!(editor.handle_event(CanvasEvent::click(None)));
        assert_eq!(editor.selection(), None);
        assert!(editor.scene().overlay().is_empty());
    }

    #[test]
    fn drag_end_records_once() {
        let mut editor = editor();
        let id = editor.add_text();
        assert!(editor.handle_event(CanvasEvent::drag_end(id, 5.0, 6.0)));
        assert!(!editor.handle_event(CanvasEvent::drag_end(id, 5.0, 6.0)));
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn preset_resizes_canvas_once() {
        let mut editor = editor();
        assert!(editor.apply_preset("square"));
        assert!(!editor.apply_preset("square"));
        assert!(!editor.apply_preset("poster"));
        assert_eq!(editor.scene().backdrop().width, 500);
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut editor = editor();
        assert_eq!(editor.set_zoom(10), 25);
        assert_eq!(editor.set_zoom(500), 200);
        assert_eq!(editor.scene().zoom(), 2.0);
    }

    #[test]
    fn shortcut_deletes_selection() {
        let mut editor = editor();
        let id = editor.add_text();
        assert!(editor.handle_key("Delete", Modifiers::default()));
        assert!(!editor.store().contains(id));
        assert!(editor.handle_key(
            "z",
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            }
        ));
        assert!(editor.store().contains(id));
    }
}
