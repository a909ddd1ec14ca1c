//! WASM bridge for Sparkify: exposes the meme editor to the browser page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM: it
//! loads `<img>` elements for the tickets handed out here, shows the inline
//! text input while a layer is being edited, and triggers the download.
//! Everything else goes through [`SparkifyApp`].

mod canvas;
mod logging;

pub use canvas::CanvasScene;

use serde_json::json;
use sparkify_core::catalog::{Catalog, TemplateCategory};
use sparkify_core::config::EditorConfig;
use sparkify_core::error::AssetError;
use sparkify_core::id::EntityId;
use sparkify_core::model::Point;
use sparkify_core::scene::SceneProvider;
use sparkify_editor::assets::LoadTicket;
use sparkify_editor::input::{CanvasEvent, Modifiers};
use sparkify_editor::shortcuts::ShortcutMap;
use sparkify_editor::tools::ToolbarAction;
use sparkify_editor::{DispatchOutcome, MemeEditor};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Pointer gesture in progress between down and up.
#[derive(Debug, Clone, Copy)]
enum Gesture {
    Drag { id: EntityId, grab: Point, at: Point },
    Resize { id: EntityId, origin: Point, size: (f32, f32) },
}

/// The browser-facing editor.
#[wasm_bindgen]
pub struct SparkifyApp {
    editor: MemeEditor<CanvasScene>,
    gesture: Option<Gesture>,
}

#[wasm_bindgen]
impl SparkifyApp {
    /// Attach to a `<canvas>`. `config_json` and `catalog_json` replace the
    /// defaults when given.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        config_json: Option<String>,
        catalog_json: Option<String>,
    ) -> Result<SparkifyApp, JsValue> {
        logging::console_error_panic_hook_setup();
        logging::init(log::LevelFilter::Info);

        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(to_js)?,
            None => EditorConfig::default(),
        };
        let catalog = match catalog_json {
            Some(json) => Catalog::from_json(&json).map_err(to_js)?,
            None => Catalog::builtin(),
        };
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let scene = CanvasScene::new(canvas, ctx);

        Ok(Self {
            editor: MemeEditor::new(config, catalog, scene),
            gesture: None,
        })
    }

    /// Raise or lower console verbosity: "error" … "trace".
    pub fn set_log_level(&self, level: &str) {
        match level.parse::<log::LevelFilter>() {
            Ok(filter) => log::set_max_level(filter),
            Err(_) => log::warn!("unknown log level {level}"),
        }
    }

    /// Paint the canvas if anything changed. Call once per animation frame.
    pub fn render(&mut self) {
        self.editor.scene_mut().paint();
    }

    // ─── Catalog ─────────────────────────────────────────────────────────

    /// `category` is "background" or "meme".
    pub fn templates_json(&self, category: &str, term: &str) -> String {
        let category = match category {
            "meme" => TemplateCategory::Meme,
            _ => TemplateCategory::Background,
        };
        to_json(&self.editor.filter_templates(category, term))
    }

    pub fn characters_json(&self, term: &str) -> String {
        to_json(&self.editor.filter_characters(term))
    }

    pub fn categories_json(&self) -> String {
        to_json(&self.editor.catalog().categories())
    }

    pub fn presets_json(&self) -> String {
        to_json(&self.editor.catalog().presets)
    }

    pub fn apply_preset(&mut self, id: &str) -> bool {
        self.editor.apply_preset(id)
    }

    // ─── Image loads ─────────────────────────────────────────────────────

    /// Returns a ticket JSON (`{"id","generation","source"}`) or `"null"`.
    pub fn select_template(&mut self, id: &str) -> String {
        to_json(&self.editor.select_template(id))
    }

    pub fn select_character(&mut self, id: &str) -> String {
        to_json(&self.editor.select_character(id))
    }

    /// Ticket for an uploaded file. The page reads the file into an
    /// `<img>` and reports back with [`image_loaded`](Self::image_loaded).
    pub fn request_upload(&mut self, file_name: &str) -> String {
        to_json(&self.editor.request_upload(file_name))
    }

    /// Returns `true` if the image was applied.
    pub fn image_loaded(&mut self, ticket_json: &str, img: HtmlImageElement) -> bool {
        let Some(ticket) = parse_ticket(ticket_json) else {
            return false;
        };
        let handle = self.editor.scene_mut().register_image(img, &ticket.source);
        self.editor.finish_load(&ticket, Ok(handle))
    }

    pub fn image_failed(&mut self, ticket_json: &str, reason: &str) -> bool {
        let Some(ticket) = parse_ticket(ticket_json) else {
            return false;
        };
        let err = AssetError::Read {
            source_name: ticket.source.clone(),
            reason: reason.to_string(),
        };
        self.editor.finish_load(&ticket, Err(err))
    }

    pub fn is_loading(&self) -> bool {
        self.editor.is_loading()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer down at element-space `(x, y)`. Returns `true` if the
    /// selection changed.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        let p = self.to_canvas(x, y);
        let scene = self.editor.scene();
        if let Some(id) = scene.handle_at(p.x, p.y)
            && let Some((origin, w, h)) = scene.node_box(id)
        {
            self.gesture = Some(Gesture::Resize {
                id,
                origin,
                size: (w, h),
            });
            return false;
        }

        let target = scene.hit_test(p.x, p.y);
        let changed = self.editor.handle_event(CanvasEvent::click(target));
        self.gesture = target
            .and_then(|id| self.editor.scene().node_box(id))
            .zip(target)
            .map(|((pos, _, _), id)| Gesture::Drag {
                id,
                grab: Point::new(p.x - pos.x, p.y - pos.y),
                at: pos,
            });
        changed
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let p = self.to_canvas(x, y);
        let min = self.editor.config().min_layer_size;
        match &mut self.gesture {
            Some(Gesture::Drag { id, grab, at }) => {
                *at = Point::new(p.x - grab.x, p.y - grab.y);
                self.editor.scene_mut().preview_position(*id, *at);
            }
            Some(Gesture::Resize { id, origin, size }) => {
                *size = ((p.x - origin.x).max(min), (p.y - origin.y).max(min));
                self.editor.scene_mut().preview_size(*id, size.0, size.1);
            }
            None => {}
        }
    }

    /// Finish a drag or resize. Returns `true` if the store changed.
    pub fn pointer_up(&mut self) -> bool {
        match self.gesture.take() {
            Some(Gesture::Drag { id, at, .. }) => self.editor.handle_event(CanvasEvent::DragEnd {
                target: id,
                position: at,
            }),
            Some(Gesture::Resize { id, origin, size }) => {
                self.editor.handle_event(CanvasEvent::TransformEnd {
                    target: id,
                    position: origin,
                    width: size.0,
                    height: size.1,
                })
            }
            None => false,
        }
    }

    /// Double click starts inline editing on text layers. Returns the edit
    /// state JSON (see [`edit_state_json`](Self::edit_state_json)).
    pub fn double_click(&mut self, x: f32, y: f32) -> String {
        let p = self.to_canvas(x, y);
        let target = self.editor.scene().hit_test(p.x, p.y);
        self.gesture = None;
        self.editor.handle_event(CanvasEvent::DoubleClick { target });
        self.edit_state_json()
    }

    // ─── Inline text editing ─────────────────────────────────────────────

    /// `{"editing":false}` or
    /// `{"editing":true,"id","draft","x","y","fontSize","fontFamily","fill"}`
    /// with element-space coordinates for positioning the input.
    pub fn edit_state_json(&self) -> String {
        let Some(id) = self.editor.editing() else {
            return json!({ "editing": false }).to_string();
        };
        let Some(layer) = self.editor.store().text(id) else {
            return json!({ "editing": false }).to_string();
        };
        let zoom = self.zoom_scale();
        json!({
            "editing": true,
            "id": id.as_str(),
            "draft": self.editor.edit_draft().unwrap_or_default(),
            "x": layer.position.x * zoom,
            "y": layer.position.y * zoom,
            "fontSize": layer.style.font_size * zoom,
            "fontFamily": layer.style.font_family,
            "fill": layer.style.fill.to_hex(),
        })
        .to_string()
    }

    pub fn edit_input(&mut self, text: &str) {
        self.editor.edit_input(text);
    }

    /// Commit on Enter or blur.
    pub fn commit_edit(&mut self) -> bool {
        self.editor.commit_edit()
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editor.cancel_edit()
    }

    // ─── Keyboard & toolbar ──────────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"handled":bool,"action":"<name>"|null, ...outcome}`
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        if self.editor.editing().is_some() {
            let handled = self.editor.handle_key(key, modifiers);
            return json!({ "handled": handled, "action": null }).to_string();
        }
        match ShortcutMap::resolve(key, modifiers) {
            Some(action) => self.dispatch_action(action),
            None => json!({ "handled": false, "action": null }).to_string(),
        }
    }

    /// Run a toolbar action by id ("undo", "add-text", "download", ...).
    pub fn dispatch(&mut self, name: &str) -> String {
        match ToolbarAction::from_name(name) {
            Some(action) => self.dispatch_action(action),
            None => {
                log::warn!("unknown toolbar action {name}");
                json!({ "handled": false, "action": null }).to_string()
            }
        }
    }

    /// Toolbar sections with per-tool enabled/loading state.
    pub fn toolbar_json(&self) -> String {
        to_json(&self.editor.toolbar())
    }

    pub fn selected_id(&self) -> Option<String> {
        self.editor.selection().map(|id| id.as_str().to_string())
    }

    /// Set zoom percent; returns the clamped value.
    pub fn set_zoom(&mut self, percent: u32) -> u32 {
        self.editor.set_zoom(percent)
    }

    /// The exported canvas as a `data:` URL, PNG or JPEG per the config.
    pub fn export_data_url(&mut self) -> Result<String, JsValue> {
        let exported = self.editor.export().map_err(to_js)?;
        Ok(canvas::encode_data_url(&exported.bytes, exported.format))
    }

    pub fn export_file_name(&self) -> String {
        self.editor.config().export_file_name.clone()
    }
}

impl SparkifyApp {
    fn dispatch_action(&mut self, action: ToolbarAction) -> String {
        let name = action.name();
        match self.editor.dispatch(action) {
            Ok(outcome) => outcome_json(name, &outcome),
            Err(err) => {
                log::error!("{name} failed: {err}");
                json!({ "handled": false, "action": name, "error": err.to_string() }).to_string()
            }
        }
    }

    fn zoom_scale(&self) -> f32 {
        self.editor.zoom() as f32 / 100.0
    }

    fn to_canvas(&self, x: f32, y: f32) -> Point {
        let zoom = self.zoom_scale();
        Point::new(x / zoom, y / zoom)
    }
}

fn outcome_json(action: &str, outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Applied => json!({ "handled": true, "action": action }),
        DispatchOutcome::Ignored => json!({ "handled": false, "action": action }),
        DispatchOutcome::OpenFilePicker => {
            json!({ "handled": true, "action": action, "openFilePicker": true })
        }
        DispatchOutcome::Exported(image) => json!({
            "handled": true,
            "action": action,
            "fileName": image.file_name,
            "dataUrl": canvas::encode_data_url(&image.bytes, image.format),
        }),
    }
    .to_string()
}

fn parse_ticket(json: &str) -> Option<LoadTicket> {
    match serde_json::from_str(json) {
        Ok(ticket) => Some(ticket),
        Err(err) => {
            log::warn!("malformed load ticket {json}: {err}");
            None
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sparkify_core::scene::ExportFormat;
    use sparkify_editor::ExportedImage;

    #[test]
    fn ticket_json_roundtrip() {
        let ticket = LoadTicket {
            id: 3,
            generation: 1,
            source: "/bg1.png".to_string(),
        };
        assert_eq!(parse_ticket(&to_json(&ticket)), Some(ticket));
        assert_eq!(parse_ticket("{\"id\":1}"), None);
    }

    #[test]
    fn missing_ticket_serializes_as_null() {
        assert_eq!(to_json(&None::<LoadTicket>), "null");
    }

    #[test]
    fn outcome_json_shapes() {
        assert_eq!(
            outcome_json("undo", &DispatchOutcome::Ignored),
            r#"{"action":"undo","handled":false}"#
        );
        let exported = DispatchOutcome::Exported(ExportedImage {
            file_name: "sparkify-meme.png".to_string(),
            format: ExportFormat::Png,
            bytes: vec![1, 2, 3],
        });
        let value: serde_json::Value = serde_json::from_str(&outcome_json("download", &exported)).unwrap();
        assert_eq!(value["fileName"], "sparkify-meme.png");
        assert_eq!(value["dataUrl"], "data:image/png;base64,AQID");
    }
}
