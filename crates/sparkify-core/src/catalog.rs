//! Read-only template and character catalog.
//!
//! The bundled catalog ships with the app; [`Catalog::from_json`] loads a
//! replacement with the same shape. Search is a plain case-insensitive
//! substring match on display names, recomputed per query.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Background,
    Meme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub thumbnail: String,
    pub category: TemplateCategory,
    /// Declared dimensions, used when templates resize the canvas.
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub thumbnail: String,
    #[serde(default)]
    pub poses: Vec<String>,
    #[serde(default)]
    pub expressions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasPreset {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Sidebar section with its entry count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: &'static str,
    pub name: &'static str,
    pub count: usize,
}

/// Anything with a display name the sidebar can search.
pub trait Named {
    fn display_name(&self) -> &str;
}

impl Named for Template {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for Character {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for CanvasPreset {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Lazily filter `items` by a case-insensitive substring of their name.
/// An empty term matches everything. Order is preserved.
pub fn filter_by_name<'a, T: Named>(
    items: &'a [T],
    term: &str,
) -> impl Iterator<Item = &'a T> + use<'a, T> {
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(move |item| item.display_name().to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub backgrounds: Vec<Template>,
    pub memes: Vec<Template>,
    pub characters: Vec<Character>,
    #[serde(default)]
    pub presets: Vec<CanvasPreset>,
}

impl Catalog {
    /// Parse a catalog from JSON. Ids must be unique across templates.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_json::from_str(json).inspect_err(|e| {
            log::warn!("catalog: rejected JSON: {e}");
        })?;
        let mut seen = std::collections::HashSet::new();
        for t in catalog.templates() {
            if !seen.insert(t.id.as_str()) {
                log::warn!("catalog: duplicate template id {}", t.id);
                return Err(ConfigError::Invalid {
                    field: "templates",
                    reason: format!("duplicate template id `{}`", t.id),
                });
            }
        }
        log::debug!(
            "catalog: {} backgrounds, {} memes, {} characters, {} presets",
            catalog.backgrounds.len(),
            catalog.memes.len(),
            catalog.characters.len(),
            catalog.presets.len()
        );
        Ok(catalog)
    }

    /// Backgrounds followed by memes.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.backgrounds.iter().chain(self.memes.iter())
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates().find(|t| t.id == id)
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn filter_backgrounds<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Template> + use<'a> {
        filter_by_name(&self.backgrounds, term)
    }

    pub fn filter_memes<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Template> + use<'a> {
        filter_by_name(&self.memes, term)
    }

    pub fn filter_characters<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Character> + use<'a> {
        filter_by_name(&self.characters, term)
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        vec![
            CategorySummary {
                id: "background",
                name: "Backgrounds",
                count: self.backgrounds.len(),
            },
            CategorySummary {
                id: "meme",
                name: "Memes",
                count: self.memes.len(),
            },
            CategorySummary {
                id: "sparky",
                name: "Sparky",
                count: self.characters.len(),
            },
        ]
    }

    /// The catalog bundled with the app.
    pub fn builtin() -> Self {
        let template = |id: &str, name: &str, url: &str, category, width, height| Template {
            id: id.to_string(),
            name: name.to_string(),
            image_url: url.to_string(),
            thumbnail: url.to_string(),
            category,
            width,
            height,
        };
        let preset = |id: &str, name: &str, width, height| CanvasPreset {
            id: id.to_string(),
            name: name.to_string(),
            width,
            height,
        };
        use TemplateCategory::{Background, Meme};
        Self {
            backgrounds: vec![
                template("bg-1", "Background 1", "/bg1.png", Background, 800, 600),
                template("bg-2", "Background 2", "/bg2.png", Background, 800, 600),
                template("bg-3", "Background 3", "/bg3.png", Background, 800, 600),
            ],
            memes: vec![
                template("meme-1", "Meme Template 1", "/meme1.jpg", Meme, 500, 500),
                template("meme-2", "Meme Template 2", "/meme2.webp", Meme, 500, 500),
                template("meme-3", "Meme Template 3", "/meme3.jpg", Meme, 500, 500),
            ],
            characters: vec![Character {
                id: "sparky-1".to_string(),
                name: "Sparky".to_string(),
                image_url: "/sparky.png".to_string(),
                thumbnail: "/sparky.png".to_string(),
                poses: vec!["default".to_string()],
                expressions: vec!["neutral".to_string()],
            }],
            presets: vec![
                preset("square", "Square (500x500)", 500, 500),
                preset("landscape", "Landscape (800x600)", 800, 600),
                preset("portrait", "Portrait (600x800)", 600, 800),
                preset("wide", "Wide (1200x600)", 1200, 600),
                preset("story", "Story (1080x1920)", 1080, 1920),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

pub const CHARACTER_POSES: &[&str] = &[
    "default",
    "standing",
    "sitting",
    "jumping",
    "running",
    "waving",
    "pointing",
    "thumbs-up",
    "crossed-arms",
];

pub const CHARACTER_EXPRESSIONS: &[&str] = &[
    "neutral",
    "happy",
    "sad",
    "angry",
    "surprised",
    "cool",
    "thinking",
    "laughing",
    "confused",
];
