//! Data model for a meme canvas.
//!
//! Everything placed on the canvas is a layer: text layers, uploaded image
//! layers, and the single character sprite slot. Each layer carries its
//! [`EntityKind`] so callers never infer a type from the id string.
//! Decoded pixels never live here; an [`ImageHandle`] only points into the
//! scene provider's asset registry.

use crate::id::{AssetId, EntityId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let channels: Vec<u8> = match bytes.len() {
            3 | 4 => bytes
                .iter()
                .map(|&c| hex_digit(c).map(|v| v * 17))
                .collect::<Option<_>>()?,
            6 | 8 => bytes
                .chunks(2)
                .map(|pair| Some(hex_digit(pair[0])? << 4 | hex_digit(pair[1])?))
                .collect::<Option<_>>()?,
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            channels[0] as f32 / 255.0,
            channels[1] as f32 / 255.0,
            channels[2] as f32 / 255.0,
            alpha as f32 / 255.0,
        ))
    }

    /// 8-bit channels, rounded.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Emit `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// A position in canvas pixel space (unscaled by zoom).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned bounds of a layer in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// Closed set of layer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Text,
    Image,
    Character,
}

impl EntityKind {
    /// Prefix used when minting fresh ids for this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::Text => "text",
            EntityKind::Image => "image",
            EntityKind::Character => crate::id::CHARACTER_ID,
        }
    }

    /// Badge label shown for the active layer.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Text => "Text",
            EntityKind::Image => "Image",
            EntityKind::Character => "Character",
        }
    }
}

/// A decoded image, referenced by its asset key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    pub asset: AssetId,
    /// URL or file name the image was decoded from.
    pub source: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_size: f32,
    pub font_family: String,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 32.0,
            font_family: "Impact".to_string(),
            fill: Color::WHITE,
            stroke: Color::BLACK,
            stroke_width: 2.0,
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub id: EntityId,
    pub content: String,
    pub position: Point,
    pub style: TextStyle,
}

impl TextLayer {
    pub const KIND: EntityKind = EntityKind::Text;

    /// Rough glyph advance as a fraction of the font size.
    const ADVANCE: f32 = 0.6;

    /// Unmeasured bounds estimate for hit testing. Real text metrics live
    /// in the scene provider.
    pub fn estimated_bounds(&self) -> Bounds {
        let longest = self
            .content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        let lines = self.content.lines().count().max(1);
        Bounds {
            x: self.position.x,
            y: self.position.y,
            width: longest as f32 * self.style.font_size * Self::ADVANCE,
            height: lines as f32 * self.style.font_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    pub id: EntityId,
    pub image: ImageHandle,
    pub position: Point,
    pub width: f32,
    pub height: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub opacity: f32,
}

impl ImageLayer {
    pub const KIND: EntityKind = EntityKind::Image;

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.position.x,
            y: self.position.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// The singleton character sprite. Exists on the canvas only while an
/// image is loaded into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSlot {
    pub image: Option<ImageHandle>,
    pub position: Point,
    pub width: f32,
    pub height: f32,
}

impl CharacterSlot {
    pub const KIND: EntityKind = EntityKind::Character;

    pub fn id(&self) -> EntityId {
        EntityId::character()
    }

    pub fn is_placed(&self) -> bool {
        self.image.is_some()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.position.x,
            y: self.position.y,
            width: self.width,
            height: self.height,
        }
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    #[serde(skip)]
    pub background_image: Option<ImageHandle>,
}

impl CanvasConfig {
    /// A blank canvas. Dimensions are clamped to at least one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            background_color: Color::WHITE,
            background_image: None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(800, 400)
    }
}

/// Scale `(width, height)` to fit inside `(max_w, max_h)`, preserving aspect.
/// Never scales up.
pub fn fit_within(width: u32, height: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let scale = (max_w / w).min(max_h / h).min(1.0);
    (w * scale, h * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_forms() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("000000"), Some(Color::BLACK));
        assert_eq!(Color::from_hex("#8b5cf6").map(|c| c.to_hex()).as_deref(), Some("#8B5CF6"));
        assert_eq!(Color::from_hex("#00000080").map(|c| c.to_rgba8()[3]), Some(128));
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn color_serde_uses_hex() {
        let json = serde_json::to_string(&Color::WHITE).unwrap();
        assert_eq!(json, r##""#FFFFFF""##);
        let back: Color = serde_json::from_str(r##""#000""##).unwrap();
        assert_eq!(back, Color::BLACK);
    }

    #[test]
    fn canvas_dimensions_stay_positive() {
        let mut canvas = CanvasConfig::new(0, 0);
        assert_eq!((canvas.width, canvas.height), (1, 1));
        canvas.resize(500, 0);
        assert_eq!((canvas.width, canvas.height), (500, 1));
    }

    #[test]
    fn fit_preserves_aspect() {
        assert_eq!(fit_within(400, 200, 200.0, 200.0), (200.0, 100.0));
        assert_eq!(fit_within(50, 80, 200.0, 200.0), (50.0, 80.0));
    }

    #[test]
    fn bounds_contains_edges() {
        let b = Bounds {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        };
        assert!(b.contains(10.0, 30.0));
        assert!(!b.contains(31.0, 15.0));
    }
}
