//! Editor configuration.
//!
//! Every field has a default, so a partial JSON document only overrides
//! what it names:
//!
//! ```
//! use sparkify_core::config::{EditorConfig, TemplateSizing};
//! let config = EditorConfig::from_json(r#"{"template_sizing": "match_template"}"#).unwrap();
//! assert_eq!(config.template_sizing, TemplateSizing::MatchTemplate);
//! assert_eq!(config.canvas.width, 800);
//! ```

use crate::error::ConfigError;
use crate::model::{CanvasConfig, TextStyle};
use crate::scene::ExportFormat;
use serde::{Deserialize, Serialize};

/// What selecting a background template does to the canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSizing {
    /// Keep the current canvas dimensions and stretch the template.
    #[default]
    Fixed,
    /// Resize the canvas to the template's declared dimensions.
    MatchTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Gap kept between the canvas edge and a left/right aligned layer.
    pub margin: f32,
    /// Width assumed for text layers; text is not measured.
    pub assumed_text_width: f32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            assumed_text_width: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas used on startup and after reset.
    pub canvas: CanvasConfig,
    pub template_sizing: TemplateSizing,
    /// Maximum number of history snapshots kept.
    pub history_depth: usize,
    pub align: AlignConfig,
    pub default_text: String,
    pub text_style: TextStyle,
    /// Character sprite edge length in canvas pixels.
    pub character_size: f32,
    /// Uploaded images are scaled down to fit this box.
    pub upload_max_size: f32,
    pub duplicate_offset: f32,
    /// Transform handles cannot shrink a layer below this.
    pub min_layer_size: f32,
    pub zoom_min: u32,
    pub zoom_max: u32,
    pub export_file_name: String,
    pub export_format: ExportFormat,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            template_sizing: TemplateSizing::default(),
            history_depth: 100,
            align: AlignConfig::default(),
            default_text: "Sample Text".to_string(),
            text_style: TextStyle::default(),
            character_size: 150.0,
            upload_max_size: 200.0,
            duplicate_offset: 10.0,
            min_layer_size: 5.0,
            zoom_min: 25,
            zoom_max: 200,
            export_file_name: "sparkify-meme.png".to_string(),
            export_format: ExportFormat::Png,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json).inspect_err(|e| {
            log::warn!("config: rejected JSON: {e}");
        })?;
        config.validate().inspect_err(|e| log::warn!("config: {e}"))?;
        log::debug!(
            "config: canvas {}x{}, history depth {}",
            config.canvas.width,
            config.canvas.height,
            config.history_depth
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "history_depth",
                reason: "must keep at least one snapshot".to_string(),
            });
        }
        if self.zoom_min == 0 || self.zoom_min > self.zoom_max {
            return Err(ConfigError::Invalid {
                field: "zoom_min",
                reason: format!("{}..={} is not a valid zoom range", self.zoom_min, self.zoom_max),
            });
        }
        if !self.export_format.matches_file_name(&self.export_file_name) {
            return Err(ConfigError::Invalid {
                field: "export_file_name",
                reason: format!(
                    "`{}` does not end in {}",
                    self.export_file_name,
                    self.export_format.extensions().join(" or ")
                ),
            });
        }
        if let ExportFormat::Jpeg { quality } = self.export_format
            && !(1..=100).contains(&quality)
        {
            return Err(ConfigError::Invalid {
                field: "export_format",
                reason: format!("jpeg quality {quality} is outside 1..=100"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_validate() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.canvas.width, config.canvas.height), (800, 400));
        assert_eq!(config.export_file_name, "sparkify-meme.png");
    }

    #[test]
    fn partial_json_overrides() {
        let config = EditorConfig::from_json(
            r##"{"canvas": {"width": 500, "height": 500, "background_color": "#000"},
                "align": {"margin": 0}}"##,
        )
        .unwrap();
        assert_eq!(config.canvas.width, 500);
        assert_eq!(config.canvas.background_color, crate::model::Color::BLACK);
        assert_eq!(config.align.margin, 0.0);
        assert_eq!(config.align.assumed_text_width, 200.0);
    }

    #[test]
    fn rejects_bad_zoom_range() {
        let err = EditorConfig::from_json(r#"{"zoom_min": 300}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "zoom_min", .. }));
    }

    #[test]
    fn jpeg_export_needs_matching_name_and_quality() {
        let config = EditorConfig::from_json(
            r#"{"export_file_name": "meme.jpg", "export_format": {"format": "jpeg", "quality": 85}}"#,
        )
        .unwrap();
        assert_eq!(config.export_format, ExportFormat::Jpeg { quality: 85 });

        let err = EditorConfig::from_json(r#"{"export_format": {"format": "jpeg", "quality": 85}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "export_file_name", .. }));

        let err = EditorConfig::from_json(
            r#"{"export_file_name": "meme.jpg", "export_format": {"format": "jpeg", "quality": 0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "export_format", .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            EditorConfig::from_json("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
