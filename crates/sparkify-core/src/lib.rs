pub mod catalog;
pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod scene;

pub use catalog::{Catalog, Character, Template, TemplateCategory, filter_by_name};
pub use config::{AlignConfig, EditorConfig, TemplateSizing};
pub use error::{AssetError, ConfigError, ExportError};
pub use id::{AssetId, EntityId};
pub use model::*;
pub use scene::{ExportFormat, NodeBody, SceneNode, SceneProvider};
