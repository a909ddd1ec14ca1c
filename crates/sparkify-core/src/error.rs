//! Error types.
//!
//! None of these are fatal. Asset failures are logged and leave the editor
//! unchanged; only export hands its error back, because the caller asked
//! for bytes.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("failed to read {source_name}: {reason}")]
    Read { source_name: String, reason: String },
    #[error("failed to decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },
    #[error("load ticket {0} is stale or unknown")]
    StaleTicket(u64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    #[error("canvas has no drawable surface")]
    NoSurface,
    #[error("failed to encode export: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
