use thiserror::Error;

use crate::element::Tool;
use crate::id_generator::ElementId;

/// Errors raised while hydrating or mutating scene elements
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Malformed `{field}` in element record: {source}")]
    MalformedRecord {
        field: &'static str,
        source: serde_json::Error,
    },
    #[error("Unknown tool discriminator {0}")]
    InvalidTool(i64),
    #[error("No element with uid {0}")]
    UnknownElement(ElementId),
    #[error("Element {0} is already part of the scene")]
    DuplicateElement(ElementId),
    #[error("Expected a {expected:?} element, found {found:?}")]
    WrongTool { expected: Tool, found: Tool },
    #[error("{0:?} elements cannot be drawn")]
    NotDrawable(Tool),
    #[error("Failed to serialize element: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur while rasterizing an element into its cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cannot rasterize an empty {width}x{height} bitmap")]
    EmptyBitmap { width: u32, height: u32 },
    #[error("Failed to encode bitmap: {0}")]
    Encode(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors that can occur while decoding a cached bitmap
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Not a base64 data URL")]
    NotADataUrl,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid image data: {0}")]
    Image(#[from] image::ImageError),
    #[error("Decoded image is empty")]
    Empty,
    #[error("Decode was canceled before completing")]
    Canceled(#[from] futures::channel::oneshot::Canceled),
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config data: {0}")]
    Parse(#[from] serde_json::Error),
}
