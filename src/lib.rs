#![warn(clippy::all, rust_2018_idioms)]

pub mod cache;
pub mod color;
pub mod config;
pub mod dimensions;
pub mod draft;
pub mod element;
pub mod error;
pub mod geometry;
pub mod id_generator;
pub mod overlay;
pub mod renderer;
pub mod scene;
pub mod stroke;

pub use cache::Bitmap;
pub use color::{Color, ColorStop, Rgba};
pub use config::SceneConfig;
pub use dimensions::{Dimensions, dimensions_for};
pub use draft::ElementDraft;
pub use element::record::ElementRecord;
pub use element::{Element, ElementStyle, Tool, ToolSettings, factory};
pub use error::{CacheError, ConfigError, DecodeError, SceneError};
pub use geometry::{Bounds, Point, hit_test};
pub use id_generator::ElementId;
pub use overlay::{InteractiveOverlay, OverlayEdit};
pub use renderer::{DrawOptions, FillRule, PaintOp, PixmapSurface, RecordingSurface, Surface, draw};
pub use scene::{HistoryEvent, HistoryEventKind, Scene};
pub use stroke::{FreehandOptions, SmoothPoints};
