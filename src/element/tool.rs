use serde::{Deserialize, Serialize};

use super::settings::ToolSettings;
use crate::error::SceneError;

/// The fixed kind of an element. Discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Tool {
    Pointer = 0,
    Eraser = 1,
    ClearAll = 2,
    Pen = 10,
    Marker = 11,
    Highlighter = 12,
    Blob = 20,
    Circle = 30,
    Rectangle = 31,
    Triangle = 32,
    Line = 33,
    Cut = 40,
    Paste = 41,
    Image = 50,
    Checkbox = 60,
    Textbox = 61,
    Paper = 70,
}

impl Tool {
    pub const ALL: [Tool; 17] = [
        Tool::Pointer,
        Tool::Eraser,
        Tool::ClearAll,
        Tool::Pen,
        Tool::Marker,
        Tool::Highlighter,
        Tool::Blob,
        Tool::Circle,
        Tool::Rectangle,
        Tool::Triangle,
        Tool::Line,
        Tool::Cut,
        Tool::Paste,
        Tool::Image,
        Tool::Checkbox,
        Tool::Textbox,
        Tool::Paper,
    ];

    pub fn discriminant(self) -> i64 {
        self as i64
    }

    /// Tools whose ink is the smoothed outline of the pointer samples.
    pub fn is_freehand_line(self) -> bool {
        matches!(self, Tool::Pen | Tool::Marker | Tool::Highlighter)
    }

    /// Tools shown as interactive overlays instead of being painted.
    pub fn is_interactive(self) -> bool {
        matches!(self, Tool::Checkbox | Tool::Textbox)
    }

    /// Tools that never produce an element of their own.
    pub fn is_non_drawing(self) -> bool {
        matches!(self, Tool::Paper | Tool::Pointer | Tool::ClearAll)
    }

    pub fn is_paper(self) -> bool {
        self == Tool::Paper
    }

    /// Tools whose cache holds a source image rather than a rasterization.
    pub fn is_bitmap_backed(self) -> bool {
        matches!(self, Tool::Image | Tool::Paste)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Pointer => "Pointer",
            Tool::Eraser => "Eraser",
            Tool::ClearAll => "Clear all",
            Tool::Pen => "Pen",
            Tool::Marker => "Marker",
            Tool::Highlighter => "Highlighter",
            Tool::Blob => "Blob",
            Tool::Circle => "Circle",
            Tool::Rectangle => "Rectangle",
            Tool::Triangle => "Triangle",
            Tool::Line => "Line",
            Tool::Cut => "Cut",
            Tool::Paste => "Paste",
            Tool::Image => "Image",
            Tool::Checkbox => "Checkbox",
            Tool::Textbox => "Textbox",
            Tool::Paper => "Paper",
        }
    }
}

impl TryFrom<i64> for Tool {
    type Error = SceneError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.discriminant() == value)
            .ok_or(SceneError::InvalidTool(value))
    }
}

impl From<Tool> for i64 {
    fn from(tool: Tool) -> Self {
        tool.discriminant()
    }
}

/// Blend mode an element is composited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Composition {
    #[default]
    SourceOver,
    DestinationOut,
    Multiply,
    Hue,
}

impl Composition {
    pub fn for_element(tool: Tool, settings: &ToolSettings) -> Self {
        match tool {
            Tool::Eraser | Tool::ClearAll => Composition::DestinationOut,
            Tool::Marker => Composition::Multiply,
            Tool::Highlighter => Composition::Hue,
            Tool::Cut if settings.is_completed_cut() => Composition::DestinationOut,
            _ => Composition::SourceOver,
        }
    }
}
