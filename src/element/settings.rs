use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Tool;
use crate::geometry::Bounds;

/// Which ends of a line carry a decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LineEndSide {
    #[default]
    None = 0,
    One = 1,
    Both = 2,
}

impl TryFrom<u8> for LineEndSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LineEndSide::None),
            1 => Ok(LineEndSide::One),
            2 => Ok(LineEndSide::Both),
            other => Err(format!("invalid line end side {other}")),
        }
    }
}

impl From<LineEndSide> for u8 {
    fn from(side: LineEndSide) -> Self {
        side as u8
    }
}

/// Decoration drawn at a line end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LineEndStyle {
    #[default]
    None = 0,
    Arrow = 1,
    Circle = 2,
    Square = 3,
}

impl TryFrom<u8> for LineEndStyle {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LineEndStyle::None),
            1 => Ok(LineEndStyle::Arrow),
            2 => Ok(LineEndStyle::Circle),
            3 => Ok(LineEndStyle::Square),
            other => Err(format!("invalid line end style {other}")),
        }
    }
}

impl From<LineEndStyle> for u8 {
    fn from(style: LineEndStyle) -> Self {
        style as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSettings {
    pub line_end_side: LineEndSide,
    pub line_end_style: LineEndStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxSettings {
    pub is_checked: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextboxSettings {
    pub text_contents: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutSettings {
    pub is_completed_cut: bool,
}

/// Page-space placement of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ImageRect {
    pub fn to_bounds(&self) -> Bounds {
        Bounds::from_xywh(self.left, self.top, self.width, self.height)
    }
}

impl From<Bounds> for ImageRect {
    fn from(bounds: Bounds) -> Self {
        Self {
            left: bounds.min_x,
            top: bounds.min_y,
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSettings {
    /// PNG data URL of the placed image.
    pub image: String,
    pub rect: ImageRect,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteSettings {
    pub cut_rect: ImageRect,
    #[serde(default)]
    pub image: Option<String>,
}

/// Tool-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolSettings {
    #[default]
    None,
    Line(LineSettings),
    Checkbox(CheckboxSettings),
    Textbox(TextboxSettings),
    Cut(CutSettings),
    Image(ImageSettings),
    Paste(PasteSettings),
}

impl ToolSettings {
    pub fn default_for(tool: Tool) -> Self {
        match tool {
            Tool::Line => ToolSettings::Line(LineSettings::default()),
            Tool::Checkbox => ToolSettings::Checkbox(CheckboxSettings::default()),
            Tool::Textbox => ToolSettings::Textbox(TextboxSettings::default()),
            Tool::Cut => ToolSettings::Cut(CutSettings::default()),
            Tool::Image => ToolSettings::Image(ImageSettings::default()),
            Tool::Paste => ToolSettings::Paste(PasteSettings::default()),
            Tool::Pointer
            | Tool::Eraser
            | Tool::ClearAll
            | Tool::Pen
            | Tool::Marker
            | Tool::Highlighter
            | Tool::Blob
            | Tool::Circle
            | Tool::Rectangle
            | Tool::Triangle
            | Tool::Paper => ToolSettings::None,
        }
    }

    /// Parses the persisted payload of a `tool` element. `null` yields the defaults.
    pub fn from_value(tool: Tool, value: Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default_for(tool));
        }

        Ok(match Self::default_for(tool) {
            ToolSettings::None => ToolSettings::None,
            ToolSettings::Line(_) => ToolSettings::Line(serde_json::from_value(value)?),
            ToolSettings::Checkbox(_) => ToolSettings::Checkbox(serde_json::from_value(value)?),
            ToolSettings::Textbox(_) => ToolSettings::Textbox(serde_json::from_value(value)?),
            ToolSettings::Cut(_) => ToolSettings::Cut(serde_json::from_value(value)?),
            ToolSettings::Image(_) => ToolSettings::Image(serde_json::from_value(value)?),
            ToolSettings::Paste(_) => ToolSettings::Paste(serde_json::from_value(value)?),
        })
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            ToolSettings::None => Ok(Value::Null),
            ToolSettings::Line(s) => serde_json::to_value(s),
            ToolSettings::Checkbox(s) => serde_json::to_value(s),
            ToolSettings::Textbox(s) => serde_json::to_value(s),
            ToolSettings::Cut(s) => serde_json::to_value(s),
            ToolSettings::Image(s) => serde_json::to_value(s),
            ToolSettings::Paste(s) => serde_json::to_value(s),
        }
    }

    /// The tool this payload belongs to; `None` for tools without one.
    pub fn owner(&self) -> Option<Tool> {
        match self {
            ToolSettings::None => None,
            ToolSettings::Line(_) => Some(Tool::Line),
            ToolSettings::Checkbox(_) => Some(Tool::Checkbox),
            ToolSettings::Textbox(_) => Some(Tool::Textbox),
            ToolSettings::Cut(_) => Some(Tool::Cut),
            ToolSettings::Image(_) => Some(Tool::Image),
            ToolSettings::Paste(_) => Some(Tool::Paste),
        }
    }

    /// Whether this payload belongs to `tool`.
    pub fn fits(&self, tool: Tool) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&Self::default_for(tool))
    }

    pub fn line(&self) -> LineSettings {
        match self {
            ToolSettings::Line(line) => *line,
            _ => LineSettings::default(),
        }
    }

    pub fn is_completed_cut(&self) -> bool {
        matches!(
            self,
            ToolSettings::Cut(CutSettings {
                is_completed_cut: true
            })
        )
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, ToolSettings::Checkbox(CheckboxSettings { is_checked: true }))
    }

    pub fn text_contents(&self) -> Option<&str> {
        match self {
            ToolSettings::Textbox(textbox) => textbox.text_contents.as_deref(),
            _ => None,
        }
    }

    /// Box of a bitmap-backed element.
    pub fn image_rect(&self) -> Option<ImageRect> {
        match self {
            ToolSettings::Image(image) => Some(image.rect),
            ToolSettings::Paste(paste) => Some(paste.cut_rect),
            _ => None,
        }
    }

    /// Data URL of a bitmap-backed element's source image.
    pub fn image_data_url(&self) -> Option<&str> {
        match self {
            ToolSettings::Image(image) if !image.image.is_empty() => Some(&image.image),
            ToolSettings::Paste(paste) => paste.image.as_deref(),
            _ => None,
        }
    }
}
