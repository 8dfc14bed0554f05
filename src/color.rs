//! Colors as stored on elements, and their conversion to paint.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A solid color: 0-255 channels and alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 1.0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);
    pub const BLUE: Rgba = Rgba::new(0, 0, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    pub fn with_opacity(&self, opacity: f32) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..*self
        }
    }

    pub fn to_css(&self) -> String {
        if self.is_transparent() {
            "transparent".to_owned()
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_color32(&self) -> egui::Color32 {
        let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, alpha)
    }

    pub fn to_skia(&self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(
            self.r,
            self.g,
            self.b,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

/// One stop of a gradient; `percent` runs from 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub percent: f32,
    pub color: Rgba,
}

/// Element color: either solid or a list of gradient stops drawn in the given order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Solid(Rgba),
    Gradient(Vec<ColorStop>),
}

impl Default for Color {
    fn default() -> Self {
        Color::Solid(Rgba::TRANSPARENT)
    }
}

impl From<Rgba> for Color {
    fn from(rgba: Rgba) -> Self {
        Color::Solid(rgba)
    }
}

impl Color {
    /// A gradient counts as transparent only when every stop is.
    pub fn is_transparent(&self) -> bool {
        match self {
            Color::Solid(rgba) => rgba.is_transparent(),
            Color::Gradient(stops) => stops.iter().all(|stop| stop.color.is_transparent()),
        }
    }

    pub fn to_css(&self) -> String {
        match self {
            Color::Solid(rgba) => rgba.to_css(),
            Color::Gradient(stops) => {
                let stops: Vec<String> = stops
                    .iter()
                    .map(|stop| format!("{} {}%", stop.color.to_css(), stop.percent))
                    .collect();
                format!("linear-gradient(135deg, {})", stops.join(", "))
            }
        }
    }

    /// Resolves the color into paint; gradients run from `start` to `end`.
    pub fn to_paint(&self, start: Point, end: Point, opacity: f32) -> Paint {
        match self {
            Color::Solid(rgba) => Paint::Solid(rgba.with_opacity(opacity)),
            Color::Gradient(stops) => Paint::LinearGradient {
                start,
                end,
                stops: stops
                    .iter()
                    .map(|stop| {
                        (
                            (stop.percent / 100.0).clamp(0.0, 1.0),
                            stop.color.with_opacity(opacity),
                        )
                    })
                    .collect(),
            },
        }
    }

    /// Representative solid color, used where a gradient cannot be shown.
    pub fn first_solid(&self) -> Rgba {
        match self {
            Color::Solid(rgba) => *rgba,
            Color::Gradient(stops) => stops.first().map_or(Rgba::TRANSPARENT, |stop| stop.color),
        }
    }
}

/// Resolved paint for a fill or stroke operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    LinearGradient {
        start: Point,
        end: Point,
        /// `(offset in [0, 1], color)` in drawing order.
        stops: Vec<(f32, Rgba)>,
    },
}

impl Paint {
    pub fn is_transparent(&self) -> bool {
        match self {
            Paint::Solid(rgba) => rgba.is_transparent(),
            Paint::LinearGradient { stops, .. } => stops.iter().all(|(_, c)| c.is_transparent()),
        }
    }
}
