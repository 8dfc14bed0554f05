//! Page-space geometry shared by the smoother, the dimension calculator and the renderer.

use serde::{Deserialize, Serialize};

mod hit_testing;
mod path;

pub use hit_testing::{distance_to_segment, hit_test};
pub use path::{PathCommand, PathData};

/// A pointer sample or shape vertex in page space.
///
/// `pressure` is only present for samples that came from a pressure-aware
/// device; it is always in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pressure: None,
        }
    }

    pub fn with_pressure(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure.clamp(0.0, 1.0)),
        }
    }

    pub fn distance(&self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for egui::Pos2 {
    fn from(point: Point) -> Self {
        egui::pos2(point.x, point.y)
    }
}

/// Axis-aligned box in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Smallest box containing every coordinate pair, or `None` for an empty input.
    pub fn from_coords<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut iter = coords.into_iter();
        let (x, y) = iter.next()?;
        let mut bounds = Bounds::new(x, y, x, y);

        for (x, y) in iter {
            bounds.min_x = bounds.min_x.min(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_x = bounds.max_x.max(x);
            bounds.max_y = bounds.max_y.max(y);
        }

        Some(bounds)
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        Self::from_coords(points.iter().map(|p| (p.x, p.y)))
    }

    pub fn from_polygon(polygon: &[[f32; 2]]) -> Option<Self> {
        Self::from_coords(polygon.iter().map(|[x, y]| (*x, *y)))
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn diagonal(&self) -> f32 {
        self.width().hypot(self.height())
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grows the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    pub fn to_rect(&self) -> egui::Rect {
        egui::Rect::from_min_max(
            egui::pos2(self.min_x, self.min_y),
            egui::pos2(self.max_x, self.max_y),
        )
    }
}
