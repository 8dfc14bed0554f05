use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Placement of an interactive element relative to the view it was created in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementTransform {
    /// Offset from the view origin, in page units
    pub translate: [f32; 2],
    /// Scale factor (1.0 = original size)
    pub scale: [f32; 2],
    /// Rotation in degrees
    pub rotate: f32,
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self {
            translate: [0.0, 0.0],
            scale: [1.0, 1.0],
            rotate: 0.0,
        }
    }
}

impl ElementTransform {
    /// Identity transform anchored at `anchor`.
    pub fn at(anchor: Point) -> Self {
        Self {
            translate: [anchor.x, anchor.y],
            ..Self::default()
        }
    }

    /// Screen placement under the `current` view, given the view the element
    /// was created under.
    pub fn relative_to(&self, current: &ViewMatrix, initial: &ViewMatrix) -> Placement {
        let initial_zoom = if initial.a == 0.0 { 1.0 } else { initial.a };
        let zoom = current.a / initial_zoom;
        let (origin_x, origin_y) = (current.e / initial_zoom, current.f / initial_zoom);

        Placement {
            translate: Point::new(
                origin_x + self.translate[0] * zoom,
                origin_y + self.translate[1] * zoom,
            ),
            scale: [self.scale[0] * zoom, self.scale[1] * zoom],
            rotate: self.rotate,
        }
    }
}

/// The zoom (`a`) and offset (`e`, `f`) part of a 2D view matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMatrix {
    pub a: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for ViewMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

/// Resolved screen placement of an interactive element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translate: Point,
    pub scale: [f32; 2],
    pub rotate: f32,
}
