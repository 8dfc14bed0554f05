//! Inner and outer bounding boxes of elements.
//!
//! The inner box covers the element's geometry; the outer box adds the
//! margin its stroke paints beyond that geometry. The outer box sizes the
//! cache bitmap and bounds hit testing.

use serde::{Deserialize, Serialize};

use crate::element::{Element, Tool};
use crate::geometry::Bounds;

/// Margin of a straight line with a visible stroke, relative to its size.
const LINE_STROKE_MARGIN: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub outer_min_x: f32,
    pub outer_min_y: f32,
    pub outer_max_x: f32,
    pub outer_max_y: f32,
    pub width: f32,
    pub height: f32,
    pub outer_width: f32,
    pub outer_height: f32,
    pub line_length: Option<f32>,
}

impl Dimensions {
    pub fn from_boxes(inner: Bounds, outer: Bounds, line_length: Option<f32>) -> Self {
        Self {
            min_x: inner.min_x,
            min_y: inner.min_y,
            max_x: inner.max_x,
            max_y: inner.max_y,
            outer_min_x: outer.min_x,
            outer_min_y: outer.min_y,
            outer_max_x: outer.max_x,
            outer_max_y: outer.max_y,
            width: inner.width(),
            height: inner.height(),
            outer_width: outer.width(),
            outer_height: outer.height(),
            line_length,
        }
    }

    pub fn inner(&self) -> Bounds {
        Bounds::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn outer(&self) -> Bounds {
        Bounds::new(
            self.outer_min_x,
            self.outer_min_y,
            self.outer_max_x,
            self.outer_max_y,
        )
    }

    /// A zero-area outer box paints nothing.
    pub fn is_drawable(&self) -> bool {
        self.outer_width > 0.0 && self.outer_height > 0.0
    }
}

pub fn dimensions_for(element: &Element) -> Dimensions {
    let tool = element.tool();

    if tool.is_bitmap_backed() {
        if let Some(rect) = element.settings().image_rect() {
            let bounds = rect.to_bounds();
            return Dimensions::from_boxes(bounds, bounds, None);
        }
    }

    let size = element.size().max(0.0);
    let stroke_visible = !element.stroke_color().is_transparent();
    let smooth = element
        .smooth_points()
        .filter(|_| tool.is_freehand_line());

    let inner = smooth
        .and_then(|smooth| Bounds::from_polygon(&smooth.path))
        .or_else(|| Bounds::from_points(element.points()))
        .unwrap_or_default();

    let outer = if tool.is_freehand_line() {
        match smooth.and_then(|smooth| Bounds::from_polygon(&smooth.stroke)) {
            Some(halo) if stroke_visible => halo.union(&inner),
            _ => inner,
        }
    } else if tool == Tool::Line {
        let margin = if stroke_visible {
            size * LINE_STROKE_MARGIN
        } else {
            size / 2.0
        };
        inner.expand(margin)
    } else if stroke_visible || matches!(tool, Tool::Blob | Tool::Eraser) {
        inner.expand(size / 2.0)
    } else {
        inner
    };

    let line_length = (tool.is_freehand_line() || tool == Tool::Line).then(|| inner.diagonal());

    Dimensions::from_boxes(inner, outer, line_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, Rgba};
    use crate::element::{ElementStyle, ImageRect, factory};
    use crate::geometry::Point;

    fn style(stroke: Rgba, size: f32) -> ElementStyle {
        ElementStyle {
            stroke_color: Color::Solid(stroke),
            fill_color: Color::Solid(Rgba::BLACK),
            size,
        }
    }

    #[test]
    fn rectangle_without_stroke_has_no_margin() {
        let element = factory::create(
            "page",
            Tool::Rectangle,
            vec![Point::new(0.0, 0.0), Point::new(50.0, 20.0)],
            style(Rgba::TRANSPARENT, 10.0),
        );
        let dims = element.dimensions();

        assert_eq!(dims.inner(), dims.outer());
        assert_eq!(dims.line_length, None);
    }

    #[test]
    fn blob_always_gets_half_size_margin() {
        let element = factory::create(
            "page",
            Tool::Blob,
            vec![Point::new(0.0, 0.0), Point::new(50.0, 20.0)],
            style(Rgba::TRANSPARENT, 10.0),
        );
        assert_eq!(
            element.dimensions().outer(),
            Bounds::new(-5.0, -5.0, 55.0, 25.0)
        );
    }

    #[test]
    fn line_margin_depends_on_stroke() {
        let from = Point::new(0.0, 0.0);
        let to = Point::new(100.0, 0.0);

        let plain = factory::line(
            "page",
            from,
            to,
            Default::default(),
            style(Rgba::TRANSPARENT, 8.0),
        );
        assert_eq!(plain.dimensions().outer(), Bounds::new(-4.0, -4.0, 104.0, 4.0));
        assert_eq!(plain.dimensions().line_length, Some(100.0));

        let stroked = factory::line("page", from, to, Default::default(), style(Rgba::BLACK, 8.0));
        assert_eq!(stroked.dimensions().outer(), Bounds::new(-6.0, -6.0, 106.0, 6.0));
    }

    #[test]
    fn image_box_comes_from_its_rect() {
        let rect = ImageRect {
            left: 10.0,
            top: 20.0,
            width: 30.0,
            height: 40.0,
        };
        let element = factory::image("page", String::new(), rect);
        let dims = element.dimensions();

        assert_eq!(dims.inner(), Bounds::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(dims.outer(), dims.inner());
    }

    #[test]
    fn single_point_is_zero_sized_but_valid() {
        let element = factory::create(
            "page",
            Tool::Pen,
            vec![Point::new(3.0, 4.0)],
            style(Rgba::TRANSPARENT, 10.0),
        );
        let dims = element.dimensions();

        assert_eq!(dims.width, 0.0);
        assert_eq!(dims.height, 0.0);
        assert!(!dims.is_drawable());
    }
}
