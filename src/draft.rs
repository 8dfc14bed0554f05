//! Elements under construction.
//!
//! A draft follows the pointer from press to release. It is not part of
//! any scene until it is finished, so cancelling it leaves no history.

use crate::config::SceneConfig;
use crate::element::{Element, ElementStyle, Tool};
use crate::error::SceneError;
use crate::geometry::{Bounds, Point};
use crate::stroke::FreehandOptions;

/// How pointer motion shapes the draft's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    /// Every sample is kept.
    Trace,
    /// Two opposite corners.
    Drag,
    /// Apex at the top center of the dragged box.
    Triangle,
    /// Anchor to pointer; end geometry follows.
    Line,
}

impl Gesture {
    fn for_tool(tool: Tool) -> Option<Self> {
        match tool {
            Tool::Pen
            | Tool::Marker
            | Tool::Highlighter
            | Tool::Blob
            | Tool::Eraser
            | Tool::Cut => Some(Gesture::Trace),
            Tool::Rectangle | Tool::Circle | Tool::ClearAll => Some(Gesture::Drag),
            Tool::Triangle => Some(Gesture::Triangle),
            Tool::Line => Some(Gesture::Line),
            Tool::Pointer
            | Tool::Paste
            | Tool::Image
            | Tool::Checkbox
            | Tool::Textbox
            | Tool::Paper => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElementDraft {
    element: Element,
    gesture: Gesture,
    anchor: Point,
    current: Point,
}

impl ElementDraft {
    /// Starts drawing a `tool` element at `start`.
    pub fn begin(
        page_id: &str,
        tool: Tool,
        start: Point,
        style: ElementStyle,
        config: &SceneConfig,
    ) -> Result<Self, SceneError> {
        let gesture = Gesture::for_tool(tool).ok_or(SceneError::NotDrawable(tool))?;
        let points = match gesture {
            Gesture::Trace => vec![start],
            Gesture::Drag | Gesture::Line => vec![start, start],
            Gesture::Triangle => vec![start; 3],
        };

        let mut element = Element::new(page_id, tool, points, style)
            .with_device_pixel_ratio(config.device_pixel_ratio);
        if tool.is_freehand_line() {
            // The last sample is still moving until the stroke is finished.
            element = element.with_freehand(FreehandOptions {
                last: false,
                ..config.freehand
            });
        }

        log::debug!("Started {} draft", tool.label());
        Ok(Self {
            element,
            gesture,
            anchor: start,
            current: start,
        })
    }

    pub fn tool(&self) -> Tool {
        self.element.tool()
    }

    /// Follows the pointer to `point`.
    pub fn extend(&mut self, point: Point) {
        self.current = point;
        match self.gesture {
            Gesture::Trace => self.element.push_point(point),
            Gesture::Drag | Gesture::Line => self.element.set_points(vec![self.anchor, point]),
            Gesture::Triangle => {
                let Some(bounds) = Bounds::from_points(&[self.anchor, point]) else {
                    return;
                };
                self.element.set_points(vec![
                    Point::new(bounds.center().x, bounds.min_y),
                    Point::new(bounds.max_x, bounds.max_y),
                    Point::new(bounds.min_x, bounds.max_y),
                ]);
            }
        }
    }

    /// The element as it would be committed now, for live drawing.
    pub fn preview(&self) -> &Element {
        &self.element
    }

    /// Whether finishing now would produce nothing.
    pub fn is_degenerate(&self) -> bool {
        match self.gesture {
            Gesture::Trace => self.element.points().len() < 2,
            Gesture::Drag | Gesture::Triangle | Gesture::Line => self.anchor == self.current,
        }
    }

    /// The finished element, or `None` when it has no extent.
    pub fn finish(self) -> Option<Element> {
        if self.is_degenerate() {
            log::debug!("Dropped degenerate {} draft", self.tool().label());
            return None;
        }

        let mut element = self.element;
        if element.tool().is_freehand_line() {
            let options = FreehandOptions {
                last: true,
                ..*element.freehand()
            };
            element = element.with_freehand(options);
        }
        Some(element)
    }

    /// Discards the draft.
    pub fn cancel(self) {
        log::debug!("Cancelled {} draft", self.tool().label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(tool: Tool, start: Point) -> ElementDraft {
        ElementDraft::begin("page", tool, start, ElementStyle::default(), &SceneConfig::default())
            .unwrap()
    }

    #[test]
    fn rectangle_tracks_two_corners() {
        let mut draft = begin(Tool::Rectangle, Point::new(10.0, 10.0));
        draft.extend(Point::new(20.0, 15.0));
        draft.extend(Point::new(40.0, 30.0));

        let element = draft.finish().unwrap();
        assert_eq!(element.points(), [Point::new(10.0, 10.0), Point::new(40.0, 30.0)]);
    }

    #[test]
    fn triangle_apex_is_top_center() {
        let mut draft = begin(Tool::Triangle, Point::new(0.0, 40.0));
        draft.extend(Point::new(60.0, 0.0));

        let element = draft.finish().unwrap();
        assert_eq!(
            element.points(),
            [Point::new(30.0, 0.0), Point::new(60.0, 40.0), Point::new(0.0, 40.0)]
        );
    }

    #[test]
    fn pen_collects_samples_and_finalizes() {
        let mut draft = begin(Tool::Pen, Point::new(0.0, 0.0));
        assert!(draft.is_degenerate());
        draft.extend(Point::new(10.0, 0.0));
        draft.extend(Point::new(20.0, 5.0));
        assert!(!draft.preview().freehand().last);

        let element = draft.finish().unwrap();
        assert_eq!(element.points().len(), 3);
        assert!(element.freehand().last);
        assert!(element.smooth_points().is_some_and(|smooth| !smooth.is_empty()));
    }

    #[test]
    fn click_without_drag_yields_nothing() {
        let draft = begin(Tool::Circle, Point::new(5.0, 5.0));
        assert!(draft.finish().is_none());
    }

    #[test]
    fn interactive_tools_are_not_drafted() {
        let result = ElementDraft::begin(
            "page",
            Tool::Checkbox,
            Point::new(0.0, 0.0),
            ElementStyle::default(),
            &SceneConfig::default(),
        );
        assert!(matches!(result, Err(SceneError::NotDrawable(Tool::Checkbox))));
    }
}
