//! Turns elements into paint programs and executes them against a surface.
//!
//! Each tool has one branch in [`paint_program`]. A program is a flat list
//! of [`PaintOp`]s in page space; surfaces decide how to rasterize them.

mod pixmap;
mod recording;

pub use pixmap::PixmapSurface;
pub use recording::RecordingSurface;

use crate::cache::Bitmap;
use crate::color::{Paint, Rgba};
use crate::element::{
    Composition, Element, LineEndStyle, Tool, arrow_segments, cap_pairs,
};
use crate::geometry::{Bounds, PathData, Point};

/// Line width of the incomplete cut's white under-stroke.
const CUT_OUTLINE_WIDTH: f32 = 4.0;
/// Line width of the incomplete cut's blue over-stroke.
const CUT_MARCH_WIDTH: f32 = 2.0;
const CUT_DASH: [f32; 2] = [10.0, 10.0];
/// Width of a line's decorative pass, relative to its size.
const LINE_DECORATION_SCALE: f32 = 1.5;

const PLACEHOLDER_FILL: Rgba = Rgba::new(200, 200, 200, 1.0);
const PLACEHOLDER_STROKE: Rgba = Rgba::new(100, 100, 100, 1.0);
const DEBUG_OUTLINE: Rgba = Rgba::new(255, 0, 255, 1.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawOptions {
    /// Rendering into the element's own cache bitmap.
    pub is_caching: bool,
    /// Outline the outer box.
    pub is_debug: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub dash: Option<Vec<f32>>,
}

impl StrokeStyle {
    pub fn solid(width: f32) -> Self {
        Self { width, dash: None }
    }

    pub fn dashed(width: f32, dash: &[f32]) -> Self {
        Self {
            width,
            dash: Some(dash.to_vec()),
        }
    }
}

/// How overlapping subpaths of a fill decide what is inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    Winding,
    /// Areas covered an even number of times stay empty.
    EvenOdd,
}

/// One drawing operation in page space. Strokes use round caps and joins.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill {
        path: PathData,
        paint: Paint,
        fill_rule: FillRule,
        composition: Composition,
    },
    Stroke {
        path: PathData,
        paint: Paint,
        style: StrokeStyle,
        composition: Composition,
    },
    /// Draw a bitmap stretched over `bounds`.
    Blit {
        bitmap: Bitmap,
        bounds: Bounds,
        composition: Composition,
    },
}

impl PaintOp {
    pub fn composition(&self) -> Composition {
        match self {
            PaintOp::Fill { composition, .. }
            | PaintOp::Stroke { composition, .. }
            | PaintOp::Blit { composition, .. } => *composition,
        }
    }
}

/// Something paint operations can be executed against.
pub trait Surface {
    fn execute(&mut self, op: &PaintOp);
}

/// Draws `element` onto `surface`.
pub fn draw<S: Surface + ?Sized>(surface: &mut S, element: &Element, options: DrawOptions) {
    for op in paint_program(element, options) {
        surface.execute(&op);
    }
}

/// The paint operations that draw `element`.
///
/// Hidden, interactive and zero-sized elements produce an empty program.
/// Outside of caching, an element with a decoded cache bitmap is drawn by
/// blitting it instead of running its tool branch.
pub fn paint_program(element: &Element, options: DrawOptions) -> Vec<PaintOp> {
    let dimensions = element.dimensions();
    if element.is_html_element() || element.is_hidden() || !dimensions.is_drawable() {
        return Vec::new();
    }

    let tool = element.tool();
    let composition = if options.is_caching
        && matches!(tool, Tool::Eraser | Tool::Cut | Tool::ClearAll)
    {
        Composition::SourceOver
    } else {
        element.composition()
    };

    let mut program = Program::new(element, composition);

    match element.cached_bitmap() {
        Some(bitmap) if !options.is_caching || tool.is_bitmap_backed() => {
            program.ops.push(PaintOp::Blit {
                bitmap: bitmap.clone(),
                bounds: dimensions.outer(),
                composition,
            });
        }
        _ => program.tool_branch(),
    }

    if options.is_debug {
        let mut outline = PathData::new();
        let outer = dimensions.outer();
        outline.rect(
            Point::new(outer.min_x, outer.min_y),
            Point::new(outer.max_x, outer.max_y),
        );
        program.ops.push(PaintOp::Stroke {
            path: outline,
            paint: Paint::Solid(DEBUG_OUTLINE),
            style: StrokeStyle::solid(1.0),
            composition: Composition::SourceOver,
        });
    }

    program.ops
}

/// Quadratic curve through the points: each point is a control point and
/// segments end halfway to the next point, except the last which ends on it.
fn curve_path(points: &[Point]) -> PathData {
    let mut path = PathData::new();
    let Some(first) = points.first() else {
        return path;
    };

    path.move_to(*first);
    let n = points.len();
    for i in 0..n.saturating_sub(2) {
        path.quad_to(points[i], points[i].midpoint(points[i + 1]));
    }
    if n >= 2 {
        path.quad_to(points[n - 2], points[n - 1]);
    }
    path
}

struct Program<'a> {
    element: &'a Element,
    composition: Composition,
    stroke_paint: Paint,
    fill_paint: Paint,
    ops: Vec<PaintOp>,
}

impl<'a> Program<'a> {
    fn new(element: &'a Element, composition: Composition) -> Self {
        let points = element.points();
        let outer = element.dimensions().outer();
        let start = points
            .first()
            .copied()
            .unwrap_or(Point::new(outer.min_x, outer.min_y));
        let end = points
            .last()
            .copied()
            .unwrap_or(Point::new(outer.max_x, outer.max_y));
        let opacity = element.canvas_settings().opacity;

        Self {
            element,
            composition,
            stroke_paint: element.stroke_color().to_paint(start, end, opacity),
            fill_paint: element.fill_color().to_paint(start, end, opacity),
            ops: Vec::new(),
        }
    }

    fn fill(&mut self, path: PathData, paint: &Paint) {
        self.fill_with_rule(path, paint, FillRule::Winding);
    }

    fn fill_with_rule(&mut self, path: PathData, paint: &Paint, fill_rule: FillRule) {
        if path.is_empty() || paint.is_transparent() {
            return;
        }
        self.ops.push(PaintOp::Fill {
            path,
            paint: paint.clone(),
            fill_rule,
            composition: self.composition,
        });
    }

    fn stroke(&mut self, path: PathData, paint: &Paint, style: StrokeStyle) {
        if path.is_empty() || paint.is_transparent() || style.width <= 0.0 {
            return;
        }
        self.ops.push(PaintOp::Stroke {
            path,
            paint: paint.clone(),
            style,
            composition: self.composition,
        });
    }

    fn fill_and_stroke(&mut self, path: PathData) {
        let (fill, stroke) = (self.fill_paint.clone(), self.stroke_paint.clone());
        let width = self.element.size();
        self.fill(path.clone(), &fill);
        self.stroke(path, &stroke, StrokeStyle::solid(width));
    }

    fn tool_branch(&mut self) {
        let element = self.element;
        let inner = element.dimensions().inner();
        let points = element.points();

        match element.tool() {
            Tool::Pen | Tool::Marker | Tool::Highlighter => self.freehand(),
            Tool::Circle => {
                let mut path = PathData::new();
                path.ellipse(inner.center(), inner.width() / 2.0, inner.height() / 2.0);
                self.fill_and_stroke(path);
            }
            Tool::Rectangle => {
                let mut path = PathData::new();
                path.rect(
                    Point::new(inner.min_x, inner.min_y),
                    Point::new(inner.max_x, inner.max_y),
                );
                self.fill_and_stroke(path);
            }
            Tool::Triangle => {
                if let [a, b, c, ..] = points {
                    let mut path = PathData::new();
                    path.move_to(*a).line_to(*b).line_to(*c).close();
                    self.fill_and_stroke(path);
                }
            }
            Tool::Line => self.line(),
            Tool::Blob => {
                let mut path = curve_path(points);
                path.close();
                let fill = self.fill_paint.clone();
                let outline = if self.stroke_paint.is_transparent() {
                    fill.clone()
                } else {
                    self.stroke_paint.clone()
                };
                self.fill(path.clone(), &fill);
                self.stroke(path, &outline, StrokeStyle::solid(element.size()));
            }
            Tool::Eraser => {
                let path = curve_path(points);
                self.stroke(path, &Paint::Solid(Rgba::WHITE), StrokeStyle::solid(element.size()));
            }
            Tool::Cut => {
                let mut path = curve_path(points);
                if element.settings().is_completed_cut() {
                    path.close();
                    self.fill(path, &Paint::Solid(Rgba::WHITE));
                } else {
                    self.stroke(
                        path.clone(),
                        &Paint::Solid(Rgba::WHITE),
                        StrokeStyle::dashed(CUT_OUTLINE_WIDTH, &CUT_DASH),
                    );
                    self.stroke(
                        path,
                        &Paint::Solid(Rgba::BLUE),
                        StrokeStyle::dashed(CUT_MARCH_WIDTH, &CUT_DASH),
                    );
                }
            }
            Tool::ClearAll => {
                let mut path = PathData::new();
                path.rect(
                    Point::new(inner.min_x, inner.min_y),
                    Point::new(inner.max_x, inner.max_y),
                );
                self.fill(path, &Paint::Solid(Rgba::WHITE));
            }
            Tool::Image | Tool::Paste => {
                // Shown until the source bitmap is decoded.
                let mut path = PathData::new();
                path.rect(
                    Point::new(inner.min_x, inner.min_y),
                    Point::new(inner.max_x, inner.max_y),
                );
                self.fill(path.clone(), &Paint::Solid(PLACEHOLDER_FILL));
                self.stroke(path, &Paint::Solid(PLACEHOLDER_STROKE), StrokeStyle::solid(1.0));
            }
            Tool::Pointer | Tool::Paper | Tool::Checkbox | Tool::Textbox => {}
        }
    }

    /// Halo in the stroke color, then the ink body in the fill color.
    ///
    /// With a transparent fill only the ring between halo and body is
    /// painted, so whatever lies under the body shows through.
    fn freehand(&mut self) {
        let Some(smooth) = self.element.smooth_points() else {
            return;
        };
        if smooth.path.is_empty() {
            return;
        }

        let stroke = self.stroke_paint.clone();
        if self.fill_paint.is_transparent() {
            let mut ring = smooth.stroke_commands();
            ring.append(&smooth.path_commands());
            self.fill_with_rule(ring, &stroke, FillRule::EvenOdd);
        } else {
            let fill = self.fill_paint.clone();
            self.fill(smooth.stroke_commands(), &stroke);
            self.fill(smooth.path_commands(), &fill);
        }
    }

    /// Wide decorative pass in the stroke color, then the core line and caps
    /// at nominal width in the fill color.
    fn line(&mut self) {
        let element = self.element;
        let points = element.points();
        let (Some(from), Some(to)) = (points.first().copied(), points.last().copied()) else {
            return;
        };
        let size = element.size();
        let style = element.settings().line().line_end_style;

        let mut shaft = PathData::new();
        shaft.move_to(from).line_to(to);

        let passes = [
            (self.stroke_paint.clone(), size * LINE_DECORATION_SCALE, true),
            (self.fill_paint.clone(), size, false),
        ];
        for (paint, width, decorative) in passes {
            self.stroke(shaft.clone(), &paint, StrokeStyle::solid(width));

            match style {
                LineEndStyle::Arrow => {
                    let mut rays = PathData::new();
                    for (tip, end) in arrow_segments(points) {
                        rays.move_to(tip).line_to(end);
                    }
                    self.stroke(rays, &paint, StrokeStyle::solid(width));
                }
                LineEndStyle::Square => {
                    let mut caps = PathData::new();
                    for (a, b) in cap_pairs(points) {
                        caps.rect(a, b);
                    }
                    self.fill(caps.clone(), &paint);
                    if decorative {
                        self.stroke(caps, &paint, StrokeStyle::solid(size / 2.0));
                    }
                }
                LineEndStyle::Circle => {
                    let mut caps = PathData::new();
                    for (a, b) in cap_pairs(points) {
                        let radius = a.distance(b) / 2.0;
                        caps.ellipse(a.midpoint(b), radius, radius);
                    }
                    self.fill(caps.clone(), &paint);
                    if decorative {
                        self.stroke(caps, &paint, StrokeStyle::solid(size / 2.0));
                    }
                }
                LineEndStyle::None => {}
            }
        }
    }
}
