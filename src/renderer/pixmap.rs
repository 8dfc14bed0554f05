use tiny_skia as sk;

use super::{FillRule, PaintOp, StrokeStyle, Surface};
use crate::color::Paint;
use crate::element::Composition;
use crate::geometry::{Bounds, PathCommand, PathData};

/// Rasterizes paint operations into a tiny-skia pixmap.
pub struct PixmapSurface {
    pixmap: sk::Pixmap,
    transform: sk::Transform,
}

impl PixmapSurface {
    /// A transparent surface mapping page space 1:1 onto pixels.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: sk::Pixmap::new(width, height)?,
            transform: sk::Transform::identity(),
        })
    }

    /// A surface covering `outer` at `dpr` pixels per page unit.
    pub fn for_element_cache(outer: Bounds, dpr: f32) -> Option<Self> {
        let dpr = if dpr > 0.0 { dpr } else { 1.0 };
        let width = (outer.width() * dpr).ceil();
        let height = (outer.height() * dpr).ceil();
        if !(width >= 1.0 && height >= 1.0) {
            return None;
        }

        Some(Self {
            pixmap: sk::Pixmap::new(width as u32, height as u32)?,
            transform: sk::Transform::from_scale(dpr, dpr)
                .pre_translate(-outer.min_x, -outer.min_y),
        })
    }

    pub fn with_transform(mut self, transform: sk::Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn pixmap(&self) -> &sk::Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> sk::Pixmap {
        self.pixmap
    }
}

impl Surface for PixmapSurface {
    fn execute(&mut self, op: &PaintOp) {
        match op {
            PaintOp::Fill {
                path,
                paint,
                fill_rule,
                composition,
            } => {
                let (Some(path), Some(paint)) = (to_path(path), to_paint(paint, *composition))
                else {
                    return;
                };
                let rule = match fill_rule {
                    FillRule::Winding => sk::FillRule::Winding,
                    FillRule::EvenOdd => sk::FillRule::EvenOdd,
                };
                self.pixmap.fill_path(&path, &paint, rule, self.transform, None);
            }
            PaintOp::Stroke {
                path,
                paint,
                style,
                composition,
            } => {
                let (Some(path), Some(paint)) = (to_path(path), to_paint(paint, *composition))
                else {
                    return;
                };
                self.pixmap
                    .stroke_path(&path, &paint, &to_stroke(style), self.transform, None);
            }
            PaintOp::Blit {
                bitmap,
                bounds,
                composition,
            } => {
                if bitmap.width() == 0 || bitmap.height() == 0 {
                    return;
                }
                let transform = self.transform.pre_translate(bounds.min_x, bounds.min_y).pre_scale(
                    bounds.width() / bitmap.width() as f32,
                    bounds.height() / bitmap.height() as f32,
                );
                let paint = sk::PixmapPaint {
                    blend_mode: blend_mode(*composition),
                    quality: sk::FilterQuality::Bilinear,
                    ..sk::PixmapPaint::default()
                };
                self.pixmap
                    .draw_pixmap(0, 0, bitmap.pixmap().as_ref(), &paint, transform, None);
            }
        }
    }
}

fn blend_mode(composition: Composition) -> sk::BlendMode {
    match composition {
        Composition::SourceOver => sk::BlendMode::SourceOver,
        Composition::DestinationOut => sk::BlendMode::DestinationOut,
        Composition::Multiply => sk::BlendMode::Multiply,
        Composition::Hue => sk::BlendMode::Hue,
    }
}

fn to_path(path: &PathData) -> Option<sk::Path> {
    let mut pb = sk::PathBuilder::new();
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo { x, y } => pb.move_to(x, y),
            PathCommand::LineTo { x, y } => pb.line_to(x, y),
            PathCommand::QuadTo { cx, cy, x, y } => pb.quad_to(cx, cy, x, y),
            PathCommand::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => pb.cubic_to(c1x, c1y, c2x, c2y, x, y),
            PathCommand::Close => pb.close(),
        }
    }
    pb.finish()
}

fn to_paint(paint: &Paint, composition: Composition) -> Option<sk::Paint<'static>> {
    let shader = match paint {
        Paint::Solid(rgba) => sk::Shader::SolidColor(rgba.to_skia()),
        Paint::LinearGradient { start, end, stops } => {
            let gradient_stops: Vec<sk::GradientStop> = stops
                .iter()
                .map(|(offset, color)| sk::GradientStop::new(*offset, color.to_skia()))
                .collect();
            let fallback = stops.first().map(|(_, color)| color.to_skia())?;
            sk::LinearGradient::new(
                sk::Point::from_xy(start.x, start.y),
                sk::Point::from_xy(end.x, end.y),
                gradient_stops,
                sk::SpreadMode::Pad,
                sk::Transform::identity(),
            )
            .unwrap_or(sk::Shader::SolidColor(fallback))
        }
    };

    let mut paint = sk::Paint::default();
    paint.shader = shader;
    paint.blend_mode = blend_mode(composition);
    paint.anti_alias = true;
    Some(paint)
}

fn to_stroke(style: &StrokeStyle) -> sk::Stroke {
    sk::Stroke {
        width: style.width,
        line_cap: sk::LineCap::Round,
        line_join: sk::LineJoin::Round,
        dash: style
            .dash
            .as_ref()
            .and_then(|dash| sk::StrokeDash::new(dash.clone(), 0.0)),
        ..Default::default()
    }
}
