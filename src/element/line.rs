//! End-cap geometry of straight lines.
//!
//! A line's points are `[from, start cap pair?, end cap pair?, to]`. Arrow
//! pairs are the two ray tips of an arrowhead; square and circle pairs are
//! opposite corners of the cap's box.

use std::f32::consts::PI;

use super::settings::{LineEndSide, LineEndStyle, LineSettings};
use crate::geometry::Point;

/// Angle between the line and each arrowhead ray.
const ARROW_ANGLE: f32 = PI / 5.0;

pub fn line_points(from: Point, to: Point, settings: LineSettings, size: f32) -> Vec<Point> {
    let from = Point::new(from.x, from.y);
    let to = Point::new(to.x, to.y);

    let (start, end) = match (settings.line_end_side, settings.line_end_style) {
        (LineEndSide::None, _) | (_, LineEndStyle::None) => return vec![from, to],
        (_, LineEndStyle::Arrow) => (arrow_pair(to, from, size), arrow_pair(from, to, size)),
        (_, LineEndStyle::Circle | LineEndStyle::Square) => {
            (box_pair(from, size), box_pair(to, size))
        }
    };
    let both = settings.line_end_side == LineEndSide::Both;

    let mut points = Vec::with_capacity(6);
    points.push(from);
    if both {
        points.extend(start);
    }
    points.extend(end);
    points.push(to);
    points
}

/// Ray tips of an arrowhead at `tip`, for a line coming from `tail`.
fn arrow_pair(tail: Point, tip: Point, size: f32) -> [Point; 2] {
    let head_len = size * 2.0;
    let angle = (tip.y - tail.y).atan2(tip.x - tail.x);
    [
        Point::new(
            tip.x - head_len * (angle - ARROW_ANGLE).cos(),
            tip.y - head_len * (angle - ARROW_ANGLE).sin(),
        ),
        Point::new(
            tip.x - head_len * (angle + ARROW_ANGLE).cos(),
            tip.y - head_len * (angle + ARROW_ANGLE).sin(),
        ),
    ]
}

/// Opposite corners of a `2 * size` box centered on `center`.
fn box_pair(center: Point, size: f32) -> [Point; 2] {
    [
        Point::new(center.x - size, center.y - size),
        Point::new(center.x + size, center.y + size),
    ]
}

/// Arrowhead rays as `(tip, ray end)` segments, in drawing order.
pub fn arrow_segments(points: &[Point]) -> Vec<(Point, Point)> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    (1..n - 1)
        .rev()
        .map(|i| {
            let tip = if n > 4 && i <= 2 { points[0] } else { points[n - 1] };
            (tip, points[i])
        })
        .collect()
}

/// Cap boxes as `(corner, opposite corner)` pairs.
pub fn cap_pairs(points: &[Point]) -> Vec<(Point, Point)> {
    let n = points.len();
    (1..n.saturating_sub(1))
        .step_by(2)
        .map(|i| (points[i], points[i + 1]))
        .collect()
}
