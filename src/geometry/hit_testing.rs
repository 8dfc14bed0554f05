use super::Point;
use crate::element::{Element, Tool};

/// Distance from `point` to the segment `start..end`.
pub fn distance_to_segment(point: Point, start: Point, end: Point) -> f32 {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return point.distance(start);
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sq).clamp(0.0, 1.0);
    point.distance(Point::new(start.x + dx * t, start.y + dy * t))
}

fn distance_to_polyline(point: Point, points: &[Point]) -> Option<f32> {
    match points {
        [] => None,
        [only] => Some(point.distance(*only)),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(point, w[0], w[1]))
            .reduce(f32::min),
    }
}

/// Whether `pos` touches the visible geometry of `element`.
///
/// Strokes and lines are tested against their centerline and half the
/// stroke width; everything else against the outer box.
pub fn hit_test(element: &Element, pos: Point, tolerance: f32) -> bool {
    if element.is_hidden() {
        return false;
    }

    let outer = element.dimensions().outer().expand(tolerance);
    if !outer.contains(pos) {
        return false;
    }

    let reach = element.size() / 2.0 + tolerance;
    let points = element.points();

    match element.tool() {
        Tool::Pen | Tool::Marker | Tool::Highlighter | Tool::Eraser => {
            distance_to_polyline(pos, points).is_some_and(|d| d <= reach)
        }
        Tool::Line => match (points.first(), points.last()) {
            (Some(from), Some(to)) => distance_to_segment(pos, *from, *to) <= reach,
            _ => false,
        },
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance_projects_onto_segment() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);

        assert_eq!(distance_to_segment(Point::new(5.0, 3.0), start, end), 3.0);
        assert_eq!(distance_to_segment(Point::new(-4.0, 3.0), start, end), 5.0);
        assert_eq!(distance_to_segment(Point::new(2.0, 2.0), start, start), 8f32.sqrt());
    }
}
