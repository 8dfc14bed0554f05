use super::{Bounds, Point};

/// Magic constant for approximating a quarter ellipse with one cubic curve.
const KAPPA: f32 = 0.552_284_8;

/// One drawing command of a path, in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    CubicTo {
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    },
    Close,
}

/// A backend-independent path, built with canvas-style calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    commands: Vec<PathCommand>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::MoveTo { x: p.x, y: p.y });
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::LineTo { x: p.x, y: p.y });
        self
    }

    pub fn quad_to(&mut self, control: Point, to: Point) -> &mut Self {
        self.commands.push(PathCommand::QuadTo {
            cx: control.x,
            cy: control.y,
            x: to.x,
            y: to.y,
        });
        self
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) -> &mut Self {
        self.commands.push(PathCommand::CubicTo {
            c1x: c1.x,
            c1y: c1.y,
            c2x: c2.x,
            c2y: c2.y,
            x: to.x,
            y: to.y,
        });
        self
    }

    /// Adds the subpaths of `other` after this path's own.
    pub fn append(&mut self, other: &PathData) -> &mut Self {
        self.commands.extend_from_slice(&other.commands);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Adds a closed rectangle spanning two opposite corners.
    pub fn rect(&mut self, a: Point, b: Point) -> &mut Self {
        self.move_to(a)
            .line_to(Point::new(b.x, a.y))
            .line_to(b)
            .line_to(Point::new(a.x, b.y))
            .close()
    }

    /// Adds a closed axis-aligned ellipse as four cubic arcs.
    pub fn ellipse(&mut self, center: Point, rx: f32, ry: f32) -> &mut Self {
        let (cx, cy) = (center.x, center.y);
        let (ox, oy) = (rx * KAPPA, ry * KAPPA);

        self.move_to(Point::new(cx + rx, cy))
            .cubic_to(
                Point::new(cx + rx, cy + oy),
                Point::new(cx + ox, cy + ry),
                Point::new(cx, cy + ry),
            )
            .cubic_to(
                Point::new(cx - ox, cy + ry),
                Point::new(cx - rx, cy + oy),
                Point::new(cx - rx, cy),
            )
            .cubic_to(
                Point::new(cx - rx, cy - oy),
                Point::new(cx - ox, cy - ry),
                Point::new(cx, cy - ry),
            )
            .cubic_to(
                Point::new(cx + ox, cy - ry),
                Point::new(cx + rx, cy - oy),
                Point::new(cx + rx, cy),
            )
            .close()
    }

    /// Box around every coordinate the path mentions, control points included.
    pub fn control_bounds(&self) -> Option<Bounds> {
        Bounds::from_coords(self.commands.iter().flat_map(|command| {
            let coords: Vec<(f32, f32)> = match *command {
                PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => vec![(x, y)],
                PathCommand::QuadTo { cx, cy, x, y } => vec![(cx, cy), (x, y)],
                PathCommand::CubicTo {
                    c1x,
                    c1y,
                    c2x,
                    c2y,
                    x,
                    y,
                } => vec![(c1x, c1y), (c2x, c2y), (x, y)],
                PathCommand::Close => Vec::new(),
            };
            coords
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_closed_four_sided() {
        let mut path = PathData::new();
        path.rect(Point::new(0.0, 0.0), Point::new(10.0, 5.0));

        assert_eq!(path.commands().len(), 5);
        assert_eq!(path.commands().last(), Some(&PathCommand::Close));
        assert_eq!(
            path.control_bounds(),
            Some(Bounds::new(0.0, 0.0, 10.0, 5.0))
        );
    }

    #[test]
    fn ellipse_stays_inside_its_box() {
        let mut path = PathData::new();
        path.ellipse(Point::new(50.0, 50.0), 20.0, 10.0);

        let bounds = path.control_bounds().unwrap();
        assert_eq!(bounds, Bounds::new(30.0, 40.0, 70.0, 60.0));
    }
}
