//! Free-hand stroke smoothing.
//!
//! Raw pointer samples are streamlined into a centerline, and the centerline
//! is offset on both sides by a pressure-dependent radius to produce a closed
//! outline polygon with round caps. Two outlines are produced from the same
//! centerline: the ink body (`path`) and a wider halo (`stroke`).

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::geometry::{PathData, Point};

/// Pressure assumed for samples that carry none.
const DEFAULT_PRESSURE: f32 = 0.5;
/// How quickly simulated pressure follows pointer speed.
const RATE_OF_PRESSURE_CHANGE: f32 = 0.275;
/// Vertices per round cap; even so the cap apex is hit exactly.
const CAP_SEGMENTS: usize = 16;
const MIN_RADIUS: f32 = 0.01;
/// Width of the halo relative to the ink body.
pub const HALO_SCALE: f32 = 1.5;

/// Parameters of the free-hand outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FreehandOptions {
    /// Nominal ink width.
    pub size: f32,
    /// How much pressure narrows the ink, in `[-1, 1]`.
    pub thinning: f32,
    /// Minimum vertex spacing as a fraction of `size`.
    pub smoothing: f32,
    /// How strongly new samples are pulled towards the previous one, in `[0, 1]`.
    pub streamline: f32,
    /// Derive pressure from pointer speed when samples carry none.
    pub simulate_pressure: bool,
    /// The stroke is finished, so its final sample is kept exactly.
    pub last: bool,
}

impl Default for FreehandOptions {
    fn default() -> Self {
        Self {
            size: 16.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            simulate_pressure: false,
            last: true,
        }
    }
}

impl FreehandOptions {
    pub fn with_size(self, size: f32) -> Self {
        Self { size, ..self }
    }

    /// Options whose halo is `width` wide, so the ink body is
    /// `width / HALO_SCALE`.
    pub fn for_stroke_width(self, width: f32) -> Self {
        self.with_size(width / HALO_SCALE)
    }

    /// Options for the halo outline: half again as wide, softer thinning.
    pub fn halo(&self) -> Self {
        Self {
            size: self.size * HALO_SCALE,
            thinning: self.thinning / HALO_SCALE,
            ..*self
        }
    }

    fn radius(&self, pressure: f32) -> f32 {
        let radius = if self.thinning == 0.0 {
            self.size / 2.0
        } else {
            self.size * (0.5 - self.thinning * (0.5 - pressure))
        };
        radius.max(MIN_RADIUS)
    }
}

/// The two outline polygons of a free-hand stroke.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothPoints {
    /// Ink body at nominal size.
    pub path: Vec<[f32; 2]>,
    /// Halo at `1.5 * size`.
    pub stroke: Vec<[f32; 2]>,
}

impl SmoothPoints {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.stroke.is_empty()
    }

    pub fn path_commands(&self) -> PathData {
        outline_path(&self.path)
    }

    pub fn stroke_commands(&self) -> PathData {
        outline_path(&self.stroke)
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f32,
    y: f32,
    pressure: f32,
    /// Unit tangent of the centerline at this sample.
    dx: f32,
    dy: f32,
}

/// Outlines the samples at `options` and at `options.halo()`.
///
/// Fewer than two samples give empty polygons.
pub fn smooth(points: &[Point], options: &FreehandOptions) -> SmoothPoints {
    if points.len() < 2 {
        return SmoothPoints::default();
    }

    let centerline = centerline(points, options);
    let halo = options.halo();

    SmoothPoints {
        path: outline(&centerline, options),
        stroke: outline(&centerline, &halo),
    }
}

/// Closed curve through the polygon: each vertex is the control point of a
/// quadratic segment ending halfway to the next vertex.
pub fn outline_path(polygon: &[[f32; 2]]) -> PathData {
    let mut path = PathData::new();
    let Some(first) = polygon.first() else {
        return path;
    };

    path.move_to(Point::from(*first));
    for (i, vertex) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let control = Point::from(*vertex);
        path.quad_to(control, control.midpoint(Point::from(next)));
    }
    path.close();
    path
}

fn lerp(a: (f32, f32), b: (f32, f32), t: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

fn unit(dx: f32, dy: f32) -> Option<(f32, f32)> {
    let len = dx.hypot(dy);
    (len > f32::EPSILON).then(|| (dx / len, dy / len))
}

/// Streamlined samples with pressure and tangents, thinned to the vertex
/// spacing of the nominal outline.
fn centerline(points: &[Point], options: &FreehandOptions) -> Vec<Sample> {
    let t = 0.15 + (1.0 - options.streamline.clamp(0.0, 1.0)) * 0.85;

    let mut input: Vec<(f32, f32, Option<f32>)> =
        points.iter().map(|p| (p.x, p.y, p.pressure)).collect();

    // Two samples are not enough to streamline; interpolate between them.
    if input.len() == 2 {
        let (a, b) = (input[0], input[1]);
        input = (0..5)
            .map(|i| {
                let (x, y) = lerp((a.0, a.1), (b.0, b.1), i as f32 / 4.0);
                (x, y, if i < 4 { a.2 } else { b.2 })
            })
            .collect();
    }

    let max = input.len() - 1;
    let mut kept: Vec<(f32, f32, Option<f32>)> = vec![input[0]];
    let mut prev = (input[0].0, input[0].1);
    let mut running_length = 0.0;
    let mut reached_min_length = false;

    for (i, sample) in input.iter().enumerate().skip(1) {
        let point = if options.last && i == max {
            (sample.0, sample.1)
        } else {
            lerp(prev, (sample.0, sample.1), t)
        };
        if point == prev {
            continue;
        }

        running_length += dist(prev, point);
        if i < max && !reached_min_length {
            if running_length < options.size {
                continue;
            }
            reached_min_length = true;
        }

        kept.push((point.0, point.1, sample.2));
        prev = point;
    }

    // Pressure, simulated from speed when the device gave none.
    let mut pressures = Vec::with_capacity(kept.len());
    let mut prev_pressure = kept[0].2.unwrap_or(DEFAULT_PRESSURE);
    for (i, sample) in kept.iter().enumerate() {
        let pressure = match sample.2 {
            Some(pressure) => pressure,
            None if options.simulate_pressure && i > 0 && options.size > 0.0 => {
                let speed = (dist((kept[i - 1].0, kept[i - 1].1), (sample.0, sample.1))
                    / options.size)
                    .min(1.0);
                let rate = (1.0 - speed).min(1.0);
                (prev_pressure + (rate - prev_pressure) * (speed * RATE_OF_PRESSURE_CHANGE))
                    .min(1.0)
            }
            None => DEFAULT_PRESSURE,
        };
        prev_pressure = pressure;
        pressures.push(pressure.clamp(0.0, 1.0));
    }

    let last = kept.len() - 1;
    let mut samples: Vec<Sample> = Vec::with_capacity(kept.len());
    for (i, sample) in kept.iter().enumerate() {
        let before = kept[i.saturating_sub(1)];
        let after = kept[(i + 1).min(last)];
        let (dx, dy) = unit(after.0 - before.0, after.1 - before.1)
            .or_else(|| samples.last().map(|s| (s.dx, s.dy)))
            .unwrap_or((1.0, 0.0));
        samples.push(Sample {
            x: sample.0,
            y: sample.1,
            pressure: pressures[i],
            dx,
            dy,
        });
    }

    let min_spacing = options.size * options.smoothing;
    let min_spacing_sq = min_spacing * min_spacing;
    let mut spaced: Vec<Sample> = Vec::with_capacity(samples.len());
    for (i, sample) in samples.iter().enumerate() {
        let keep = match spaced.last() {
            None => true,
            Some(_) if i == last => true,
            Some(prev) => {
                let (dx, dy) = (sample.x - prev.x, sample.y - prev.y);
                dx * dx + dy * dy > min_spacing_sq
            }
        };
        if keep {
            spaced.push(*sample);
        }
    }
    spaced
}

fn outline(centerline: &[Sample], options: &FreehandOptions) -> Vec<[f32; 2]> {
    let (Some(first), Some(last)) = (centerline.first(), centerline.last()) else {
        return Vec::new();
    };

    if centerline.len() == 1 {
        return dot(first, options.radius(first.pressure));
    }

    let mut left = Vec::with_capacity(centerline.len());
    let mut right = Vec::with_capacity(centerline.len());
    for sample in centerline {
        let r = options.radius(sample.pressure);
        let (nx, ny) = (-sample.dy, sample.dx);
        left.push([sample.x + nx * r, sample.y + ny * r]);
        right.push([sample.x - nx * r, sample.y - ny * r]);
    }

    let mut polygon = Vec::with_capacity(left.len() + right.len() + 2 * (CAP_SEGMENTS + 1));
    polygon.extend(cap(first, options.radius(first.pressure), -1.0));
    polygon.extend(left);
    polygon.extend(cap(last, options.radius(last.pressure), 1.0));
    polygon.extend(right.into_iter().rev());
    polygon
}

/// Half circle around `sample`. `side = 1.0` sweeps the end cap from the left
/// edge forward to the right edge, `-1.0` sweeps the start cap from the right
/// edge backward to the left edge.
fn cap(sample: &Sample, radius: f32, side: f32) -> impl Iterator<Item = [f32; 2]> + '_ {
    let (nx, ny) = (-sample.dy, sample.dx);
    (0..=CAP_SEGMENTS).map(move |i| {
        let theta = PI * i as f32 / CAP_SEGMENTS as f32;
        let (sin, cos) = theta.sin_cos();
        [
            sample.x + side * radius * (nx * cos + sample.dx * sin),
            sample.y + side * radius * (ny * cos + sample.dy * sin),
        ]
    })
}

fn dot(sample: &Sample, radius: f32) -> Vec<[f32; 2]> {
    (0..CAP_SEGMENTS * 2)
        .map(|i| {
            let theta = PI * i as f32 / CAP_SEGMENTS as f32;
            [
                sample.x + radius * theta.cos(),
                sample.y + radius * theta.sin(),
            ]
        })
        .collect()
}
