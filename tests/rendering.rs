use canvas_scene::color::Paint;
use canvas_scene::element::{Composition, LineEndSide, LineEndStyle, LineSettings};
use canvas_scene::renderer::{StrokeStyle, paint_program};
use canvas_scene::{
    Color, DrawOptions, Element, ElementStyle, FillRule, PaintOp, PixmapSurface, Point,
    RecordingSurface, Rgba, Scene, SceneConfig, Tool, draw, factory,
};

const LIVE: DrawOptions = DrawOptions {
    is_caching: false,
    is_debug: false,
};

fn style(stroke: Rgba, fill: Rgba, size: f32) -> ElementStyle {
    ElementStyle {
        stroke_color: Color::Solid(stroke),
        fill_color: Color::Solid(fill),
        size,
    }
}

fn shape(tool: Tool, coords: &[(f32, f32)], style: ElementStyle) -> Element {
    let points = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
    factory::create("page", tool, points, style)
}

fn record(element: &Element) -> Vec<PaintOp> {
    let mut surface = RecordingSurface::new();
    draw(&mut surface, element, LIVE);
    surface.into_ops()
}

fn alpha_at(surface: &PixmapSurface, x: u32, y: u32) -> u8 {
    surface.pixmap().pixel(x, y).map(|p| p.alpha()).unwrap_or(0)
}

fn rgba_at(surface: &PixmapSurface, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
    let pixel = surface.pixmap().pixel(x, y)?.demultiply();
    Some((pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()))
}

#[test]
fn test_freehand_draws_halo_then_body() {
    let pen = shape(
        Tool::Pen,
        &[(10.0, 10.0), (60.0, 10.0), (110.0, 10.0)],
        style(Rgba::BLUE, Rgba::BLACK, 40.0),
    );
    let ops = record(&pen);

    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[0], PaintOp::Fill { paint: Paint::Solid(c), .. } if *c == Rgba::BLUE));
    assert!(matches!(&ops[1], PaintOp::Fill { paint: Paint::Solid(c), .. } if *c == Rgba::BLACK));
}

#[test]
fn test_transparent_fill_hollows_the_stroke() {
    let pen = shape(
        Tool::Pen,
        &[(10.0, 10.0), (60.0, 10.0)],
        style(Rgba::BLUE, Rgba::TRANSPARENT, 40.0),
    );
    let ops = record(&pen);

    // A single ring in the stroke color; nothing is erased.
    assert_eq!(ops.len(), 1);
    assert!(matches!(
        &ops[0],
        PaintOp::Fill { paint: Paint::Solid(c), fill_rule: FillRule::EvenOdd, composition, .. }
            if *c == Rgba::BLUE && *composition == Composition::SourceOver
    ));
}

#[test]
fn test_hollow_freehand_keeps_what_lies_beneath() {
    let mut rendered = Vec::new();
    for cache_elements in [false, true] {
        let config = SceneConfig {
            cache_elements,
            ..SceneConfig::default()
        };
        let mut scene = Scene::with_config("page", config);
        scene
            .create_element(shape(
                Tool::Rectangle,
                &[(0.0, 0.0), (200.0, 200.0)],
                style(Rgba::TRANSPARENT, Rgba::BLACK, 4.0),
            ))
            .unwrap();
        scene
            .create_element(shape(
                Tool::Pen,
                &[(0.0, 100.0), (100.0, 100.0), (200.0, 100.0)],
                style(Rgba::BLUE, Rgba::TRANSPARENT, 40.0),
            ))
            .unwrap();

        let mut surface = PixmapSurface::new(200, 200).unwrap();
        scene.render(&mut surface, LIVE);

        // The body is 13 units wide either side of the centerline, the halo 20.
        assert_eq!(rgba_at(&surface, 100, 100), Some((0, 0, 0, 255)), "cached: {cache_elements}");
        let ring = rgba_at(&surface, 100, 83).unwrap();
        assert!(ring.2 > 200 && ring.3 == 255, "cached: {cache_elements}, ring {ring:?}");
        rendered.push(surface);
    }

    for (x, y) in [(100, 100), (100, 90), (50, 50), (100, 150)] {
        assert_eq!(
            rgba_at(&rendered[0], x, y),
            rgba_at(&rendered[1], x, y),
            "pixel ({x}, {y})"
        );
    }
}

#[test]
fn test_marker_and_highlighter_blend() {
    let coords = [(0.0, 0.0), (50.0, 0.0)];
    let marker = shape(Tool::Marker, &coords, style(Rgba::BLUE, Rgba::BLUE, 10.0));
    let highlighter = shape(Tool::Highlighter, &coords, style(Rgba::BLUE, Rgba::BLUE, 10.0));

    assert!(record(&marker).iter().all(|op| op.composition() == Composition::Multiply));
    assert!(record(&highlighter).iter().all(|op| op.composition() == Composition::Hue));
}

#[test]
fn test_shapes_fill_then_stroke() {
    for tool in [Tool::Rectangle, Tool::Circle, Tool::Triangle] {
        let element = shape(
            tool,
            &[(0.0, 0.0), (40.0, 0.0), (20.0, 30.0)],
            style(Rgba::BLUE, Rgba::BLACK, 4.0),
        );
        let ops = record(&element);

        assert_eq!(ops.len(), 2, "{tool:?}");
        assert!(matches!(ops[0], PaintOp::Fill { .. }), "{tool:?}");
        assert!(
            matches!(&ops[1], PaintOp::Stroke { style, .. } if style.width == 4.0),
            "{tool:?}"
        );
    }
}

#[test]
fn test_transparent_stroke_is_skipped() {
    let rect = shape(
        Tool::Rectangle,
        &[(0.0, 0.0), (40.0, 30.0)],
        style(Rgba::TRANSPARENT, Rgba::BLACK, 4.0),
    );
    let ops = record(&rect);

    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], PaintOp::Fill { .. }));
}

#[test]
fn test_triangle_needs_three_points() {
    let triangle = shape(
        Tool::Triangle,
        &[(0.0, 0.0), (40.0, 30.0)],
        style(Rgba::BLUE, Rgba::BLACK, 4.0),
    );
    assert!(record(&triangle).is_empty());
}

#[test]
fn test_arrow_line_draws_two_layers() {
    let line = factory::line(
        "page",
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        LineSettings {
            line_end_side: LineEndSide::Both,
            line_end_style: LineEndStyle::Arrow,
        },
        style(Rgba::BLUE, Rgba::BLACK, 10.0),
    );
    let widths: Vec<f32> = record(&line)
        .iter()
        .filter_map(|op| match op {
            PaintOp::Stroke { style, .. } => Some(style.width),
            _ => None,
        })
        .collect();

    assert_eq!(widths, [15.0, 15.0, 10.0, 10.0]);
}

#[test]
fn test_circle_caps_are_filled_in_both_passes() {
    let line = factory::line(
        "page",
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        LineSettings {
            line_end_side: LineEndSide::One,
            line_end_style: LineEndStyle::Circle,
        },
        style(Rgba::BLUE, Rgba::BLACK, 10.0),
    );
    let ops = record(&line);
    let fills = ops.iter().filter(|op| matches!(op, PaintOp::Fill { .. })).count();

    assert_eq!(fills, 2);
    // Shaft, cap fill and cap outline, then shaft and cap fill.
    assert_eq!(ops.len(), 5);
}

#[test]
fn test_incomplete_cut_marches_and_completed_cut_erases() {
    let coords = [(0.0, 0.0), (40.0, 0.0), (20.0, 30.0)];
    let mut cut = shape(Tool::Cut, &coords, ElementStyle::default());

    let ops = record(&cut);
    assert_eq!(ops.len(), 2);
    assert!(matches!(
        &ops[0],
        PaintOp::Stroke { style: StrokeStyle { width, dash: Some(_) }, paint: Paint::Solid(c), .. }
            if *width == 4.0 && *c == Rgba::WHITE
    ));
    assert!(matches!(
        &ops[1],
        PaintOp::Stroke { style: StrokeStyle { width, .. }, paint: Paint::Solid(c), .. }
            if *width == 2.0 && *c == Rgba::BLUE
    ));

    cut.complete_cut().unwrap();
    let ops = record(&cut);
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], PaintOp::Fill { composition: Composition::DestinationOut, .. }));
}

#[test]
fn test_blob_outline_falls_back_to_fill_color() {
    let blob = shape(
        Tool::Blob,
        &[(0.0, 0.0), (40.0, 0.0), (20.0, 30.0)],
        style(Rgba::TRANSPARENT, Rgba::BLUE, 6.0),
    );
    let ops = record(&blob);

    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[1], PaintOp::Stroke { paint: Paint::Solid(c), .. } if *c == Rgba::BLUE));
}

#[test]
fn test_hidden_and_interactive_elements_draw_nothing() {
    let checkbox = factory::checkbox("page", Point::new(0.0, 0.0), true);
    assert!(record(&checkbox).is_empty());

    let mut scene = Scene::new("page");
    let uid = scene
        .create_element(shape(
            Tool::Rectangle,
            &[(0.0, 0.0), (10.0, 10.0)],
            ElementStyle::default(),
        ))
        .unwrap();
    scene.hide_element(&uid).unwrap();
    assert!(record(scene.element(&uid).unwrap()).is_empty());
}

#[test]
fn test_cached_element_is_blitted() {
    let mut eraser = shape(
        Tool::Eraser,
        &[(0.0, 50.0), (50.0, 50.0), (100.0, 50.0)],
        style(Rgba::TRANSPARENT, Rgba::BLACK, 10.0),
    );
    eraser.rasterize().unwrap();

    let ops = record(&eraser);
    assert_eq!(ops.len(), 1);
    assert!(matches!(
        &ops[0],
        PaintOp::Blit { bounds, composition: Composition::DestinationOut, .. }
            if *bounds == eraser.dimensions().outer()
    ));

    // The caching pass itself never blits and never erases.
    let caching = paint_program(
        &eraser,
        DrawOptions {
            is_caching: true,
            is_debug: false,
        },
    );
    assert!(caching.iter().all(|op| !matches!(op, PaintOp::Blit { .. })));
    assert!(caching.iter().all(|op| op.composition() == Composition::SourceOver));
}

#[test]
fn test_drawing_is_idempotent() {
    let blob = shape(
        Tool::Blob,
        &[(0.0, 0.0), (40.0, 0.0), (20.0, 30.0)],
        style(Rgba::BLACK, Rgba::BLUE, 6.0),
    );
    assert_eq!(record(&blob), record(&blob));
}

#[test]
fn test_eraser_punches_through_earlier_ink() {
    let mut scene = Scene::new("page");
    scene
        .create_element(shape(
            Tool::Rectangle,
            &[(0.0, 0.0), (100.0, 100.0)],
            style(Rgba::TRANSPARENT, Rgba::BLACK, 4.0),
        ))
        .unwrap();
    scene
        .create_element(shape(
            Tool::Eraser,
            &[(0.0, 50.0), (50.0, 50.0), (100.0, 50.0)],
            style(Rgba::TRANSPARENT, Rgba::BLACK, 10.0),
        ))
        .unwrap();

    let mut surface = PixmapSurface::new(100, 100).unwrap();
    scene.render(&mut surface, LIVE);

    assert_eq!(alpha_at(&surface, 50, 20), 255);
    assert_eq!(alpha_at(&surface, 50, 50), 0);
}

#[test]
fn test_cached_and_live_rendering_agree() {
    let mut rect = shape(
        Tool::Rectangle,
        &[(10.0, 10.0), (30.0, 30.0)],
        style(Rgba::TRANSPARENT, Rgba::BLACK, 4.0),
    );

    let mut live = PixmapSurface::new(40, 40).unwrap();
    draw(&mut live, &rect, LIVE);

    rect.rasterize().unwrap();
    let mut cached = PixmapSurface::new(40, 40).unwrap();
    draw(&mut cached, &rect, LIVE);

    for (x, y) in [(5, 5), (20, 20), (12, 28), (35, 35)] {
        assert_eq!(alpha_at(&live, x, y), alpha_at(&cached, x, y), "pixel ({x}, {y})");
    }
}
