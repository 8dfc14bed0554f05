//! Renders one page of persisted element records to a PNG.
//!
//!   scene-render --records page.json --out page.png
//!   scene-render -r page.json -o page.png --width 1200 --height 900 --config scene.json

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

use canvas_scene::{Bounds, DrawOptions, ElementRecord, PixmapSurface, Scene, SceneConfig};

const DECODE_TIMEOUT: Duration = Duration::from_secs(5);
const FALLBACK_SIZE: (u32, u32) = (800, 600);

/// Hydrate a page's element records and rasterize its active elements.
#[derive(Parser, Debug)]
#[command(name = "scene-render")]
struct Args {
    /// JSON array of element records.
    #[arg(short, long, value_name = "FILE")]
    records: PathBuf,

    /// Output PNG path.
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,

    /// Page width in page units; defaults to the extent of the active elements.
    #[arg(long)]
    width: Option<u32>,

    /// Page height in page units; defaults to the extent of the active elements.
    #[arg(long)]
    height: Option<u32>,

    /// Scene configuration JSON.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Outline every element's outer box.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(rejected) if rejected == 0 => ExitCode::SUCCESS,
        Ok(rejected) => {
            eprintln!("{rejected} record(s) could not be loaded; see the log for details.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<usize, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => SceneConfig::default(),
    };
    let dpr = config.device_pixel_ratio;

    let records: Vec<ElementRecord> =
        serde_json::from_str(&std::fs::read_to_string(&args.records)?)?;
    let page_id = records.first().map(|r| r.page_uid.clone()).unwrap_or_default();
    let mut scene = Scene::with_config(page_id, config);
    let rejected = scene.load_records(&records);

    wait_for_bitmaps(&mut scene);

    let extent = scene
        .active_elements()
        .map(|element| element.dimensions().outer())
        .reduce(|a, b| a.union(&b));
    let (width, height) = page_size(&args, extent);

    let mut layer = PixmapSurface::new(
        (width as f32 * dpr).ceil() as u32,
        (height as f32 * dpr).ceil() as u32,
    )
    .ok_or("page size must be non-zero")?
    .with_transform(Transform::from_scale(dpr, dpr));
    scene.render(
        &mut layer,
        DrawOptions {
            is_caching: false,
            is_debug: args.debug,
        },
    );

    // Erasers punch through the element layer, so it goes onto white last.
    let layer = layer.into_pixmap();
    let mut page = Pixmap::new(layer.width(), layer.height()).ok_or("page size must be non-zero")?;
    page.fill(Color::WHITE);
    page.draw_pixmap(0, 0, layer.as_ref(), &PixmapPaint::default(), Transform::identity(), None);

    std::fs::write(&args.out, page.encode_png()?)?;
    log::info!("Wrote {}x{} page to {}", page.width(), page.height(), args.out.display());
    Ok(rejected.len())
}

fn page_size(args: &Args, extent: Option<Bounds>) -> (u32, u32) {
    let (fallback_width, fallback_height) = extent
        .map(|bounds| (bounds.max_x.max(1.0).ceil() as u32, bounds.max_y.max(1.0).ceil() as u32))
        .unwrap_or(FALLBACK_SIZE);
    (
        args.width.unwrap_or(fallback_width),
        args.height.unwrap_or(fallback_height),
    )
}

/// Decodes cached bitmaps; elements whose decode does not finish render live.
fn wait_for_bitmaps(scene: &mut Scene) {
    let requested = scene.request_bitmap_decodes();
    if requested == 0 {
        return;
    }

    let started = Instant::now();
    let mut ready = 0;
    while scene.elements().any(|element| element.is_decode_pending()) {
        if started.elapsed() > DECODE_TIMEOUT {
            log::warn!("Gave up waiting for bitmap decodes after {DECODE_TIMEOUT:?}");
            break;
        }
        ready += scene.poll_bitmaps();
        std::thread::sleep(Duration::from_millis(5));
    }
    ready += scene.poll_bitmaps();
    log::info!("Decoded {ready} of {requested} cached bitmaps");
}
