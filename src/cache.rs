//! Element bitmap caching.
//!
//! A canvas element can be rasterized once into a bitmap sized to its outer
//! box times the device pixel ratio. The bitmap is persisted as a PNG data
//! URL; on hydration the URL (PNG, JPEG or any other base64 image) is decoded
//! off-thread and the element renders live until the decode completes.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::channel::oneshot;
use tiny_skia::{ColorU8, Pixmap};

use crate::element::Element;
use crate::error::{CacheError, DecodeError};
use crate::renderer::{self, DrawOptions, PixmapSurface};

/// Header of the data URLs this crate writes.
const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A premultiplied RGBA bitmap, cheap to clone.
#[derive(Clone)]
pub struct Bitmap(Arc<Pixmap>);

impl Bitmap {
    pub fn new(pixmap: Pixmap) -> Self {
        Self(Arc::new(pixmap))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.0
    }

    pub fn to_data_url(&self) -> Result<String, CacheError> {
        let png = self
            .0
            .encode_png()
            .map_err(|err| CacheError::Encode(err.to_string()))?;
        Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(png)))
    }

    /// Decodes any base64 image data URL the `image` crate can read.
    pub fn from_data_url(url: &str) -> Result<Self, DecodeError> {
        let (header, payload) = url.split_once(',').ok_or(DecodeError::NotADataUrl)?;
        if !header.starts_with("data:") || !header.ends_with(";base64") {
            return Err(DecodeError::NotADataUrl);
        }
        let bytes = STANDARD.decode(payload)?;
        let rgba = image::load_from_memory(&bytes)?.to_rgba8();

        let mut pixmap = Pixmap::new(rgba.width(), rgba.height()).ok_or(DecodeError::Empty)?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self::new(pixmap))
    }

    /// Texture data for showing the bitmap in egui.
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_premultiplied(
            [self.width() as usize, self.height() as usize],
            self.0.data(),
        )
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.0.data() == other.0.data()
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Renders `element` into a bitmap covering its outer box.
pub fn rasterize(element: &Element) -> Result<Bitmap, CacheError> {
    let outer = element.dimensions().outer();
    let dpr = element.canvas_settings().dpi;
    let mut surface =
        PixmapSurface::for_element_cache(outer, dpr).ok_or(CacheError::EmptyBitmap {
            width: (outer.width() * dpr).ceil().max(0.0) as u32,
            height: (outer.height() * dpr).ceil().max(0.0) as u32,
        })?;

    renderer::draw(
        &mut surface,
        element,
        DrawOptions {
            is_caching: true,
            is_debug: false,
        },
    );
    Ok(Bitmap::new(surface.into_pixmap()))
}

/// Decodes `url` on a worker thread; the result arrives on the returned channel.
pub fn spawn_decode(url: String) -> oneshot::Receiver<Result<Bitmap, DecodeError>> {
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        // The receiver may be gone if the element was dropped meanwhile.
        let _ = tx.send(Bitmap::from_data_url(&url));
    });
    rx
}

enum BitmapSlot {
    Absent,
    Pending(oneshot::Receiver<Result<Bitmap, DecodeError>>),
    Ready(Bitmap),
    Failed,
}

/// Cache state of one element.
pub struct ElementCache {
    is_cached: bool,
    data_url: Option<String>,
    slot: BitmapSlot,
}

impl Default for ElementCache {
    fn default() -> Self {
        Self {
            is_cached: false,
            data_url: None,
            slot: BitmapSlot::Absent,
        }
    }
}

// A pending decode stays with the cache that started it; a clone starts without one.
impl Clone for ElementCache {
    fn clone(&self) -> Self {
        let slot = match &self.slot {
            BitmapSlot::Ready(bitmap) => BitmapSlot::Ready(bitmap.clone()),
            BitmapSlot::Failed => BitmapSlot::Failed,
            BitmapSlot::Absent | BitmapSlot::Pending(_) => BitmapSlot::Absent,
        };
        Self {
            is_cached: self.is_cached,
            data_url: self.data_url.clone(),
            slot,
        }
    }
}

impl fmt::Debug for ElementCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = match &self.slot {
            BitmapSlot::Absent => "absent",
            BitmapSlot::Pending(_) => "pending",
            BitmapSlot::Ready(_) => "ready",
            BitmapSlot::Failed => "failed",
        };
        f.debug_struct("ElementCache")
            .field("is_cached", &self.is_cached)
            .field("has_data_url", &self.data_url.is_some())
            .field("slot", &slot)
            .finish()
    }
}

impl ElementCache {
    /// Cache state read back from a persisted record; the bitmap still needs decoding.
    pub(crate) fn restored(is_cached: bool, data_url: Option<String>) -> Self {
        Self {
            is_cached: is_cached && data_url.is_some(),
            data_url,
            slot: BitmapSlot::Absent,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.is_cached
    }

    pub fn data_url(&self) -> Option<&str> {
        self.data_url.as_deref()
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        match &self.slot {
            BitmapSlot::Ready(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.slot, BitmapSlot::Pending(_))
    }

    /// Keeps a freshly rendered bitmap along with its encoded form.
    pub fn store(&mut self, bitmap: Bitmap) -> Result<(), CacheError> {
        self.data_url = Some(bitmap.to_data_url()?);
        self.is_cached = true;
        self.slot = BitmapSlot::Ready(bitmap);
        Ok(())
    }

    /// Installs an already decoded bitmap for the current data URL.
    pub fn install(&mut self, bitmap: Bitmap) {
        self.slot = BitmapSlot::Ready(bitmap);
    }

    pub fn invalidate(&mut self) {
        self.is_cached = false;
        self.data_url = None;
        self.slot = BitmapSlot::Absent;
    }

    /// Points the cache at a source image; a no-op when it already is.
    pub fn set_source(&mut self, url: &str) {
        if self.data_url.as_deref() == Some(url) {
            return;
        }
        self.data_url = Some(url.to_owned());
        self.is_cached = true;
        self.slot = BitmapSlot::Absent;
    }

    /// Starts decoding the data URL unless there is none, a bitmap is
    /// already available, or a decode is in flight.
    pub fn request_decode(&mut self) -> bool {
        if !matches!(self.slot, BitmapSlot::Absent) {
            return false;
        }
        let Some(url) = &self.data_url else {
            return false;
        };
        self.slot = BitmapSlot::Pending(spawn_decode(url.clone()));
        true
    }

    /// Checks on an in-flight decode. `Ok(true)` means a bitmap just became ready.
    pub fn poll(&mut self) -> Result<bool, DecodeError> {
        let BitmapSlot::Pending(rx) = &mut self.slot else {
            return Ok(false);
        };

        match rx.try_recv() {
            Ok(None) => Ok(false),
            Ok(Some(Ok(bitmap))) => {
                self.slot = BitmapSlot::Ready(bitmap);
                Ok(true)
            }
            Ok(Some(Err(err))) => {
                self.slot = BitmapSlot::Failed;
                Err(err)
            }
            Err(canceled) => {
                self.slot = BitmapSlot::Failed;
                Err(canceled.into())
            }
        }
    }
}
