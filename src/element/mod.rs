//! The element model: one drawable or interactive object on a page.

use serde::{Deserialize, Serialize};

mod line;
pub mod record;
mod settings;
mod tool;
mod transform;

pub use line::{arrow_segments, cap_pairs, line_points};
pub use settings::{
    CheckboxSettings, CutSettings, ImageRect, ImageSettings, LineEndSide, LineEndStyle,
    LineSettings, PasteSettings, TextboxSettings, ToolSettings,
};
pub use tool::{Composition, Tool};
pub use transform::{ElementTransform, Placement, ViewMatrix};

use crate::cache::{Bitmap, ElementCache};
use crate::color::{Color, Rgba};
use crate::dimensions::{Dimensions, dimensions_for};
use crate::error::{CacheError, SceneError};
use crate::geometry::Point;
use crate::id_generator::{ElementId, generate_id};
use crate::stroke::{self, FreehandOptions, SmoothPoints};

/// Identifier of the page an element belongs to.
pub type PageId = String;

/// Stroke width of a freshly created element.
pub const DEFAULT_SIZE: f32 = 40.0;

/// Colors and width an element is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    pub stroke_color: Color,
    pub fill_color: Color,
    pub size: f32,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::Solid(Rgba::TRANSPARENT),
            fill_color: Color::Solid(Rgba::BLACK),
            size: DEFAULT_SIZE,
        }
    }
}

/// Derived render parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettings {
    /// Device pixel ratio the cache bitmap is rendered at.
    pub dpi: f32,
    pub composition: Composition,
    pub opacity: f32,
    /// Outline polygons, freehand tools only.
    pub smooth_points: Option<SmoothPoints>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            dpi: 1.0,
            composition: Composition::SourceOver,
            opacity: 1.0,
            smooth_points: None,
        }
    }
}

/// One object on a page.
///
/// Geometry inputs (`points`, `settings`, `size`, colors) are only changed
/// through methods that recompute the derived `dimensions` and
/// `canvas_settings` and drop any stale cache bitmap.
#[derive(Debug, Clone)]
pub struct Element {
    uid: ElementId,
    api_uid: Option<ElementId>,
    page_id: PageId,
    tool: Tool,
    points: Vec<Point>,
    settings: ToolSettings,
    stroke_color: Color,
    fill_color: Color,
    size: f32,
    freehand: FreehandOptions,
    transform: Option<ElementTransform>,
    dimensions: Dimensions,
    canvas_settings: CanvasSettings,
    cache: ElementCache,
    is_hidden: bool,
    is_dirty: bool,
}

impl Element {
    /// Creates a client-authored element; it starts dirty.
    pub fn new(
        page_id: impl Into<PageId>,
        tool: Tool,
        points: Vec<Point>,
        style: ElementStyle,
    ) -> Self {
        let transform = tool
            .is_interactive()
            .then(|| ElementTransform::at(points.first().copied().unwrap_or(Point::new(0.0, 0.0))));

        let mut element = Self {
            uid: generate_id(),
            api_uid: None,
            page_id: page_id.into(),
            tool,
            points,
            settings: ToolSettings::default_for(tool),
            stroke_color: style.stroke_color,
            fill_color: style.fill_color,
            size: style.size,
            freehand: FreehandOptions::default(),
            transform,
            dimensions: Dimensions::default(),
            canvas_settings: CanvasSettings::default(),
            cache: ElementCache::default(),
            is_hidden: false,
            is_dirty: true,
        };
        element.refresh_geometry();
        element
    }

    pub fn with_settings(mut self, settings: ToolSettings) -> Result<Self, SceneError> {
        self.set_settings(settings)?;
        Ok(self)
    }

    pub fn with_freehand(mut self, freehand: FreehandOptions) -> Self {
        self.freehand = freehand;
        self.refresh_geometry();
        self
    }

    pub fn with_device_pixel_ratio(mut self, dpi: f32) -> Self {
        self.set_device_pixel_ratio(dpi);
        self
    }

    pub fn uid(&self) -> &ElementId {
        &self.uid
    }

    pub fn api_uid(&self) -> Option<&ElementId> {
        self.api_uid.as_ref()
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn stroke_color(&self) -> &Color {
        &self.stroke_color
    }

    pub fn fill_color(&self) -> &Color {
        &self.fill_color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn freehand(&self) -> &FreehandOptions {
        &self.freehand
    }

    pub fn transform(&self) -> Option<&ElementTransform> {
        self.transform.as_ref()
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn canvas_settings(&self) -> &CanvasSettings {
        &self.canvas_settings
    }

    pub fn composition(&self) -> Composition {
        self.canvas_settings.composition
    }

    pub fn smooth_points(&self) -> Option<&SmoothPoints> {
        self.canvas_settings.smooth_points.as_ref()
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Interactive overlay rather than painted on the canvas.
    pub fn is_html_element(&self) -> bool {
        self.tool.is_interactive()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_cached()
    }

    pub fn canvas_data_url(&self) -> Option<&str> {
        self.cache.data_url()
    }

    /// Decoded cache bitmap, if one is ready.
    pub fn cached_bitmap(&self) -> Option<&Bitmap> {
        self.cache.bitmap()
    }

    pub fn is_decode_pending(&self) -> bool {
        self.cache.is_pending()
    }

    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
        self.touch();
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.touch();
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size;
        self.touch();
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
        self.touch();
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
        self.touch();
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.canvas_settings.opacity = opacity.clamp(0.0, 1.0);
        self.touch();
    }

    pub fn set_device_pixel_ratio(&mut self, dpi: f32) {
        self.canvas_settings.dpi = dpi;
        self.touch();
    }

    /// Replaces the tool payload; it must belong to this element's tool.
    pub fn set_settings(&mut self, settings: ToolSettings) -> Result<(), SceneError> {
        if !settings.fits(self.tool) {
            return Err(SceneError::WrongTool {
                expected: settings.owner().unwrap_or(Tool::Pointer),
                found: self.tool,
            });
        }
        self.settings = settings;
        self.touch();
        Ok(())
    }

    /// Flips a checkbox and returns the new state.
    pub fn toggle_checked(&mut self) -> Result<bool, SceneError> {
        match &mut self.settings {
            ToolSettings::Checkbox(checkbox) => {
                checkbox.is_checked = !checkbox.is_checked;
                let checked = checkbox.is_checked;
                self.is_dirty = true;
                Ok(checked)
            }
            _ => Err(self.wrong_tool(Tool::Checkbox)),
        }
    }

    pub fn set_text_contents(&mut self, text: Option<String>) -> Result<(), SceneError> {
        match &mut self.settings {
            ToolSettings::Textbox(textbox) => {
                textbox.text_contents = text;
                self.is_dirty = true;
                Ok(())
            }
            _ => Err(self.wrong_tool(Tool::Textbox)),
        }
    }

    /// Closes a cut selection; from now on it erases the region it encloses.
    pub fn complete_cut(&mut self) -> Result<(), SceneError> {
        match &mut self.settings {
            ToolSettings::Cut(cut) => {
                cut.is_completed_cut = true;
                self.touch();
                Ok(())
            }
            _ => Err(self.wrong_tool(Tool::Cut)),
        }
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        if self.is_hidden != hidden {
            self.is_hidden = hidden;
            self.is_dirty = true;
        }
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Records the identity the server assigned to this element.
    pub fn set_api_uid(&mut self, api_uid: ElementId) {
        self.api_uid = Some(api_uid);
    }

    /// Renders the element into a fresh cache bitmap.
    pub fn rasterize(&mut self) -> Result<(), CacheError> {
        let bitmap = crate::cache::rasterize(self)?;
        self.cache.store(bitmap)?;
        log::debug!("Rasterized element {} into its cache", self.uid);
        Ok(())
    }

    /// Starts decoding the cached data URL; returns `false` when there is
    /// nothing to decode or a decode is already in flight.
    pub fn request_bitmap_decode(&mut self) -> bool {
        self.cache.request_decode()
    }

    /// Picks up a finished decode. Returns `true` when a bitmap became ready.
    pub fn poll_bitmap(&mut self) -> bool {
        match self.cache.poll() {
            Ok(ready) => ready,
            Err(err) => {
                log::warn!("Bitmap decode for element {} failed: {}", self.uid, err);
                false
            }
        }
    }

    pub(crate) fn install_bitmap(&mut self, bitmap: Bitmap) {
        self.cache.install(bitmap);
    }

    fn wrong_tool(&self, expected: Tool) -> SceneError {
        SceneError::WrongTool {
            expected,
            found: self.tool,
        }
    }

    fn touch(&mut self) {
        self.is_dirty = true;
        self.refresh_geometry();
    }

    /// Recomputes every derived field from the geometry inputs.
    fn refresh_geometry(&mut self) {
        if self.tool == Tool::Line {
            if let (Some(from), Some(to)) = (self.points.first(), self.points.last()) {
                self.points = line_points(*from, *to, self.settings.line(), self.size);
            }
        }

        self.canvas_settings.smooth_points = self
            .tool
            .is_freehand_line()
            .then(|| stroke::smooth(&self.points, &self.freehand.for_stroke_width(self.size)));
        self.canvas_settings.composition = Composition::for_element(self.tool, &self.settings);
        self.dimensions = dimensions_for(self);

        match self.settings.image_data_url() {
            Some(url) if self.tool.is_bitmap_backed() => self.cache.set_source(url),
            _ => self.cache.invalidate(),
        }
    }
}

/// Constructors for each kind of element.
pub mod factory {
    use super::*;
    use crate::geometry::Bounds;

    /// Creates an element of any drawing tool from its raw points.
    pub fn create(page_id: &str, tool: Tool, points: Vec<Point>, style: ElementStyle) -> Element {
        match tool {
            Tool::Image => image(page_id, String::new(), ImageRect::default()),
            Tool::Paste => paste(page_id, ImageRect::default(), None),
            Tool::Line => match (points.first(), points.last()) {
                (Some(from), Some(to)) => line(page_id, *from, *to, LineSettings::default(), style),
                _ => Element::new(page_id, tool, points, style),
            },
            Tool::Pointer
            | Tool::Eraser
            | Tool::ClearAll
            | Tool::Pen
            | Tool::Marker
            | Tool::Highlighter
            | Tool::Blob
            | Tool::Circle
            | Tool::Rectangle
            | Tool::Triangle
            | Tool::Cut
            | Tool::Checkbox
            | Tool::Textbox
            | Tool::Paper => Element::new(page_id, tool, points, style),
        }
    }

    /// Creates a Pen, Marker or Highlighter stroke.
    pub fn freehand(
        page_id: &str,
        tool: Tool,
        points: Vec<Point>,
        style: ElementStyle,
        options: FreehandOptions,
    ) -> Element {
        Element::new(page_id, tool, points, style).with_freehand(options)
    }

    pub fn line(
        page_id: &str,
        from: Point,
        to: Point,
        settings: LineSettings,
        style: ElementStyle,
    ) -> Element {
        let mut element = Element::new(page_id, Tool::Line, vec![from, to], style);
        element.settings = ToolSettings::Line(settings);
        element.refresh_geometry();
        element
    }

    /// Places an image; its data URL doubles as the element's cache.
    pub fn image(page_id: &str, data_url: String, rect: ImageRect) -> Element {
        let style = ElementStyle {
            stroke_color: Color::Solid(Rgba::TRANSPARENT),
            fill_color: Color::Solid(Rgba::WHITE),
            size: DEFAULT_SIZE,
        };
        let corners = vec![
            Point::new(rect.left, rect.top),
            Point::new(rect.left + rect.width, rect.top + rect.height),
        ];
        let mut element = Element::new(page_id, Tool::Image, corners, style);
        element.settings = ToolSettings::Image(ImageSettings {
            image: data_url,
            rect,
        });
        element.refresh_geometry();
        element
    }

    /// Places previously cut content at `cut_rect`.
    pub fn paste(page_id: &str, cut_rect: ImageRect, data_url: Option<String>) -> Element {
        let style = ElementStyle {
            stroke_color: Color::Solid(Rgba::TRANSPARENT),
            fill_color: Color::Solid(Rgba::WHITE),
            size: DEFAULT_SIZE,
        };
        let mut element = Element::new(page_id, Tool::Paste, Vec::new(), style);
        element.settings = ToolSettings::Paste(PasteSettings {
            cut_rect,
            image: data_url,
        });
        element.refresh_geometry();
        element
    }

    pub fn checkbox(page_id: &str, anchor: Point, is_checked: bool) -> Element {
        let mut element =
            Element::new(page_id, Tool::Checkbox, vec![anchor], ElementStyle::default());
        element.settings = ToolSettings::Checkbox(CheckboxSettings { is_checked });
        element
    }

    pub fn textbox(page_id: &str, anchor: Point, text: Option<String>) -> Element {
        let mut element =
            Element::new(page_id, Tool::Textbox, vec![anchor], ElementStyle::default());
        element.settings = ToolSettings::Textbox(TextboxSettings {
            text_contents: text,
        });
        element
    }

    /// A barrier covering `bounds`.
    pub fn clear_all(page_id: &str, bounds: Bounds) -> Element {
        let corners = vec![
            Point::new(bounds.min_x, bounds.min_y),
            Point::new(bounds.max_x, bounds.max_y),
        ];
        Element::new(page_id, Tool::ClearAll, corners, ElementStyle::default())
    }
}
