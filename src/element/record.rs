//! The flat record elements are persisted as.
//!
//! Every structured field travels as a JSON string. Hydration parses each
//! one on its own: an absent field or a literal `null` falls back to the
//! default, anything that fails to parse rejects the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    CanvasSettings, Composition, DEFAULT_SIZE, Element, ElementStyle, ElementTransform, Tool,
    ToolSettings,
};
use crate::cache::ElementCache;
use crate::color::Color;
use crate::dimensions::Dimensions;
use crate::error::SceneError;
use crate::geometry::Point;
use crate::id_generator::{ElementId, generate_id};
use crate::stroke::{FreehandOptions, SmoothPoints};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementRecord {
    /// Server identity; absent for elements that were never persisted.
    pub uid: Option<String>,
    pub page_uid: String,
    pub tool: i64,
    pub points: Option<String>,
    pub settings: Option<String>,
    pub transform: Option<String>,
    pub dimensions: Option<String>,
    pub canvas_settings: Option<String>,
    pub canvas_data_url: Option<String>,
    pub is_cached: bool,
    pub is_html_element: bool,
    pub is_hidden: bool,
}

/// `canvas_settings` as stored: the derived render parameters plus the
/// style inputs they were derived from.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredCanvasSettings {
    dpi: Option<f32>,
    composition: Option<Composition>,
    opacity: Option<f32>,
    stroke_color: Option<Color>,
    fill_color: Option<Color>,
    line_size: Option<f32>,
    freehand_options: Option<FreehandOptions>,
    smooth_points: Option<SmoothPoints>,
}

fn parse_field<T: DeserializeOwned>(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, SceneError> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };
    serde_json::from_str::<Option<T>>(raw)
        .map_err(|source| SceneError::MalformedRecord { field, source })
}

impl Element {
    /// Hydrates a persisted record. The element starts clean; its derived
    /// fields are recomputed rather than trusted.
    pub fn from_record(record: &ElementRecord) -> Result<Self, SceneError> {
        let tool = Tool::try_from(record.tool)?;

        let points: Vec<Point> =
            parse_field("points", record.points.as_deref())?.unwrap_or_default();
        let settings = parse_field::<Value>("settings", record.settings.as_deref())?
            .map(|value| ToolSettings::from_value(tool, value))
            .transpose()
            .map_err(|source| SceneError::MalformedRecord {
                field: "settings",
                source,
            })?
            .unwrap_or_else(|| ToolSettings::default_for(tool));
        let transform: Option<ElementTransform> =
            parse_field("transform", record.transform.as_deref())?;
        // Only checked for well-formedness; dimensions are always recomputed.
        parse_field::<Dimensions>("dimensions", record.dimensions.as_deref())?;
        let stored: StoredCanvasSettings =
            parse_field("canvas_settings", record.canvas_settings.as_deref())?.unwrap_or_default();

        let defaults = ElementStyle::default();
        let api_uid = record.uid.clone().map(ElementId::from);
        let transform = transform.or_else(|| {
            let anchor = points.first().copied().unwrap_or(Point::new(0.0, 0.0));
            tool.is_interactive().then(|| ElementTransform::at(anchor))
        });

        let mut element = Element {
            uid: api_uid.clone().unwrap_or_else(generate_id),
            api_uid,
            page_id: record.page_uid.clone(),
            tool,
            points,
            settings,
            stroke_color: stored.stroke_color.unwrap_or(defaults.stroke_color),
            fill_color: stored.fill_color.unwrap_or(defaults.fill_color),
            size: stored.line_size.unwrap_or(DEFAULT_SIZE),
            freehand: stored.freehand_options.unwrap_or_default(),
            transform,
            dimensions: Dimensions::default(),
            canvas_settings: CanvasSettings {
                dpi: stored.dpi.unwrap_or(1.0),
                opacity: stored.opacity.unwrap_or(1.0),
                ..CanvasSettings::default()
            },
            cache: ElementCache::default(),
            is_hidden: record.is_hidden,
            is_dirty: false,
        };
        element.refresh_geometry();

        // Bitmap-backed elements keep their source image when no snapshot was stored.
        if record.canvas_data_url.is_some() || !tool.is_bitmap_backed() {
            element.cache =
                ElementCache::restored(record.is_cached, record.canvas_data_url.clone());
        }

        Ok(element)
    }

    /// The persisted form of this element.
    pub fn to_batch_format(&self) -> Result<ElementRecord, SceneError> {
        let stored = StoredCanvasSettings {
            dpi: Some(self.canvas_settings.dpi),
            composition: Some(self.canvas_settings.composition),
            opacity: Some(self.canvas_settings.opacity),
            stroke_color: Some(self.stroke_color.clone()),
            fill_color: Some(self.fill_color.clone()),
            line_size: Some(self.size),
            freehand_options: Some(self.freehand),
            smooth_points: self.canvas_settings.smooth_points.clone(),
        };

        Ok(ElementRecord {
            uid: self.api_uid.as_ref().map(|uid| uid.as_str().to_owned()),
            page_uid: self.page_id.clone(),
            tool: self.tool.discriminant(),
            points: Some(serde_json::to_string(&self.points)?),
            settings: Some(serde_json::to_string(&self.settings.to_value()?)?),
            transform: Some(serde_json::to_string(&self.transform)?),
            dimensions: Some(serde_json::to_string(&self.dimensions)?),
            canvas_settings: Some(serde_json::to_string(&stored)?),
            canvas_data_url: self.cache.data_url().map(str::to_owned),
            is_cached: self.cache.is_cached(),
            is_html_element: self.is_html_element(),
            is_hidden: self.is_hidden,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::element::factory;

    fn record(tool: Tool) -> ElementRecord {
        ElementRecord {
            uid: Some("server-1".into()),
            page_uid: "page".into(),
            tool: tool.discriminant(),
            ..ElementRecord::default()
        }
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let element = Element::from_record(&record(Tool::Rectangle)).unwrap();

        assert_eq!(element.uid().as_str(), "server-1");
        assert_eq!(element.api_uid().map(ElementId::as_str), Some("server-1"));
        assert!(element.points().is_empty());
        assert_eq!(element.size(), DEFAULT_SIZE);
        assert!(!element.is_dirty());
    }

    #[test]
    fn literal_null_is_absent() {
        let record = ElementRecord {
            points: Some("null".into()),
            settings: Some("null".into()),
            ..record(Tool::Checkbox)
        };
        let element = Element::from_record(&record).unwrap();

        assert!(element.points().is_empty());
        assert!(!element.settings().is_checked());
        assert!(element.transform().is_some());
    }

    #[test]
    fn malformed_points_name_the_field() {
        let record = ElementRecord {
            points: Some("[{\"x\": 1".into()),
            ..record(Tool::Pen)
        };
        match Element::from_record(&record) {
            Err(SceneError::MalformedRecord { field, .. }) => assert_eq!(field, "points"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_settings_are_rejected() {
        let record = ElementRecord {
            settings: Some("{\"lineEndSide\": 9}".into()),
            ..record(Tool::Line)
        };
        assert!(matches!(
            Element::from_record(&record),
            Err(SceneError::MalformedRecord { field: "settings", .. })
        ));
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let record = ElementRecord {
            tool: 99,
            ..record(Tool::Pen)
        };
        assert!(matches!(
            Element::from_record(&record),
            Err(SceneError::InvalidTool(99))
        ));
    }

    #[test]
    fn stale_dimensions_are_recomputed() {
        let mut element = factory::create(
            "page",
            Tool::Rectangle,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            ElementStyle::default(),
        );
        element.set_api_uid("server-1".into());
        let mut batch = element.to_batch_format().unwrap();
        batch.dimensions = Some(serde_json::to_string(&Dimensions::default()).unwrap());

        let hydrated = Element::from_record(&batch).unwrap();
        assert_eq!(hydrated.dimensions(), element.dimensions());
    }

    #[test]
    fn style_survives_hydration() {
        let style = ElementStyle {
            stroke_color: Color::Solid(Rgba::BLUE),
            fill_color: Color::Solid(Rgba::WHITE),
            size: 12.0,
        };
        let element = factory::create(
            "page",
            Tool::Pen,
            vec![Point::new(0.0, 0.0), Point::new(30.0, 10.0)],
            style,
        );
        let hydrated = Element::from_record(&element.to_batch_format().unwrap()).unwrap();

        assert_eq!(hydrated.stroke_color(), &Color::Solid(Rgba::BLUE));
        assert_eq!(hydrated.size(), 12.0);
        assert_eq!(hydrated.smooth_points(), element.smooth_points());
    }
}
