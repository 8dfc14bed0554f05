use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::element::DEFAULT_SIZE;
use crate::error::ConfigError;
use crate::stroke::FreehandOptions;

/// Settings shared by every element a scene creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scale of cache bitmaps, recorded on each new element
    pub device_pixel_ratio: f32,
    /// Smoother parameters for new freehand strokes
    pub freehand: FreehandOptions,
    /// Stroke width of new elements
    pub default_size: f32,
    /// Rasterize canvas elements into their cache when they are created
    pub cache_elements: bool,
    /// Extra reach of hit tests, in page units
    pub hit_tolerance: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            freehand: FreehandOptions::default(),
            default_size: DEFAULT_SIZE,
            cache_elements: false,
            hit_tolerance: 2.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = SceneConfig::from_json_str(r#"{"device_pixel_ratio": 2.0}"#).unwrap();

        assert_eq!(config.device_pixel_ratio, 2.0);
        assert_eq!(config.default_size, DEFAULT_SIZE);
        assert!(!config.cache_elements);
    }

    #[test]
    fn nested_freehand_options_use_camel_case() {
        let json = r#"{"freehand": {"thinning": 0.2, "simulatePressure": true}}"#;
        let config = SceneConfig::from_json_str(json).unwrap();

        assert_eq!(config.freehand.thinning, 0.2);
        assert!(config.freehand.simulate_pressure);
        assert_eq!(config.freehand.streamline, FreehandOptions::default().streamline);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            SceneConfig::from_json_file("/nonexistent/scene.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
