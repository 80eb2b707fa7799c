/// Viewer configuration loaded from JSON
use std::fs;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Deserializer};

use crate::animation::{LoopSettings, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_ORBIT_STEP_DEGREES};
use crate::camera::{Camera, Viewport};
use crate::error::{Error, Result};
use crate::geometry::PlaneCollection;
use crate::paint::{Color, Finalize, GeometryClass, Layer, Style};
use crate::projection::{ProjectionSettings, DEFAULT_ROLL_REFERENCE_OFFSET};

/// Every field is optional in the document; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub frame_interval_ms: f64,
    pub orbit_step_degrees: f64,
    pub roll_reference_offset: f64,
    /// Camera position relative to the target at startup.
    pub camera_offset: [f64; 3],
    /// Look-at target; the center of the loaded geometry when absent.
    pub target: Option<[f64; 3]>,
    #[serde(deserialize_with = "building_layer")]
    pub building: LayerConfig,
    #[serde(deserialize_with = "roof_layer")]
    pub roof: LayerConfig,
}

/// Drawing policy of one layer. In the document every key of a layer block
/// is optional and falls back to the class default.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub finalize: Finalize,
    pub style: Style,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LayerOverride {
    finalize: Option<Finalize>,
    stroke: Option<Color>,
    fill: Option<Color>,
    line_width: Option<f64>,
}

impl LayerOverride {
    fn over(self, class: GeometryClass) -> LayerConfig {
        let defaults = LayerConfig::defaults(class);
        LayerConfig {
            finalize: self.finalize.unwrap_or(defaults.finalize),
            style: Style {
                stroke: self.stroke.unwrap_or(defaults.style.stroke),
                fill: self.fill.unwrap_or(defaults.style.fill),
                line_width: self.line_width.unwrap_or(defaults.style.line_width),
            },
        }
    }
}

fn building_layer<'de, D>(deserializer: D) -> std::result::Result<LayerConfig, D::Error>
where
    D: Deserializer<'de>,
{
    LayerOverride::deserialize(deserializer).map(|o| o.over(GeometryClass::Building))
}

fn roof_layer<'de, D>(deserializer: D) -> std::result::Result<LayerConfig, D::Error>
where
    D: Deserializer<'de>,
{
    LayerOverride::deserialize(deserializer).map(|o| o.over(GeometryClass::Roof))
}

impl LayerConfig {
    fn defaults(class: GeometryClass) -> Self {
        Self {
            finalize: class.default_finalize(),
            style: class.default_style(),
        }
    }

    pub fn layer(&self, class: GeometryClass, planes: PlaneCollection) -> Layer {
        Layer::new(class, planes)
            .with_style(self.style)
            .with_finalize(self.finalize)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            orbit_step_degrees: DEFAULT_ORBIT_STEP_DEGREES,
            roll_reference_offset: DEFAULT_ROLL_REFERENCE_OFFSET,
            camera_offset: [0.0, -100.0, 100.0],
            target: None,
            building: LayerConfig::defaults(GeometryClass::Building),
            roof: LayerConfig::defaults(GeometryClass::Roof),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            frame_interval_ms: self.frame_interval_ms,
            orbit_step: self.orbit_step_degrees.to_radians(),
            projection: self.projection_settings(),
        }
    }

    pub fn projection_settings(&self) -> ProjectionSettings {
        ProjectionSettings {
            roll_reference_offset: self.roll_reference_offset,
        }
    }

    /// Startup camera looking at the configured target, or at the center
    /// of `layers` when none is configured.
    pub fn initial_camera(&self, layers: &[Layer], viewport: Viewport) -> Camera {
        let target = match self.target {
            Some([x, y, z]) => Point3::new(x, y, z),
            None => layers
                .iter()
                .filter_map(|layer| layer.planes.bounds())
                .reduce(|a, b| a.union(&b))
                .map(|bounds| bounds.center())
                .unwrap_or_else(Point3::origin),
        };
        let [dx, dy, dz] = self.camera_offset;
        Camera::framing(target, Vector3::new(dx, dy, dz), viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Ring;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.loop_settings(), LoopSettings::default());
    }

    #[test]
    fn test_partial_document() {
        let config = ViewerConfig::from_json_str(
            r#"{
                "orbit_step_degrees": 1.5,
                "target": [10.0, 20.0, 0.0],
                "roof": { "finalize": "stroke", "stroke": [1, 2, 3], "fill": [4, 5, 6], "line_width": 2.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.orbit_step_degrees, 1.5);
        assert_eq!(config.frame_interval_ms, DEFAULT_FRAME_INTERVAL_MS);
        assert_eq!(config.roof.finalize, Finalize::Stroke);
        assert_eq!(config.roof.style.fill, Color(4, 5, 6));
        assert_eq!(config.building, LayerConfig::defaults(GeometryClass::Building));

        let camera = config.initial_camera(&[], Viewport::new(100.0, 100.0));
        assert_eq!(camera.target, Point3::new(10.0, 20.0, 0.0));
        assert_eq!(camera.position, Point3::new(10.0, -80.0, 100.0));
    }

    #[test]
    fn test_partial_layer_block_keeps_class_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{
                "roof": { "finalize": "stroke" },
                "building": { "line_width": 1.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.roof.finalize, Finalize::Stroke);
        assert_eq!(config.roof.style, GeometryClass::Roof.default_style());
        assert_eq!(config.building.finalize, Finalize::Stroke);
        assert_eq!(config.building.style.line_width, 1.0);
        assert_eq!(config.building.style.stroke, GeometryClass::Building.default_style().stroke);

        let config = ViewerConfig::from_json_str(r#"{ "roof": {} }"#).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_unknown_layer_key_is_rejected() {
        let err = ViewerConfig::from_json_str(r#"{ "roof": { "colour": [1, 2, 3] } }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = ViewerConfig::from_json_str(r#"{ "fps": 30 }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_target_defaults_to_data_center() {
        let config = ViewerConfig::default();
        let planes = PlaneCollection::from_rings(vec![Ring::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(20.0, 40.0, 10.0),
        ])]);
        let layers = vec![config.building.layer(GeometryClass::Building, planes)];

        let camera = config.initial_camera(&layers, Viewport::new(100.0, 100.0));
        assert_eq!(camera.target, Point3::new(10.0, 20.0, 5.0));
    }
}
