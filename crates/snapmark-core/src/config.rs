//! Editor configuration
//!
//! [`EditorConfig`] gathers every tunable the editor uses: the container the
//! canvas is fitted into, the brush, the default crop placement, and export
//! settings. It can be built in code with [`EditorConfig::builder`] or
//! deserialized from JSON; missing fields fall back to the defaults below.
//!
//! # Examples
//!
//! ```
//! use snapmark_core::config::{EditorConfig, PngCompression};
//!
//! let config = EditorConfig::builder()
//!     .container_width(640.0)
//!     .export_multiplier(2)
//!     .png_compression(PngCompression::Fast)
//!     .build();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.max_canvas_height, 400.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    error::{EditorError, EditorResult},
    model::{Color, CropRegion, StrokeStyle},
};

/// Default container width when the caller doesn't supply one
pub const DEFAULT_CONTAINER_WIDTH: f64 = 800.0;

/// Maximum on-screen canvas height
pub const DEFAULT_MAX_CANVAS_HEIGHT: f64 = 400.0;

/// Upscaling factor used when exporting a crop
pub const DEFAULT_EXPORT_MULTIPLIER: u32 = 3;

/// Largest accepted export multiplier
pub const MAX_EXPORT_MULTIPLIER: u32 = 8;

/// Widest accepted brush, in display units
pub const MAX_BRUSH_WIDTH: f64 = 50.0;

/// Widest accepted crop outline, in display units
pub const MAX_OUTLINE_WIDTH: f64 = 20.0;

/// PNG compression level for exported bitmaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// Appearance of the crop overlay while it is visible on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub fill:          Color,
    pub outline:       Color,
    pub outline_width: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill:          Color::RED_TRANSLUCENT,
            outline:       Color::RED,
            outline_width: 2.0,
        }
    }
}

/// Configuration for an editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width available to the canvas, in display pixels
    pub container_width:   f64,
    /// Maximum canvas height, in display pixels
    pub max_canvas_height: f64,
    /// Brush used for free-hand strokes
    pub brush:             StrokeStyle,
    /// Placement of a freshly created crop region
    pub crop_default:      CropRegion,
    /// Upscaling factor for crop exports
    pub export_multiplier: u32,
    /// Compression level for PNG output
    pub png_compression:   PngCompression,
    /// Crop overlay appearance
    pub overlay:           OverlayStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            container_width:   DEFAULT_CONTAINER_WIDTH,
            max_canvas_height: DEFAULT_MAX_CANVAS_HEIGHT,
            brush:             StrokeStyle::default(),
            crop_default:      CropRegion::new(100.0, 20.0, 200.0, 150.0),
            export_multiplier: DEFAULT_EXPORT_MULTIPLIER,
            png_compression:   PngCompression::default(),
            overlay:           OverlayStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Starts a builder seeded with the default configuration
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parses a configuration from JSON
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EditorError::invalid_parameter("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable
    pub fn validate(&self) -> EditorResult<()> {
        if !(self.container_width.is_finite() && self.container_width > 0.0) {
            return Err(EditorError::invalid_parameter(
                "container_width",
                format!("expected a positive width, got {}", self.container_width),
            ));
        }
        if !(self.max_canvas_height.is_finite() && self.max_canvas_height > 0.0) {
            return Err(EditorError::invalid_parameter(
                "max_canvas_height",
                format!("expected a positive height, got {}", self.max_canvas_height),
            ));
        }
        if !(self.brush.width > 0.0 && self.brush.width <= MAX_BRUSH_WIDTH) {
            return Err(EditorError::invalid_parameter(
                "brush_width",
                format!("expected 0-{}, got {}", MAX_BRUSH_WIDTH, self.brush.width),
            ));
        }
        let outline_width = self.overlay.outline_width;
        if !(outline_width > 0.0 && outline_width <= MAX_OUTLINE_WIDTH) {
            return Err(EditorError::invalid_parameter(
                "outline_width",
                format!("expected 0-{}, got {}", MAX_OUTLINE_WIDTH, outline_width),
            ));
        }

        let crop = &self.crop_default;
        let values = [crop.left, crop.top, crop.width, crop.height, crop.scale_x, crop.scale_y];
        if values.iter().any(|v| !v.is_finite())
            || crop.left < 0.0
            || crop.top < 0.0
            || crop.width <= 0.0
            || crop.height <= 0.0
            || crop.scale_x <= 0.0
            || crop.scale_y <= 0.0
        {
            return Err(EditorError::invalid_parameter(
                "crop_default",
                format!("unusable rectangle {:?}", crop),
            ));
        }

        if !(1..=MAX_EXPORT_MULTIPLIER).contains(&self.export_multiplier) {
            return Err(EditorError::invalid_parameter(
                "export_multiplier",
                format!(
                    "expected 1-{}, got {}",
                    MAX_EXPORT_MULTIPLIER, self.export_multiplier
                ),
            ));
        }

        Ok(())
    }
}

/// Builder for [`EditorConfig`]
#[derive(Debug, Clone)]
pub struct EditorConfigBuilder {
    config: EditorConfig,
}

impl EditorConfigBuilder {
    pub fn container_width(mut self, width: f64) -> Self {
        self.config.container_width = width;
        self
    }

    pub fn max_canvas_height(mut self, height: f64) -> Self {
        self.config.max_canvas_height = height;
        self
    }

    pub fn brush(mut self, brush: StrokeStyle) -> Self {
        self.config.brush = brush;
        self
    }

    pub fn crop_default(mut self, region: CropRegion) -> Self {
        self.config.crop_default = region;
        self
    }

    pub fn export_multiplier(mut self, multiplier: u32) -> Self {
        self.config.export_multiplier = multiplier;
        self
    }

    pub fn png_compression(mut self, compression: PngCompression) -> Self {
        self.config.png_compression = compression;
        self
    }

    pub fn overlay(mut self, overlay: OverlayStyle) -> Self {
        self.config.overlay = overlay;
        self
    }

    pub fn build(self) -> EditorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.max_canvas_height, 400.0);
        assert_eq!(config.export_multiplier, 3);
        assert_eq!(config.crop_default, CropRegion::new(100.0, 20.0, 200.0, 150.0));
        assert_eq!(config.brush.color, Color::RED);
        assert_eq!(config.brush.width, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = EditorConfig::builder()
            .container_width(320.0)
            .max_canvas_height(240.0)
            .export_multiplier(1)
            .png_compression(PngCompression::Best)
            .build();

        assert_eq!(config.container_width, 320.0);
        assert_eq!(config.max_canvas_height, 240.0);
        assert_eq!(config.export_multiplier, 1);
        assert_eq!(config.png_compression, PngCompression::Best);
    }

    #[test]
    fn test_validate_rejects_bad_multiplier() {
        let config = EditorConfig::builder().export_multiplier(0).build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("export_multiplier"));

        let config = EditorConfig::builder().export_multiplier(9).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert!(EditorConfig::builder().container_width(0.0).build().validate().is_err());
        assert!(
            EditorConfig::builder()
                .max_canvas_height(f64::INFINITY)
                .build()
                .validate()
                .is_err()
        );
        assert!(
            EditorConfig::builder()
                .crop_default(CropRegion::new(-1.0, 0.0, 10.0, 10.0))
                .build()
                .validate()
                .is_err()
        );
        assert!(
            EditorConfig::builder()
                .brush(StrokeStyle {
                    color: Color::RED,
                    width: 0.0,
                })
                .build()
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_bounds_stroke_widths() {
        let brush = |width| StrokeStyle {
            color: Color::RED,
            width,
        };
        let widest = EditorConfig::builder().brush(brush(MAX_BRUSH_WIDTH)).build();
        assert!(widest.validate().is_ok());

        for width in [400.0, f64::NAN, f64::INFINITY] {
            let err = EditorConfig::builder().brush(brush(width)).build().validate().unwrap_err();
            assert!(err.remediation_hint().contains("Brush width"));
        }

        let overlay = OverlayStyle {
            outline_width: 100.0,
            ..OverlayStyle::default()
        };
        let err = EditorConfig::builder().overlay(overlay).build().validate().unwrap_err();
        assert!(matches!(
            err,
            EditorError::InvalidParameter { ref parameter, .. } if parameter == "outline_width"
        ));
        assert!(err.remediation_hint().contains("outline"));
    }

    #[test]
    fn test_from_json_rejects_wide_brush() {
        let json = r#"{"brush": {"color": [255, 0, 0, 255], "width": 400.0}}"#;
        assert!(EditorConfig::from_json(json).is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            EditorConfig::from_json(r#"{"container_width": 640, "png_compression": "fast"}"#)
                .unwrap();
        assert_eq!(config.container_width, 640.0);
        assert_eq!(config.png_compression, PngCompression::Fast);
        assert_eq!(config.export_multiplier, DEFAULT_EXPORT_MULTIPLIER);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(EditorConfig::from_json(r#"{"export_multiplier": 42}"#).is_err());
        assert!(EditorConfig::from_json("not json").is_err());
    }
}
