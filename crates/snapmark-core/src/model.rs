//! Data models for the editor
//!
//! All geometry here is expressed in display-space units: canvas pixel
//! coordinates after the source image has been scaled to fit its container.
//! Source-image pixels only reappear at export time.

use serde::{Deserialize, Serialize};

/// A point in display space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Display-space extent of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width:  f64,
    pub height: f64,
}

impl CanvasBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamps a point so it lies on the canvas
    pub fn clamp_point(&self, point: Point) -> Point {
        Point::new(point.x.clamp(0.0, self.width), point.y.clamp(0.0, self.height))
    }

    /// Pixel dimensions of the canvas rendered at `multiplier`
    ///
    /// Both axes are rounded the same way so a 1x render always matches
    /// the on-screen canvas size.
    pub fn pixel_size(&self, multiplier: f64) -> (u32, u32) {
        (
            ((self.width * multiplier).round() as u32).max(1),
            ((self.height * multiplier).round() as u32).max(1),
        )
    }
}

/// Fit-to-container scale applied to the source image
///
/// Always satisfies `0 < scale <= 1`: images are shrunk to fit, never
/// enlarged. The only constructor is [`DisplayScale::fit`]; a scale can be
/// serialized for reporting but not deserialized.
///
/// ```compile_fail
/// use snapmark_core::model::DisplayScale;
///
/// let scale: DisplayScale = serde_json::from_str("5.0").unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayScale(f64);

impl DisplayScale {
    /// Computes `min(container_width / image_width, max_height / image_height, 1)`
    ///
    /// Returns `None` when any input is zero, negative, or not finite, since
    /// no positive scale exists for such inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapmark_core::model::DisplayScale;
    ///
    /// let scale = DisplayScale::fit(800.0, 400.0, 1600, 900).unwrap();
    /// assert!((scale.value() - 0.444_444).abs() < 1e-5);
    ///
    /// // Small images are never upscaled
    /// let scale = DisplayScale::fit(800.0, 400.0, 200, 100).unwrap();
    /// assert_eq!(scale.value(), 1.0);
    /// ```
    pub fn fit(
        container_width: f64,
        max_canvas_height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Option<Self> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        if !(container_width.is_finite() && container_width > 0.0) {
            return None;
        }
        if !(max_canvas_height.is_finite() && max_canvas_height > 0.0) {
            return None;
        }

        let scale_x = container_width / f64::from(image_width);
        let scale_y = max_canvas_height / f64::from(image_height);
        Some(Self(scale_x.min(scale_y).min(1.0)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Display-space canvas extent for an image of the given pixel size
    pub fn apply(&self, image_width: u32, image_height: u32) -> CanvasBounds {
        CanvasBounds::new(f64::from(image_width) * self.0, f64::from(image_height) * self.0)
    }
}

/// An RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const RED: Color = Color([255, 0, 0, 255]);
    /// `rgba(255, 0, 0, 0.2)`
    pub const RED_TRANSLUCENT: Color = Color([255, 0, 0, 51]);

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba(self.0)
    }
}

/// Colour and width of a free-hand brush
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    /// Line width in display-space units
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            width: 1.0,
        }
    }
}

/// A committed free-hand path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub style:  StrokeStyle,
}

/// The crop rectangle, origin fixed at its top-left corner
///
/// The effective extent is `width * scale_x` by `height * scale_y`; handles
/// change the scale factors rather than the base size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub left:    f64,
    pub top:     f64,
    pub width:   f64,
    pub height:  f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl CropRegion {
    /// Creates an unscaled region
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    pub fn right(&self) -> f64 {
        self.left + self.scaled_width()
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.scaled_height()
    }

    /// Whether the effective bounding box lies inside `bounds`
    ///
    /// `epsilon` absorbs floating-point error from repeated scale updates.
    pub fn fits_within(&self, bounds: CanvasBounds, epsilon: f64) -> bool {
        self.left >= -epsilon
            && self.top >= -epsilon
            && self.right() <= bounds.width + epsilon
            && self.bottom() <= bounds.height + epsilon
    }
}

/// Which controller currently owns canvas input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    Drawing,
    Cropping,
}

/// Position of a resize handle on the crop rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }

    pub fn affects_x(self) -> bool {
        self.moves_left() || self.moves_right()
    }

    pub fn affects_y(self) -> bool {
        self.moves_top() || self.moves_bottom()
    }
}
