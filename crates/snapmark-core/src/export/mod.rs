//! Rasterizing the canvas for output
//!
//! [`Exporter`] produces the bitmaps the editor hands back to its caller:
//!
//! - [`Exporter::export_full`]: the whole canvas at on-screen resolution.
//! - [`Exporter::export_crop`]: the canvas rendered at `multiplier` times its
//!   on-screen size, cut down to the crop region.
//!
//! Both hide the crop overlay for the duration of the render and restore its
//! previous visibility afterwards, so the outline never ends up in output.

use tracing::debug;

use crate::{
    canvas::{Bitmap, CanvasSurface, PixelRect},
    config::{EditorConfig, PngCompression},
    crop::CropController,
    error::EditorResult,
    model::CropRegion,
};

pub mod encode;

pub use encode::{EncodedImage, encode_png};

/// Pixel rectangle of `region` in a render at `multiplier`
///
/// # Examples
///
/// ```
/// use snapmark_core::{canvas::PixelRect, export::crop_rect, model::CropRegion};
///
/// let region = CropRegion::new(100.0, 50.0, 200.0, 150.0);
/// assert_eq!(crop_rect(&region, 3), PixelRect::new(300, 150, 600, 450));
/// ```
pub fn crop_rect(region: &CropRegion, multiplier: u32) -> PixelRect {
    let m = f64::from(multiplier);
    PixelRect::new(
        (region.left * m).round() as i64,
        (region.top * m).round() as i64,
        ((region.scaled_width() * m).round() as u32).max(1),
        ((region.scaled_height() * m).round() as u32).max(1),
    )
}

/// Renders the canvas into output bitmaps
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    multiplier:  u32,
    compression: PngCompression,
}

impl Exporter {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            multiplier:  config.export_multiplier,
            compression: config.png_compression,
        }
    }

    /// Multiplier used by [`Exporter::export_crop`] when called through the
    /// editor
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// The canvas as the user sees it, overlay included when visible
    pub fn render_view(&self, surface: &CanvasSurface, crop: &CropController) -> Option<Bitmap> {
        let region = crop.region().filter(|_| crop.is_visible());
        surface.rasterize(1.0, region.as_ref().map(|r| (r, crop.style())))
    }

    /// Background and strokes at on-screen resolution, without the overlay
    ///
    /// Returns `None` before a background has loaded.
    pub fn export_full(&self, surface: &CanvasSurface, crop: &mut CropController) -> Option<Bitmap> {
        let hidden = crop.hide_overlay();
        let render = surface.rasterize(1.0, None);
        drop(hidden);

        if let Some(bitmap) = &render {
            debug!("Full export rendered at {}x{}", bitmap.width(), bitmap.height());
        }
        render
    }

    /// The crop region, extracted from a render at `multiplier`
    ///
    /// The output is exactly `round(width * scale_x * multiplier)` by
    /// `round(height * scale_y * multiplier)` pixels. Returns `None` before a
    /// background has loaded.
    pub fn export_crop(
        &self,
        surface: &CanvasSurface,
        crop: &mut CropController,
        region: &CropRegion,
        multiplier: u32,
    ) -> Option<Bitmap> {
        let hidden = crop.hide_overlay();
        let render = surface.rasterize(f64::from(multiplier), None);
        drop(hidden);

        let render = render?;
        let rect = crop_rect(region, multiplier);
        debug!(
            "Crop export: render {}x{} at {}x, extracting {:?}",
            render.width(),
            render.height(),
            multiplier,
            rect
        );
        Some(render.extract(rect))
    }

    /// Encodes an exported bitmap with the configured compression
    pub fn encode(&self, bitmap: &Bitmap) -> EditorResult<EncodedImage> {
        encode_png(bitmap, self.compression)
    }
}
