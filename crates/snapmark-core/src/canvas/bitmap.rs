//! RGBA bitmap wrapper used throughout the editor
//!
//! [`Bitmap`] wraps an `image::RgbaImage` with the handful of operations the
//! editor needs: exact resizing for multiplier renders and sub-rectangle
//! extraction for crops.
//!
//! # Examples
//!
//! ```
//! use snapmark_core::canvas::{Bitmap, PixelRect};
//!
//! let img = Bitmap::from_test_pattern(400, 300);
//! let upscaled = img.resize_exact(1200, 900);
//! assert_eq!(upscaled.dimensions(), (1200, 900));
//!
//! let crop = upscaled.extract(PixelRect::new(300, 150, 600, 450));
//! assert_eq!(crop.dimensions(), (600, 450));
//! ```

use image::{Rgba, RgbaImage, imageops};

/// Integer pixel rectangle; the origin may lie outside the bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x:      i64,
    pub y:      i64,
    pub width:  u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Owned RGBA8 bitmap
///
/// All transformation methods return new instances and leave the original
/// unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    inner: RgbaImage,
}

impl Bitmap {
    pub fn new(image: RgbaImage) -> Self {
        Self { inner: image }
    }

    /// Creates a fully transparent bitmap
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(RgbaImage::new(width, height))
    }

    /// Creates a bitmap filled with one colour
    pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, color))
    }

    /// Resizes to exactly `width` x `height`
    ///
    /// Uses Lanczos3 filtering. Returns a clone when the size is unchanged.
    pub fn resize_exact(&self, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        if (width, height) == self.dimensions() {
            return self.clone();
        }

        Self::new(imageops::resize(
            &self.inner,
            width,
            height,
            imageops::FilterType::Lanczos3,
        ))
    }

    /// Copies out `rect`
    ///
    /// The result is always exactly `rect.width` x `rect.height`. Parts of
    /// the rectangle that fall outside this bitmap are left transparent.
    pub fn extract(&self, rect: PixelRect) -> Self {
        let mut out = RgbaImage::new(rect.width.max(1), rect.height.max(1));
        imageops::replace(&mut out, &self.inner, -rect.x, -rect.y);
        Self::new(out)
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Reads one pixel, or `None` outside the bitmap
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.inner.get_pixel_checked(x, y).copied()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.inner
    }

    pub(crate) fn as_rgba_mut(&mut self) -> &mut RgbaImage {
        &mut self.inner
    }

    pub fn into_inner(self) -> RgbaImage {
        self.inner
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// The pattern is a vertical gradient from blue (top) to cyan (bottom),
    /// handy for tests that need a non-uniform background.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let start = [0.0f32, 0.0, 255.0];
        let end = [0.0f32, 255.0, 255.0];

        let img = RgbaImage::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([
                (start[0] * (1.0 - ratio) + end[0] * ratio) as u8,
                (start[1] * (1.0 - ratio) + end[1] * ratio) as u8,
                (start[2] * (1.0 - ratio) + end[2] * ratio) as u8,
                255,
            ])
        });

        Self::new(img)
    }
}

impl From<image::DynamicImage> for Bitmap {
    fn from(image: image::DynamicImage) -> Self {
        Self::new(image.into_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    #[test]
    fn test_solid_and_dimensions() {
        let img = Bitmap::solid(64, 32, GREEN);
        assert_eq!(img.dimensions(), (64, 32));
        assert_eq!(img.width(), 64);
        assert_eq!(img.height(), 32);
        assert_eq!(img.pixel(10, 10), Some(GREEN));
        assert_eq!(img.pixel(64, 0), None);
    }

    #[test]
    fn test_resize_exact_upscale() {
        let img = Bitmap::solid(40, 30, GREEN);
        let up = img.resize_exact(120, 90);
        assert_eq!(up.dimensions(), (120, 90));
        assert_eq!(up.pixel(60, 45), Some(GREEN));
    }

    #[test]
    fn test_resize_exact_same_size_is_identity() {
        let img = Bitmap::from_test_pattern(50, 50);
        assert_eq!(img.resize_exact(50, 50), img);
    }

    #[test]
    fn test_extract_inside() {
        let mut img = Bitmap::solid(100, 100, GREEN);
        img.as_rgba_mut().put_pixel(30, 40, Rgba([1, 2, 3, 255]));

        let crop = img.extract(PixelRect::new(30, 40, 10, 5));
        assert_eq!(crop.dimensions(), (10, 5));
        assert_eq!(crop.pixel(0, 0), Some(Rgba([1, 2, 3, 255])));
        assert_eq!(crop.pixel(9, 4), Some(GREEN));
    }

    #[test]
    fn test_extract_past_edge_pads_transparent() {
        let img = Bitmap::solid(100, 100, GREEN);
        let crop = img.extract(PixelRect::new(95, 98, 10, 4));

        assert_eq!(crop.dimensions(), (10, 4));
        assert_eq!(crop.pixel(4, 1), Some(GREEN));
        assert_eq!(crop.pixel(5, 1), Some(Rgba([0, 0, 0, 0])));
        assert_eq!(crop.pixel(0, 2), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_from_test_pattern_is_gradient() {
        let img = Bitmap::from_test_pattern(10, 100);
        let top = img.pixel(0, 0).unwrap();
        let bottom = img.pixel(0, 99).unwrap();
        assert_eq!(top, Rgba([0, 0, 255, 255]));
        assert!(bottom[1] > 200);
    }

    #[test]
    fn test_from_dynamic_image() {
        let dynamic = image::DynamicImage::new_rgb8(16, 8);
        let bitmap = Bitmap::from(dynamic);
        assert_eq!(bitmap.dimensions(), (16, 8));
        assert_eq!(bitmap.pixel(0, 0), Some(Rgba([0, 0, 0, 255])));
    }
}
