//! Rasterization of strokes and the crop overlay
//!
//! Strokes are stamped into a coverage mask first and blended once per
//! pixel, so overlapping stamps of a translucent brush don't darken.

use image::{Pixel, Rgba, RgbaImage};

use crate::{
    config::OverlayStyle,
    model::{Color, CropRegion, Point},
};

/// Per-pixel coverage for one shape, limited to the shape's bounding box
struct Mask {
    x0:      i64,
    y0:      i64,
    width:   u32,
    height:  u32,
    covered: Vec<bool>,
}

impl Mask {
    /// Covers `width` x `height` pixels starting at (`x0`, `y0`) in the image
    fn new(x0: i64, y0: i64, width: u32, height: u32) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
            covered: vec![false; width as usize * height as usize],
        }
    }

    /// Marks a disc of `radius` around `center`
    fn stamp(&mut self, center: Point, radius: f64) {
        let cx = center.x.floor() as i64;
        let cy = center.y.floor() as i64;
        let reach = radius.ceil() as i64;
        let limit = radius * radius + 1e-9;

        for oy in -reach..=reach {
            let py = cy + oy - self.y0;
            if py < 0 || py >= self.height as i64 {
                continue;
            }
            for ox in -reach..=reach {
                if (ox * ox + oy * oy) as f64 > limit {
                    continue;
                }
                let px = cx + ox - self.x0;
                if px >= 0 && px < self.width as i64 {
                    self.covered[py as usize * self.width as usize + px as usize] = true;
                }
            }
        }
    }

    /// Marks a thick segment by stamping discs along it
    ///
    /// Stamps are half a pixel apart for thin brushes and a quarter radius
    /// apart for wide ones.
    fn segment(&mut self, from: Point, to: Point, radius: f64) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();
        let spacing = (radius / 4.0).max(0.5);
        let steps = ((len / spacing).ceil() as i64).max(1);

        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.stamp(Point::new(from.x + dx * t, from.y + dy * t), radius);
        }
    }

    fn blend_onto(&self, img: &mut RgbaImage, color: Rgba<u8>) {
        for (i, _) in self.covered.iter().enumerate().filter(|(_, c)| **c) {
            let x = (self.x0 + (i % self.width as usize) as i64) as u32;
            let y = (self.y0 + (i / self.width as usize) as i64) as u32;
            img.get_pixel_mut(x, y).blend(&color);
        }
    }
}

fn brush_radius(width: f64) -> f64 {
    (width / 2.0).max(0.5)
}

/// Pixel box `(x0, y0, width, height)` a path of `radius` can touch,
/// clipped to the image; `None` if it lies entirely outside
fn path_bounds(
    points: &[Point],
    radius: f64,
    img_width: u32,
    img_height: u32,
) -> Option<(i64, i64, u32, u32)> {
    let reach = radius.ceil() as i64;
    let (mut min_x, mut min_y) = (i64::MAX, i64::MAX);
    let (mut max_x, mut max_y) = (i64::MIN, i64::MIN);
    for p in points {
        let (x, y) = (p.x.floor() as i64, p.y.floor() as i64);
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let x0 = (min_x - reach).max(0);
    let y0 = (min_y - reach).max(0);
    let x1 = (max_x + reach + 1).min(i64::from(img_width));
    let y1 = (max_y + reach + 1).min(i64::from(img_height));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Draws a free-hand path, already in target pixel coordinates
///
/// A single point draws a dot. Work is proportional to the area the path
/// covers, not to the size of `img`.
pub fn draw_polyline(img: &mut RgbaImage, points: &[Point], width: f64, color: Color) {
    let Some(first) = points.first() else {
        return;
    };

    let (w, h) = img.dimensions();
    let radius = brush_radius(width);
    let Some((x0, y0, mask_w, mask_h)) = path_bounds(points, radius, w, h) else {
        return;
    };
    let mut mask = Mask::new(x0, y0, mask_w, mask_h);

    mask.stamp(*first, radius);
    for pair in points.windows(2) {
        mask.segment(pair[0], pair[1], radius);
    }

    mask.blend_onto(img, color.to_rgba());
}

/// Draws the crop overlay: a translucent fill and an outline centered on
/// the region's edges
///
/// `multiplier` maps display space to the pixels of `img`.
pub fn draw_overlay(img: &mut RgbaImage, region: &CropRegion, style: &OverlayStyle, multiplier: f64) {
    let (w, h) = img.dimensions();
    let left = region.left * multiplier;
    let top = region.top * multiplier;
    let right = region.right() * multiplier;
    let bottom = region.bottom() * multiplier;

    let x0 = left.round().clamp(0.0, w as f64) as u32;
    let y0 = top.round().clamp(0.0, h as f64) as u32;
    let x1 = right.round().clamp(0.0, w as f64) as u32;
    let y1 = bottom.round().clamp(0.0, h as f64) as u32;
    let fill = style.fill.to_rgba();
    for y in y0..y1 {
        for x in x0..x1 {
            img.get_pixel_mut(x, y).blend(&fill);
        }
    }

    let corners = [
        Point::new(left, top),
        Point::new(right, top),
        Point::new(right, bottom),
        Point::new(left, bottom),
        Point::new(left, top),
    ];
    draw_polyline(img, &corners, style.outline_width * multiplier, style.outline);
}
