//! Crop rectangle geometry
//!
//! Pure functions that keep a [`CropRegion`] inside the canvas. They hold no
//! state and touch no pixels, so the input layer can call them on every
//! pointer event and tests can exercise them without a surface.
//!
//! The region's origin is fixed at its top-left corner. Moving changes
//! `left`/`top`; resizing changes `scale_x`/`scale_y` (and `left`/`top` when
//! a left or top handle is dragged).

use crate::model::{CanvasBounds, CropRegion, Point, ResizeHandle};

/// Smallest scaled extent a handle drag may shrink the region to
pub const MIN_CROP_EXTENT: f64 = 1.0;

/// Clamps a moved region so its bounding box stays on the canvas
///
/// `left` is clamped into `[0, canvas_width - width * scale_x]` and `top`
/// into `[0, canvas_height - height * scale_y]`, independently.
///
/// # Examples
///
/// ```
/// use snapmark_core::{
///     geometry::clamp_move,
///     model::{CanvasBounds, CropRegion},
/// };
///
/// let bounds = CanvasBounds::new(320.0, 300.0);
/// let region = CropRegion::new(-50.0, 20.0, 200.0, 150.0);
/// assert_eq!(clamp_move(region, bounds).left, 0.0);
///
/// let region = CropRegion::new(500.0, 20.0, 200.0, 150.0);
/// assert_eq!(clamp_move(region, bounds).left, 120.0);
/// ```
pub fn clamp_move(region: CropRegion, bounds: CanvasBounds) -> CropRegion {
    let max_left = (bounds.width - region.scaled_width()).max(0.0);
    let max_top = (bounds.height - region.scaled_height()).max(0.0);

    CropRegion {
        left: region.left.clamp(0.0, max_left),
        top: region.top.clamp(0.0, max_top),
        ..region
    }
}

/// Clamps a resized region against the canvas, edge by edge
///
/// Only the axes the handle acts on are corrected:
///
/// - If the near edge (left/top) went past 0, the scale is recomputed so the
///   opposite edge stays where it was and the near edge lands on 0.
/// - If the far edge (right/bottom) went past the canvas, the scale is capped
///   at `(canvas - near) / size`.
pub fn clamp_resize(region: CropRegion, bounds: CanvasBounds, handle: ResizeHandle) -> CropRegion {
    let mut out = region;

    if handle.affects_x() {
        if out.left < 0.0 {
            let scaled_width = out.scaled_width();
            out.scale_x = out.scale_x * (out.left + scaled_width) / scaled_width;
            out.left = 0.0;
        }
        let max_scale_x = (bounds.width - out.left) / out.width;
        if out.scale_x > max_scale_x {
            out.scale_x = max_scale_x;
        }
    }

    if handle.affects_y() {
        if out.top < 0.0 {
            let scaled_height = out.scaled_height();
            out.scale_y = out.scale_y * (out.top + scaled_height) / scaled_height;
            out.top = 0.0;
        }
        let max_scale_y = (bounds.height - out.top) / out.height;
        if out.scale_y > max_scale_y {
            out.scale_y = max_scale_y;
        }
    }

    out
}

/// Turns a handle drag into an unclamped region
///
/// `start` is the region when the drag began and `pointer` the current
/// pointer position. The edges the handle doesn't move stay put. The region
/// never flips: a dragged edge stops [`MIN_CROP_EXTENT`] short of the
/// opposite edge.
pub fn propose_resize(start: CropRegion, handle: ResizeHandle, pointer: Point) -> CropRegion {
    let mut out = start;

    if handle.moves_left() {
        let right = start.right();
        let left = pointer.x.min(right - MIN_CROP_EXTENT);
        out.left = left;
        out.scale_x = (right - left) / start.width;
    } else if handle.moves_right() {
        let right = pointer.x.max(start.left + MIN_CROP_EXTENT);
        out.scale_x = (right - start.left) / start.width;
    }

    if handle.moves_top() {
        let bottom = start.bottom();
        let top = pointer.y.min(bottom - MIN_CROP_EXTENT);
        out.top = top;
        out.scale_y = (bottom - top) / start.height;
    } else if handle.moves_bottom() {
        let bottom = pointer.y.max(start.top + MIN_CROP_EXTENT);
        out.scale_y = (bottom - start.top) / start.height;
    }

    out
}

/// Shrinks and shifts a region until it fits on the canvas
///
/// Used when a default-sized region is created on a canvas too small to
/// hold it.
pub fn fit_region(region: CropRegion, bounds: CanvasBounds) -> CropRegion {
    let mut out = region;
    out.scale_x = out.scale_x.min(bounds.width / out.width);
    out.scale_y = out.scale_y.min(bounds.height / out.height);
    clamp_move(out, bounds)
}
