//! Crop region ownership and interaction
//!
//! [`CropController`] owns at most one [`CropRegion`]. Every move or resize
//! goes through the pure functions in [`crate::geometry`], so the region is
//! inside the canvas after each call returns.

use tracing::debug;

use crate::{
    config::{EditorConfig, OverlayStyle},
    geometry::{clamp_move, clamp_resize, fit_region, propose_resize},
    model::{CanvasBounds, CropRegion, Point, ResizeHandle},
};

/// Owner of the single crop rectangle
#[derive(Debug, Clone)]
pub struct CropController {
    default: CropRegion,
    style:   OverlayStyle,
    region:  Option<CropRegion>,
    visible: bool,
}

impl CropController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            default: config.crop_default,
            style:   config.overlay,
            region:  None,
            visible: false,
        }
    }

    /// Replaces any existing region with a fresh default one
    ///
    /// The default placement is fitted to `bounds` if the canvas is too small
    /// to hold it. The new region is visible.
    pub fn begin(&mut self, bounds: CanvasBounds) -> CropRegion {
        if self.region.take().is_some() {
            debug!("Discarding previous crop region");
        }

        let region = fit_region(self.default, bounds);
        debug!("Crop region created: {:?}", region);
        self.region = Some(region);
        self.visible = true;
        region
    }

    /// Discards the region
    pub fn end(&mut self) {
        if self.region.take().is_some() {
            debug!("Crop region discarded");
        }
        self.visible = false;
    }

    /// The active region, if any
    pub fn region(&self) -> Option<CropRegion> {
        self.region
    }

    pub fn is_active(&self) -> bool {
        self.region.is_some()
    }

    /// Whether the overlay should be drawn on the canvas
    pub fn is_visible(&self) -> bool {
        self.visible && self.region.is_some()
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Moves the region's top-left corner to (`left`, `top`), clamped
    ///
    /// Returns the clamped region, or `None` when no region is active.
    pub fn move_to(&mut self, left: f64, top: f64, bounds: CanvasBounds) -> Option<CropRegion> {
        let region = self.region.as_mut()?;
        let proposed = CropRegion { left, top, ..*region };
        *region = clamp_move(proposed, bounds);
        Some(*region)
    }

    /// Drags `handle` to `pointer`, clamping edge by edge
    ///
    /// Returns the clamped region, or `None` when no region is active.
    pub fn resize(
        &mut self,
        handle: ResizeHandle,
        pointer: Point,
        bounds: CanvasBounds,
    ) -> Option<CropRegion> {
        let region = self.region.as_mut()?;
        let proposed = propose_resize(*region, handle, pointer);
        *region = clamp_resize(proposed, bounds, handle);
        Some(*region)
    }

    /// Hides the overlay until the returned guard is dropped
    ///
    /// Dropping the guard restores whatever visibility the overlay had
    /// before, including on early return or unwind.
    pub fn hide_overlay(&mut self) -> HiddenOverlay<'_> {
        let was_visible = self.visible;
        self.visible = false;
        HiddenOverlay {
            controller: self,
            was_visible,
        }
    }
}

/// Scope during which the crop overlay is hidden
#[derive(Debug)]
pub struct HiddenOverlay<'a> {
    controller:  &'a mut CropController,
    was_visible: bool,
}

impl HiddenOverlay<'_> {
    pub fn region(&self) -> Option<CropRegion> {
        self.controller.region
    }

    pub fn is_visible(&self) -> bool {
        self.controller.is_visible()
    }
}

impl Drop for HiddenOverlay<'_> {
    fn drop(&mut self) {
        self.controller.visible = self.was_visible;
    }
}
