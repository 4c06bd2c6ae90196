//! The drawing surface: background bitmap plus free-hand strokes
//!
//! [`CanvasSurface`] owns everything that gets flattened into an export: the
//! decoded source image and the append-only list of strokes. It does not own
//! the crop rectangle; callers pass the overlay in when they want it drawn.
//!
//! # Loading
//!
//! Loading is split in two so the decode can run without borrowing the
//! surface:
//!
//! 1. [`CanvasSurface::begin_load`] stamps a [`PendingLoad`] with the
//!    session's liveness token and starts the decode.
//! 2. The caller awaits [`PendingLoad::resolve`], then hands the result to
//!    [`CanvasSurface::finish_load`], which applies it only if the session is
//!    still alive.
//!
//! ```
//! use std::sync::Arc;
//!
//! use snapmark_core::{
//!     canvas::{Bitmap, BlockingDecoder, CanvasSurface, ImageSource},
//!     config::EditorConfig,
//!     export::encode_png,
//!     session::LivenessToken,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let png = encode_png(&Bitmap::from_test_pattern(1600, 900), Default::default()).unwrap();
//!
//!     let config = EditorConfig::default();
//!     let mut surface = CanvasSurface::new(&config, Arc::new(BlockingDecoder), LivenessToken::new());
//!
//!     let pending = surface.begin_load(ImageSource::Bytes(png.bytes)).unwrap();
//!     let loaded = pending.resolve().await;
//!     surface.finish_load(loaded).unwrap();
//!
//!     // 400 / 900 is tighter than 800 / 1600
//!     assert_eq!(surface.pixel_size(), Some((711, 400)));
//! }
//! ```

use std::{future::Future, pin::Pin, sync::Arc};

use tracing::{debug, warn};

use crate::{
    config::{EditorConfig, OverlayStyle},
    error::{EditorError, EditorResult},
    model::{CanvasBounds, CropRegion, DisplayScale, Point, Stroke, StrokeStyle},
    session::LivenessToken,
};

pub mod bitmap;
pub mod decoder;
pub mod raster;
pub mod source;

pub use bitmap::{Bitmap, PixelRect};
pub use decoder::{BlockingDecoder, ImageDecoder, MockDecoder};
pub use source::{ImageSource, parse_data_uri};

type DecodeFuture = Pin<Box<dyn Future<Output = EditorResult<Bitmap>> + Send>>;

/// Where the surface is in its one-shot load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// No load started
    Empty,
    /// Decode in flight
    Loading,
    /// Background installed
    Loaded,
    /// Decode failed; the surface has no background
    Failed(String),
}

/// Outcome of [`CanvasSurface::finish_load`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOutcome {
    /// Background installed at this scale and canvas size
    Applied {
        scale:  DisplayScale,
        bounds: CanvasBounds,
    },
    /// The session was torn down first; nothing changed
    Discarded,
}

/// A decode started by [`CanvasSurface::begin_load`]
pub struct PendingLoad {
    token:  LivenessToken,
    decode: DecodeFuture,
}

impl PendingLoad {
    /// Waits for the decode to finish
    pub async fn resolve(self) -> LoadedImage {
        let result = self.decode.await;
        LoadedImage {
            token: self.token,
            result,
        }
    }
}

impl std::fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoad").field("token", &self.token).finish_non_exhaustive()
    }
}

/// A finished decode, still tagged with the session it was started for
#[derive(Debug)]
pub struct LoadedImage {
    token:  LivenessToken,
    result: EditorResult<Bitmap>,
}

/// Background image plus free-hand drawing layer
pub struct CanvasSurface {
    decoder:           Arc<dyn ImageDecoder>,
    token:             LivenessToken,
    container_width:   f64,
    max_canvas_height: f64,
    brush:             StrokeStyle,
    state:             LoadState,
    background:        Option<Bitmap>,
    scale:             Option<DisplayScale>,
    bounds:            Option<CanvasBounds>,
    drawing_enabled:   bool,
    strokes:           Vec<Stroke>,
    active_stroke:     Option<Vec<Point>>,
}

impl CanvasSurface {
    /// Creates an empty surface for the session identified by `token`
    ///
    /// Drawing starts enabled.
    pub fn new(config: &EditorConfig, decoder: Arc<dyn ImageDecoder>, token: LivenessToken) -> Self {
        Self {
            decoder,
            token,
            container_width: config.container_width,
            max_canvas_height: config.max_canvas_height,
            brush: config.brush,
            state: LoadState::Empty,
            background: None,
            scale: None,
            bounds: None,
            drawing_enabled: true,
            strokes: Vec::new(),
            active_stroke: None,
        }
    }

    /// Starts decoding `source`
    ///
    /// A surface loads exactly one image per session; calling this again
    /// after a load started is an error.
    pub fn begin_load(&mut self, source: ImageSource) -> EditorResult<PendingLoad> {
        if self.state != LoadState::Empty {
            return Err(EditorError::invalid_parameter(
                "source",
                "an image was already loaded into this session",
            ));
        }

        self.state = LoadState::Loading;
        let decoder = Arc::clone(&self.decoder);
        debug!("Image decode started");

        Ok(PendingLoad {
            token:  self.token.clone(),
            decode: Box::pin(async move { decoder.decode(source).await }),
        })
    }

    /// Applies a finished decode
    ///
    /// If the session was torn down while decoding, the result is dropped and
    /// the surface is left untouched. A failed decode leaves the surface
    /// without a background, records [`LoadState::Failed`], and returns the
    /// error.
    pub fn finish_load(&mut self, loaded: LoadedImage) -> EditorResult<LoadOutcome> {
        if !loaded.token.is_live() || !self.token.same_session(&loaded.token) {
            debug!("Discarding image decode for a closed session");
            return Ok(LoadOutcome::Discarded);
        }

        let bitmap = match loaded.result {
            Ok(bitmap) => bitmap,
            Err(e) => {
                warn!("Image decode failed: {}", e);
                self.state = LoadState::Failed(e.to_string());
                return Err(e);
            }
        };

        let (width, height) = bitmap.dimensions();
        let Some(scale) =
            DisplayScale::fit(self.container_width, self.max_canvas_height, width, height)
        else {
            let e = EditorError::DecodeFailed {
                reason: format!("image has no usable size ({}x{})", width, height),
            };
            warn!("Image decode failed: {}", e);
            self.state = LoadState::Failed(e.to_string());
            return Err(e);
        };

        let bounds = scale.apply(width, height);
        debug!(
            "Background loaded: {}x{} at scale {:.4} -> canvas {:.1}x{:.1}",
            width,
            height,
            scale.value(),
            bounds.width,
            bounds.height
        );

        self.background = Some(bitmap);
        self.scale = Some(scale);
        self.bounds = Some(bounds);
        self.state = LoadState::Loaded;

        Ok(LoadOutcome::Applied { scale, bounds })
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn scale(&self) -> Option<DisplayScale> {
        self.scale
    }

    /// Display-space canvas extent, once a background is loaded
    pub fn bounds(&self) -> Option<CanvasBounds> {
        self.bounds
    }

    /// On-screen canvas size in pixels
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        self.bounds.map(|b| b.pixel_size(1.0))
    }

    pub fn drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    /// Enables or disables free-hand input
    ///
    /// Disabling commits a stroke that is still in progress.
    pub fn set_drawing_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.commit_active_stroke();
        }
        self.drawing_enabled = enabled;
    }

    /// Opens a new stroke at `point`
    ///
    /// Ignored while drawing is disabled or before the background loads.
    pub fn pointer_down(&mut self, point: Point) {
        let Some(bounds) = self.bounds else {
            return;
        };
        if !self.drawing_enabled {
            return;
        }
        self.commit_active_stroke();
        self.active_stroke = Some(vec![bounds.clamp_point(point)]);
    }

    /// Extends the open stroke, if any
    pub fn pointer_move(&mut self, point: Point) {
        let Some(bounds) = self.bounds else {
            return;
        };
        if let Some(points) = self.active_stroke.as_mut() {
            points.push(bounds.clamp_point(point));
        }
    }

    /// Commits the open stroke, if any
    pub fn pointer_up(&mut self) {
        self.commit_active_stroke();
    }

    fn commit_active_stroke(&mut self) {
        if let Some(points) = self.active_stroke.take() {
            debug!("Stroke committed with {} points", points.len());
            self.strokes.push(Stroke {
                points,
                style: self.brush,
            });
        }
    }

    /// Committed strokes, oldest first
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Removes every stroke; the background is untouched
    pub fn clear(&mut self) {
        self.active_stroke = None;
        self.strokes.clear();
    }

    /// Drops the background and every stroke when the session ends
    pub fn dispose(&mut self) {
        self.clear();
        self.background = None;
        self.scale = None;
        self.bounds = None;
        self.drawing_enabled = false;
    }

    /// Flattens background and strokes, plus `overlay` if given
    ///
    /// The output is the canvas rendered at `multiplier` times its on-screen
    /// size. Returns `None` before a background has loaded.
    pub fn rasterize(
        &self,
        multiplier: f64,
        overlay: Option<(&CropRegion, &OverlayStyle)>,
    ) -> Option<Bitmap> {
        let background = self.background.as_ref()?;
        let bounds = self.bounds?;
        let (width, height) = bounds.pixel_size(multiplier);

        let mut canvas = background.resize_exact(width, height);
        let img = canvas.as_rgba_mut();

        for stroke in &self.strokes {
            let points: Vec<Point> = stroke
                .points
                .iter()
                .map(|p| Point::new(p.x * multiplier, p.y * multiplier))
                .collect();
            raster::draw_polyline(img, &points, stroke.style.width * multiplier, stroke.style.color);
        }

        if let Some((region, style)) = overlay {
            raster::draw_overlay(img, region, style, multiplier);
        }

        Some(canvas)
    }
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("state", &self.state)
            .field("bounds", &self.bounds)
            .field("drawing_enabled", &self.drawing_enabled)
            .field("strokes", &self.strokes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::Rgba;

    use super::*;
    use crate::{config::EditorConfig, export::encode_png, model::Color};

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn png_source(width: u32, height: u32) -> ImageSource {
        let bitmap = Bitmap::solid(width, height, BLUE);
        ImageSource::Bytes(encode_png(&bitmap, Default::default()).unwrap().bytes)
    }

    fn surface_with(config: &EditorConfig, decoder: Arc<dyn ImageDecoder>) -> CanvasSurface {
        CanvasSurface::new(config, decoder, LivenessToken::new())
    }

    async fn loaded_surface(width: u32, height: u32) -> CanvasSurface {
        let config = EditorConfig::builder().container_width(400.0).build();
        let mut surface = surface_with(&config, Arc::new(BlockingDecoder));
        let pending = surface.begin_load(png_source(width, height)).unwrap();
        surface.finish_load(pending.resolve().await).unwrap();
        surface
    }

    #[tokio::test]
    async fn test_load_sets_scale_and_bounds() {
        let surface = loaded_surface(800, 600).await;
        assert!(surface.is_loaded());
        assert_eq!(surface.scale().unwrap().value(), 0.5);
        assert_eq!(surface.bounds(), Some(CanvasBounds::new(400.0, 300.0)));
        assert_eq!(surface.pixel_size(), Some((400, 300)));
    }

    #[tokio::test]
    async fn test_load_small_image_keeps_native_size() {
        let surface = loaded_surface(120, 80).await;
        assert_eq!(surface.scale().unwrap().value(), 1.0);
        assert_eq!(surface.pixel_size(), Some((120, 80)));
    }

    #[tokio::test]
    async fn test_second_load_rejected() {
        let mut surface = loaded_surface(10, 10).await;
        assert!(surface.begin_load(png_source(10, 10)).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_after_revoke_is_noop() {
        let config = EditorConfig::default();
        let token = LivenessToken::new();
        let decoder = MockDecoder::new().with_delay(Duration::from_millis(200));
        let mut surface = CanvasSurface::new(&config, Arc::new(decoder), token.clone());

        let pending = surface.begin_load(png_source(50, 50)).unwrap();
        token.revoke();
        let outcome = surface.finish_load(pending.resolve().await).unwrap();

        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(surface.bounds().is_none());
        assert_eq!(*surface.load_state(), LoadState::Loading);
    }

    #[tokio::test]
    async fn test_load_from_other_session_is_noop() {
        let config = EditorConfig::default();
        let mut other = surface_with(&config, Arc::new(BlockingDecoder));
        let pending = other.begin_load(png_source(20, 20)).unwrap();

        let mut surface = surface_with(&config, Arc::new(BlockingDecoder));
        let outcome = surface.finish_load(pending.resolve().await).unwrap();
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(!surface.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_decode_recorded() {
        let config = EditorConfig::default();
        let mut surface = surface_with(&config, Arc::new(MockDecoder::new().with_error("bad")));
        let pending = surface.begin_load(png_source(20, 20)).unwrap();

        let err = surface.finish_load(pending.resolve().await).unwrap_err();
        assert!(matches!(err, EditorError::DecodeFailed { .. }));
        assert!(matches!(surface.load_state(), LoadState::Failed(reason) if reason.contains("bad")));
        assert!(surface.rasterize(1.0, None).is_none());
    }

    #[tokio::test]
    async fn test_strokes_accumulate_and_clear() {
        let mut surface = loaded_surface(400, 300).await;

        surface.pointer_down(Point::new(10.0, 10.0));
        surface.pointer_move(Point::new(20.0, 10.0));
        surface.pointer_up();
        surface.pointer_down(Point::new(50.0, 50.0));
        surface.pointer_up();

        assert_eq!(surface.strokes().len(), 2);
        assert_eq!(surface.strokes()[0].points.len(), 2);
        assert_eq!(surface.strokes()[0].style.color, Color::RED);

        surface.clear();
        assert!(surface.strokes().is_empty());
        assert!(surface.is_loaded());
    }

    #[tokio::test]
    async fn test_pointer_ignored_when_drawing_disabled() {
        let mut surface = loaded_surface(400, 300).await;
        surface.set_drawing_enabled(false);
        surface.pointer_down(Point::new(10.0, 10.0));
        surface.pointer_move(Point::new(20.0, 20.0));
        surface.pointer_up();
        assert!(surface.strokes().is_empty());
    }

    #[tokio::test]
    async fn test_disabling_commits_open_stroke() {
        let mut surface = loaded_surface(400, 300).await;
        surface.pointer_down(Point::new(10.0, 10.0));
        surface.pointer_move(Point::new(30.0, 10.0));
        surface.set_drawing_enabled(false);
        assert_eq!(surface.strokes().len(), 1);
    }

    #[tokio::test]
    async fn test_stroke_points_clamped_to_canvas() {
        let mut surface = loaded_surface(400, 300).await;
        surface.pointer_down(Point::new(-5.0, 500.0));
        surface.pointer_up();
        assert_eq!(surface.strokes()[0].points[0], Point::new(0.0, 300.0));
    }

    #[test]
    fn test_pointer_ignored_before_load() {
        let config = EditorConfig::default();
        let mut surface = surface_with(&config, Arc::new(BlockingDecoder));
        surface.pointer_down(Point::new(1.0, 1.0));
        surface.pointer_up();
        assert!(surface.strokes().is_empty());
    }

    #[tokio::test]
    async fn test_rasterize_draws_strokes_at_multiplier() {
        let mut surface = loaded_surface(400, 300).await;
        surface.pointer_down(Point::new(100.0, 100.0));
        surface.pointer_move(Point::new(150.0, 100.0));
        surface.pointer_up();

        let flat = surface.rasterize(1.0, None).unwrap();
        assert_eq!(flat.dimensions(), (400, 300));
        assert_eq!(flat.pixel(120, 100), Some(Color::RED.to_rgba()));
        assert_eq!(flat.pixel(120, 120), Some(BLUE));

        let big = surface.rasterize(3.0, None).unwrap();
        assert_eq!(big.dimensions(), (1200, 900));
        assert_eq!(big.pixel(360, 300), Some(Color::RED.to_rgba()));
        assert_eq!(big.pixel(360, 360), Some(BLUE));
    }

    #[tokio::test]
    async fn test_rasterize_with_overlay() {
        let surface = loaded_surface(400, 300).await;
        let region = CropRegion::new(100.0, 50.0, 200.0, 150.0);
        let style = OverlayStyle::default();

        let flat = surface.rasterize(1.0, Some((&region, &style))).unwrap();
        assert_eq!(flat.pixel(100, 120), Some(Color::RED.to_rgba()));
        assert_ne!(flat.pixel(200, 120), Some(BLUE));
        assert_eq!(flat.pixel(10, 10), Some(BLUE));
    }
}
