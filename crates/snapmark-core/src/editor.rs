//! Editor session state machine
//!
//! [`EditorController`] ties the pieces together. It owns the canvas, the
//! crop controller, and the exporter, tracks which mode is active, routes
//! input through an explicit handler table, and ends the session through
//! exactly one of the caller's callbacks.
//!
//! # Modes
//!
//! | Mode       | Installed handlers              | Drawing flag          |
//! |------------|---------------------------------|-----------------------|
//! | `Drawing`  | pointer → stroke                | user-toggled          |
//! | `Cropping` | region move, region resize [^1] | forced off            |
//!
//! [^1]: Installed after the crop region is created; none before a
//!     background has loaded.
//!
//! Leaving crop mode restores the drawing flag that was active on entry.
//!
//! # Examples
//!
//! ```
//! use snapmark_core::{
//!     canvas::{Bitmap, ImageSource},
//!     config::EditorConfig,
//!     editor::{EditorCallbacks, EditorController, SaveOutcome},
//!     export::{EncodedImage, encode_png},
//! };
//!
//! struct PrintSize;
//!
//! impl EditorCallbacks for PrintSize {
//!     fn on_save(&mut self, image: EncodedImage) {
//!         println!("saved {}x{}", image.width, image.height);
//!     }
//!
//!     fn on_cancel(&mut self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let png = encode_png(&Bitmap::from_test_pattern(400, 300), Default::default()).unwrap();
//!
//!     let mut editor = EditorController::new(EditorConfig::default(), Box::new(PrintSize)).unwrap();
//!     editor.load(ImageSource::Bytes(png.bytes)).await.unwrap();
//!
//!     editor.enter_crop();
//!     let outcome = editor.save().unwrap();
//!     assert_eq!(outcome, SaveOutcome::Saved { width: 600, height: 450, cropped: true });
//! }
//! ```

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    canvas::{
        Bitmap, BlockingDecoder, CanvasSurface, ImageDecoder, ImageSource, LoadOutcome, LoadedImage,
        PendingLoad,
    },
    config::EditorConfig,
    crop::CropController,
    error::{EditorError, EditorResult},
    export::{EncodedImage, Exporter},
    model::{CropRegion, EditorMode, Point, ResizeHandle},
    session::LivenessToken,
};

/// Receives the result of a session
///
/// Exactly one of the two methods is called, at most once, when the session
/// ends.
pub trait EditorCallbacks: Send {
    /// The session was saved; `image` is the encoded PNG
    fn on_save(&mut self, image: EncodedImage);

    /// The session was discarded
    fn on_cancel(&mut self);
}

/// User input delivered to the editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { point: Point },
    PointerMove { point: Point },
    PointerUp,
    /// Proposed new top-left corner for the crop region
    MoveRegion { left: f64, top: f64 },
    /// A crop handle dragged to `pointer`
    ResizeRegion { handle: ResizeHandle, pointer: Point },
}

impl InputEvent {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InputEvent::PointerDown { .. } | InputEvent::PointerMove { .. } | InputEvent::PointerUp => {
                InteractionKind::Pointer
            }
            InputEvent::MoveRegion { .. } => InteractionKind::RegionMove,
            InputEvent::ResizeRegion { .. } => InteractionKind::RegionResize,
        }
    }
}

/// Key of the handler table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Pointer,
    RegionMove,
    RegionResize,
}

/// What an installed handler does with its events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Stroke,
    CropMove,
    CropResize,
}

/// Whether the session is still accepting operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Saved,
    Cancelled,
}

/// Why a save produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The session already ended
    SessionClosed,
    /// No background has been loaded
    NotLoaded,
    /// Crop-and-save was requested without a crop region
    NoCropRegion,
}

/// Result of [`EditorController::save`] and [`EditorController::crop_and_save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// `on_save` received a `width` x `height` PNG
    Saved { width: u32, height: u32, cropped: bool },
    /// Nothing was exported and the session is unchanged
    Skipped(SkipReason),
}

/// Top-level editor session
pub struct EditorController {
    surface:             CanvasSurface,
    crop:                CropController,
    exporter:            Exporter,
    mode:                EditorMode,
    drawing_before_crop: bool,
    handlers:            HashMap<InteractionKind, Handler>,
    token:               LivenessToken,
    state:               SessionState,
    callbacks:           Option<Box<dyn EditorCallbacks>>,
}

impl EditorController {
    /// Opens a session that decodes on tokio's blocking pool
    pub fn new(config: EditorConfig, callbacks: Box<dyn EditorCallbacks>) -> EditorResult<Self> {
        Self::with_decoder(config, Arc::new(BlockingDecoder), callbacks)
    }

    /// Opens a session with a custom decoder
    pub fn with_decoder(
        config: EditorConfig,
        decoder: Arc<dyn ImageDecoder>,
        callbacks: Box<dyn EditorCallbacks>,
    ) -> EditorResult<Self> {
        config.validate()?;

        let token = LivenessToken::new();
        let mut editor = Self {
            surface: CanvasSurface::new(&config, decoder, token.clone()),
            crop: CropController::new(&config),
            exporter: Exporter::new(&config),
            mode: EditorMode::Drawing,
            drawing_before_crop: true,
            handlers: HashMap::new(),
            token,
            state: SessionState::Open,
            callbacks: Some(callbacks),
        };
        editor.install_handlers();
        debug!("Editor session opened");
        Ok(editor)
    }

    /// Starts decoding the session's image
    pub fn begin_load(&mut self, source: ImageSource) -> EditorResult<PendingLoad> {
        if !self.is_open() {
            return Err(EditorError::LoadAborted {
                reason: "the editor session has ended".to_string(),
            });
        }
        self.surface.begin_load(source)
    }

    /// Applies a finished decode; a no-op once the session has ended
    pub fn finish_load(&mut self, loaded: LoadedImage) -> EditorResult<LoadOutcome> {
        self.surface.finish_load(loaded)
    }

    /// Decodes `source` and installs it as the background
    pub async fn load(&mut self, source: ImageSource) -> EditorResult<LoadOutcome> {
        let pending = self.begin_load(source)?;
        let loaded = pending.resolve().await;
        self.finish_load(loaded)
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn drawing_enabled(&self) -> bool {
        self.surface.drawing_enabled()
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn crop_region(&self) -> Option<CropRegion> {
        self.crop.region()
    }

    pub fn crop_visible(&self) -> bool {
        self.crop.is_visible()
    }

    /// Whether events of `kind` currently reach a handler
    pub fn handles(&self, kind: InteractionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Flips the drawing flag; ignored in crop mode
    ///
    /// Returns the flag after the call.
    pub fn toggle_drawing(&mut self) -> bool {
        if self.is_open() && self.mode == EditorMode::Drawing {
            let enabled = !self.surface.drawing_enabled();
            self.surface.set_drawing_enabled(enabled);
            debug!("Drawing {}", if enabled { "enabled" } else { "disabled" });
        }
        self.surface.drawing_enabled()
    }

    /// Switches to crop mode with a fresh default region
    ///
    /// Re-entering while already cropping replaces the region. Before a
    /// background has loaded there is no canvas to place a region on, so the
    /// mode switches without one.
    pub fn enter_crop(&mut self) -> Option<CropRegion> {
        if !self.is_open() {
            return None;
        }

        if self.mode == EditorMode::Drawing {
            self.drawing_before_crop = self.surface.drawing_enabled();
        }
        self.surface.set_drawing_enabled(false);
        self.mode = EditorMode::Cropping;

        let region = self.surface.bounds().map(|bounds| self.crop.begin(bounds));
        self.install_handlers();
        debug!("Entered crop mode");
        region
    }

    /// Leaves crop mode, discarding the region
    pub fn exit_crop(&mut self) {
        if !self.is_open() || self.mode != EditorMode::Cropping {
            return;
        }

        self.crop.end();
        self.mode = EditorMode::Drawing;
        self.surface.set_drawing_enabled(self.drawing_before_crop);
        self.install_handlers();
        debug!("Left crop mode");
    }

    /// Removes all strokes, keeping the background and crop region
    pub fn clear(&mut self) {
        if self.is_open() {
            self.surface.clear();
        }
    }

    /// Dispatches one input event
    ///
    /// Returns `false` when no handler is installed for the event's kind.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        let Some(handler) = self.handlers.get(&event.kind()).copied() else {
            return false;
        };

        match (handler, event) {
            (Handler::Stroke, InputEvent::PointerDown { point }) => self.surface.pointer_down(point),
            (Handler::Stroke, InputEvent::PointerMove { point }) => self.surface.pointer_move(point),
            (Handler::Stroke, InputEvent::PointerUp) => self.surface.pointer_up(),
            (Handler::CropMove, InputEvent::MoveRegion { left, top }) => {
                if let Some(bounds) = self.surface.bounds() {
                    self.crop.move_to(left, top, bounds);
                }
            }
            (Handler::CropResize, InputEvent::ResizeRegion { handle, pointer }) => {
                if let Some(bounds) = self.surface.bounds() {
                    self.crop.resize(handle, pointer, bounds);
                }
            }
            _ => return false,
        }
        true
    }

    /// The canvas as currently shown, crop overlay included
    pub fn render_view(&self) -> Option<Bitmap> {
        self.exporter.render_view(&self.surface, &self.crop)
    }

    /// Exports and ends the session
    ///
    /// In crop mode with an active region the crop is exported at the
    /// configured multiplier; otherwise the full canvas. The result goes to
    /// `on_save`. Nothing happens if the session already ended or no
    /// background is loaded.
    pub fn save(&mut self) -> EditorResult<SaveOutcome> {
        if !self.is_open() {
            return Ok(SaveOutcome::Skipped(SkipReason::SessionClosed));
        }

        match (self.mode, self.crop.region()) {
            (EditorMode::Cropping, Some(region)) => self.save_crop(region),
            _ => {
                let Some(bitmap) = self.exporter.export_full(&self.surface, &mut self.crop) else {
                    return Ok(SaveOutcome::Skipped(SkipReason::NotLoaded));
                };
                self.finish_save(&bitmap, false)
            }
        }
    }

    /// Exports just the crop region and ends the session
    ///
    /// A no-op when there is no crop region.
    pub fn crop_and_save(&mut self) -> EditorResult<SaveOutcome> {
        if !self.is_open() {
            return Ok(SaveOutcome::Skipped(SkipReason::SessionClosed));
        }
        let Some(region) = self.crop.region() else {
            debug!("Crop-and-save without a crop region ignored");
            return Ok(SaveOutcome::Skipped(SkipReason::NoCropRegion));
        };
        self.save_crop(region)
    }

    fn save_crop(&mut self, region: CropRegion) -> EditorResult<SaveOutcome> {
        let multiplier = self.exporter.multiplier();
        let Some(bitmap) = self.exporter.export_crop(&self.surface, &mut self.crop, &region, multiplier)
        else {
            return Ok(SaveOutcome::Skipped(SkipReason::NotLoaded));
        };
        self.finish_save(&bitmap, true)
    }

    fn finish_save(&mut self, bitmap: &Bitmap, cropped: bool) -> EditorResult<SaveOutcome> {
        let encoded = self.exporter.encode(bitmap)?;
        let (width, height) = encoded.dimensions();

        self.teardown(SessionState::Saved);
        info!("Editor session saved ({}x{}, cropped: {})", width, height, cropped);
        if let Some(mut callbacks) = self.callbacks.take() {
            callbacks.on_save(encoded);
        }

        Ok(SaveOutcome::Saved {
            width,
            height,
            cropped,
        })
    }

    /// Discards the session and calls `on_cancel`
    ///
    /// Returns `false` if the session had already ended.
    pub fn cancel(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }

        self.teardown(SessionState::Cancelled);
        info!("Editor session cancelled");
        if let Some(mut callbacks) = self.callbacks.take() {
            callbacks.on_cancel();
        }
        true
    }

    fn teardown(&mut self, state: SessionState) {
        self.token.revoke();
        self.crop.end();
        self.surface.dispose();
        self.state = state;
        self.install_handlers();
    }

    /// Rebuilds the handler table for the current mode
    fn install_handlers(&mut self) {
        self.handlers.clear();
        if !self.is_open() {
            return;
        }

        match self.mode {
            EditorMode::Drawing => {
                self.handlers.insert(InteractionKind::Pointer, Handler::Stroke);
            }
            // Region handlers only exist once there is a region to drive
            EditorMode::Cropping if self.crop.is_active() => {
                self.handlers.insert(InteractionKind::RegionMove, Handler::CropMove);
                self.handlers.insert(InteractionKind::RegionResize, Handler::CropResize);
            }
            EditorMode::Cropping => {}
        }
    }
}

impl Drop for EditorController {
    fn drop(&mut self) {
        self.token.revoke();
    }
}

impl std::fmt::Debug for EditorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorController")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("surface", &self.surface)
            .field("crop", &self.crop)
            .finish_non_exhaustive()
    }
}
