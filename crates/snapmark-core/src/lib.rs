//! snapmark-core: Annotation and crop editor core
//!
//! This library holds everything behind a screenshot markup session: the
//! canvas that scales an image to fit and records free-hand strokes, the
//! crop rectangle and its clamping geometry, the exporter that renders crops
//! at a higher resolution, and the controller that ties them into one
//! save-or-cancel session.

pub mod canvas;
pub mod config;
pub mod crop;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod script;
pub mod session;
