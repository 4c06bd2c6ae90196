//! Test utilities for snapmark integration tests
//!
//! Shared helpers for exercising editor sessions end to end without a real
//! screenshot on disk.
//!
//! # Usage
//!
//! Add to your crate's dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! snapmark-test-utils = { path = "../snapmark-test-utils" }
//! ```
//!
//! # Modules
//!
//! - [`fixtures`]: Encoded test images as bytes, data URIs, or sources
//! - [`recording`]: Editor callbacks that record what they receive
//!
//! # Example
//!
//! ```
//! use snapmark_core::{config::EditorConfig, editor::EditorController};
//! use snapmark_test_utils::{fixtures, recording::RecordingCallbacks};
//!
//! #[tokio::main]
//! async fn main() {
//!     let callbacks = RecordingCallbacks::new();
//!     let mut editor =
//!         EditorController::new(EditorConfig::default(), Box::new(callbacks.clone())).unwrap();
//!
//!     editor.load(fixtures::test_pattern_source(400, 300)).await.unwrap();
//!     editor.cancel();
//!
//!     assert_eq!(callbacks.cancel_count(), 1);
//! }
//! ```

pub mod fixtures;
pub mod recording;
