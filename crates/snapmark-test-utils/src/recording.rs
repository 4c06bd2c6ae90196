//! Callbacks that record what the editor hands back
//!
//! [`RecordingCallbacks`] is cheap to clone; every clone shares the same
//! record, so a test keeps one handle and gives the editor another.

use std::sync::Arc;

use parking_lot::Mutex;
use snapmark_core::{editor::EditorCallbacks, export::EncodedImage};

#[derive(Debug, Default)]
struct Record {
    saved:     Vec<EncodedImage>,
    cancelled: usize,
}

/// Shared recorder for `on_save` and `on_cancel`
#[derive(Debug, Default, Clone)]
pub struct RecordingCallbacks {
    record: Arc<Mutex<Record>>,
}

impl RecordingCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images received by `on_save`, in order
    pub fn saved(&self) -> Vec<EncodedImage> {
        self.record.lock().saved.clone()
    }

    pub fn save_count(&self) -> usize {
        self.record.lock().saved.len()
    }

    pub fn cancel_count(&self) -> usize {
        self.record.lock().cancelled
    }

    /// Total callback invocations of either kind
    pub fn total_calls(&self) -> usize {
        let record = self.record.lock();
        record.saved.len() + record.cancelled
    }
}

impl EditorCallbacks for RecordingCallbacks {
    fn on_save(&mut self, image: EncodedImage) {
        self.record.lock().saved.push(image);
    }

    fn on_cancel(&mut self) {
        self.record.lock().cancelled += 1;
    }
}
