//! Error types for editor operations
//!
//! Every failure the editor can report is a variant of [`EditorError`]. Each
//! variant carries enough context to explain what went wrong and exposes a
//! remediation hint through [`EditorError::remediation_hint`].
//!
//! Most editor problems never reach this type: out-of-bounds crop geometry
//! is corrected in place, and a decode that finishes after the session was
//! torn down is dropped silently. Only failures the caller can act on are
//! returned as errors.

use serde::{Deserialize, Serialize};

/// Result type alias for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// High-level error category for filtering and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid parameters, configuration, or image source
    InvalidInput,
    /// Decoding or encoding failed
    ProcessingError,
    /// I/O or system error
    SystemError,
}

/// Error type for editor operations
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The image source could not be decoded into a bitmap
    #[error("Failed to decode image: {reason}")]
    DecodeFailed {
        /// Reason reported by the decoder
        reason: String,
    },

    /// A `data:` URI was malformed or used an unsupported encoding
    #[error("Invalid data URI: {reason}")]
    InvalidDataUri {
        /// What was wrong with the URI
        reason: String,
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Image format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// The decode task was cancelled or panicked before producing a result
    #[error("Image load task aborted: {reason}")]
    LoadAborted {
        /// Reason reported by the runtime
        reason: String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EditorError {
    /// Shorthand for [`EditorError::InvalidParameter`].
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        EditorError::InvalidParameter {
            parameter: parameter.into(),
            reason:    reason.into(),
        }
    }

    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use snapmark_core::error::EditorError;
    ///
    /// let error = EditorError::invalid_parameter("export_multiplier", "must be 1-8");
    /// assert!(error.remediation_hint().contains("between 1 and 8"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            EditorError::DecodeFailed { .. } => {
                "The image could not be decoded. Make sure the source is a PNG, JPEG, or WebP \
                 image and that the data is not truncated. The editor stays open without a \
                 background; cancel the session and retry with a valid image."
            }
            EditorError::InvalidDataUri { .. } => {
                "Image sources must look like 'data:image/png;base64,<payload>'. Only base64 \
                 payloads are supported."
            }
            EditorError::EncodingFailed { .. } => {
                "Image encoding failed. Ensure the exported region is not empty and retry."
            }
            EditorError::InvalidParameter { parameter, .. } => match parameter.as_str() {
                "export_multiplier" => "The export multiplier must be between 1 and 8.",
                "container_width" | "max_canvas_height" => {
                    "Container width and maximum canvas height must be positive and finite."
                }
                "crop_default" => {
                    "The default crop rectangle needs a positive width and height and a \
                     non-negative position."
                }
                "brush_width" => "Brush width must be greater than 0 and at most 50.",
                "outline_width" => {
                    "The crop outline width must be greater than 0 and at most 20."
                }
                _ => "Check the parameter value against the documentation.",
            },
            EditorError::LoadAborted { .. } => {
                "The image load was interrupted. Retry the load in a new session."
            }
            EditorError::IoError(_) => {
                "An I/O error occurred. Check file paths, permissions, and available disk space."
            }
        }
    }

    /// Returns the category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            EditorError::InvalidDataUri { .. } | EditorError::InvalidParameter { .. } => {
                ErrorCategory::InvalidInput
            }
            EditorError::DecodeFailed { .. } | EditorError::EncodingFailed { .. } => {
                ErrorCategory::ProcessingError
            }
            EditorError::LoadAborted { .. } | EditorError::IoError(_) => ErrorCategory::SystemError,
        }
    }
}
