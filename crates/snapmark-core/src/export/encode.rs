//! PNG encoding for exported bitmaps
//!
//! The editor hands its result to the caller as an encoded PNG. Compression
//! is configurable; filtering is always adaptive.
//!
//! # Examples
//!
//! ```
//! use snapmark_core::{canvas::Bitmap, config::PngCompression, export::encode_png};
//!
//! let img = Bitmap::from_test_pattern(100, 100);
//! let encoded = encode_png(&img, PngCompression::Fast).unwrap();
//! assert_eq!(encoded.dimensions(), (100, 100));
//! assert!(encoded.to_data_uri().starts_with("data:image/png;base64,"));
//! ```

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{
    ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};

use crate::{
    canvas::Bitmap,
    config::PngCompression,
    error::{EditorError, EditorResult},
};

/// An encoded PNG ready to hand to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// PNG bytes
    pub bytes:  Vec<u8>,
    pub width:  u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Renders the image as a `data:image/png;base64,...` URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

fn compression_type(compression: PngCompression) -> CompressionType {
    match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    }
}

/// Encodes a bitmap as PNG
pub fn encode_png(bitmap: &Bitmap, compression: PngCompression) -> EditorResult<EncodedImage> {
    let rgba = bitmap.as_rgba();
    let (width, height) = rgba.dimensions();

    if width == 0 || height == 0 {
        return Err(EditorError::invalid_parameter(
            "dimensions",
            "Image dimensions must be > 0",
        ));
    }

    let mut output = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut output),
        compression_type(compression),
        FilterType::Adaptive,
    );

    encoder
        .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| EditorError::EncodingFailed {
            format: "png".to_string(),
            reason: e.to_string(),
        })?;

    Ok(EncodedImage {
        bytes: output,
        width,
        height,
    })
}
