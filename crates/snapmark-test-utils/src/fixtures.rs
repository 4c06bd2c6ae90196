//! Encoded test images
//!
//! Every fixture is generated in memory and PNG-encoded with the same
//! encoder the editor uses for its output.

use image::Rgba;
use snapmark_core::{
    canvas::{Bitmap, ImageSource},
    config::PngCompression,
    export::encode_png,
};

pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// PNG bytes of a single-colour image
pub fn solid_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    encode(&Bitmap::solid(width, height, color))
}

/// PNG bytes of a gradient test pattern
pub fn test_pattern_png(width: u32, height: u32) -> Vec<u8> {
    encode(&Bitmap::from_test_pattern(width, height))
}

/// `data:image/png;base64,...` URI of a single-colour image
pub fn solid_data_uri(width: u32, height: u32, color: Rgba<u8>) -> String {
    match encode_png(&Bitmap::solid(width, height, color), PngCompression::Fast) {
        Ok(encoded) => encoded.to_data_uri(),
        Err(e) => panic!("fixture encoding failed: {}", e),
    }
}

pub fn solid_source(width: u32, height: u32, color: Rgba<u8>) -> ImageSource {
    ImageSource::Bytes(solid_png(width, height, color))
}

pub fn test_pattern_source(width: u32, height: u32) -> ImageSource {
    ImageSource::Bytes(test_pattern_png(width, height))
}

/// Bytes that no decoder accepts
pub fn corrupt_png() -> Vec<u8> {
    let mut bytes = test_pattern_png(8, 8);
    bytes.truncate(24);
    bytes
}

/// Decodes PNG bytes produced by the editor
pub fn decode(bytes: &[u8]) -> Bitmap {
    match ImageSource::Bytes(bytes.to_vec()).decode() {
        Ok(bitmap) => bitmap,
        Err(e) => panic!("fixture decode failed: {}", e),
    }
}

fn encode(bitmap: &Bitmap) -> Vec<u8> {
    match encode_png(bitmap, PngCompression::Fast) {
        Ok(encoded) => encoded.bytes,
        Err(e) => panic!("fixture encoding failed: {}", e),
    }
}
