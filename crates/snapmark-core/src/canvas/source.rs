//! Encoded image sources
//!
//! The editor accepts exactly one kind of input: an encoded image, either as
//! a `data:` URI (the form a browser capture produces) or as raw encoded
//! bytes read from disk. Decoding is format-sniffed, so PNG, JPEG, and WebP
//! all work.

use base64::{Engine, engine::general_purpose::STANDARD};

use super::Bitmap;
use crate::error::{EditorError, EditorResult};

/// An encoded image waiting to be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:image/png;base64,...`
    DataUri(String),
    /// Raw encoded bytes (PNG, JPEG, WebP)
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Wraps a `data:` URI; it is validated when decoded
    pub fn from_data_uri(uri: impl Into<String>) -> Self {
        ImageSource::DataUri(uri.into())
    }

    /// Returns the encoded bytes, decoding the base64 payload of a data URI
    pub fn into_bytes(self) -> EditorResult<Vec<u8>> {
        match self {
            ImageSource::Bytes(bytes) => Ok(bytes),
            ImageSource::DataUri(uri) => parse_data_uri(&uri),
        }
    }

    /// Decodes the source into a bitmap
    ///
    /// This is CPU-bound; async callers should go through an
    /// [`ImageDecoder`](super::ImageDecoder) instead of calling it directly.
    pub fn decode(self) -> EditorResult<Bitmap> {
        let bytes = self.into_bytes()?;
        let image = image::load_from_memory(&bytes).map_err(|e| EditorError::DecodeFailed {
            reason: e.to_string(),
        })?;
        Ok(Bitmap::from(image))
    }
}

/// Extracts the payload of a base64 `data:` URI
///
/// # Examples
///
/// ```
/// use snapmark_core::canvas::parse_data_uri;
///
/// let bytes = parse_data_uri("data:text/plain;base64,aGk=").unwrap();
/// assert_eq!(bytes, b"hi");
///
/// assert!(parse_data_uri("data:text/plain,hi").is_err());
/// ```
pub fn parse_data_uri(uri: &str) -> EditorResult<Vec<u8>> {
    let rest = uri.trim().strip_prefix("data:").ok_or_else(|| EditorError::InvalidDataUri {
        reason: "missing 'data:' scheme".to_string(),
    })?;

    let (header, payload) = rest.split_once(',').ok_or_else(|| EditorError::InvalidDataUri {
        reason: "missing ',' between header and payload".to_string(),
    })?;

    if !header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(EditorError::InvalidDataUri {
            reason: "only base64 payloads are supported".to_string(),
        });
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| EditorError::InvalidDataUri {
            reason: format!("bad base64 payload: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 255]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_decode_bytes() {
        let bitmap = ImageSource::Bytes(tiny_png()).decode().unwrap();
        assert_eq!(bitmap.dimensions(), (3, 2));
        assert_eq!(bitmap.pixel(2, 1), Some(image::Rgba([9, 8, 7, 255])));
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(tiny_png()));
        let bitmap = ImageSource::from_data_uri(uri).decode().unwrap();
        assert_eq!(bitmap.dimensions(), (3, 2));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = ImageSource::Bytes(vec![1, 2, 3, 4]).decode().unwrap_err();
        assert!(matches!(err, EditorError::DecodeFailed { .. }));
    }

    #[test]
    fn test_parse_data_uri_errors() {
        assert!(matches!(
            parse_data_uri("image/png;base64,AAAA"),
            Err(EditorError::InvalidDataUri { .. })
        ));
        assert!(matches!(
            parse_data_uri("data:image/png;base64"),
            Err(EditorError::InvalidDataUri { .. })
        ));
        assert!(matches!(
            parse_data_uri("data:image/png;base64,@@@"),
            Err(EditorError::InvalidDataUri { .. })
        ));
    }

    #[test]
    fn test_parse_data_uri_case_insensitive_marker() {
        let bytes = parse_data_uri("data:image/png;BASE64,aGk=").unwrap();
        assert_eq!(bytes, b"hi");
    }
}
