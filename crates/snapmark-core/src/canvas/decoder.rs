//! Asynchronous image decoding
//!
//! Decoding is the editor's only suspension point. [`ImageDecoder`] is the
//! seam: [`BlockingDecoder`] runs the decode on tokio's blocking pool, and
//! [`MockDecoder`] adds an artificial delay or a forced failure so tests can
//! race a decode against session teardown.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use snapmark_core::canvas::{ImageDecoder, ImageSource, MockDecoder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let decoder = MockDecoder::new().with_error("corrupt header");
//!     let result = decoder.decode(ImageSource::Bytes(vec![])).await;
//!     assert!(result.is_err());
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{Bitmap, ImageSource};
use crate::error::{EditorError, EditorResult};

/// Turns an encoded source into a bitmap without blocking the caller
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, source: ImageSource) -> EditorResult<Bitmap>;
}

/// Decodes on tokio's blocking thread pool
///
/// Requires a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingDecoder;

#[async_trait]
impl ImageDecoder for BlockingDecoder {
    async fn decode(&self, source: ImageSource) -> EditorResult<Bitmap> {
        tokio::task::spawn_blocking(move || source.decode())
            .await
            .map_err(|e| EditorError::LoadAborted {
                reason: e.to_string(),
            })?
    }
}

/// Decoder for tests: real decoding plus optional delay and failure
#[derive(Debug, Default, Clone)]
pub struct MockDecoder {
    /// Sleep before returning
    delay: Option<Duration>,
    /// Reason to fail every decode with
    error: Option<String>,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` before each decode completes
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails every decode with [`EditorError::DecodeFailed`]
    pub fn with_error(mut self, reason: impl Into<String>) -> Self {
        self.error = Some(reason.into());
        self
    }
}

#[async_trait]
impl ImageDecoder for MockDecoder {
    async fn decode(&self, source: ImageSource) -> EditorResult<Bitmap> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        if let Some(reason) = &self.error {
            return Err(EditorError::DecodeFailed {
                reason: reason.clone(),
            });
        }

        source.decode()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        image::DynamicImage::new_rgba8(width, height)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[tokio::test]
    async fn test_blocking_decoder_decodes() {
        let bitmap = BlockingDecoder.decode(ImageSource::Bytes(png_bytes(7, 5))).await.unwrap();
        assert_eq!(bitmap.dimensions(), (7, 5));
    }

    #[tokio::test]
    async fn test_blocking_decoder_reports_decode_failure() {
        let err = BlockingDecoder.decode(ImageSource::Bytes(vec![0; 16])).await.unwrap_err();
        assert!(matches!(err, EditorError::DecodeFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_decoder_delay() {
        let decoder = MockDecoder::new().with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        let bitmap = decoder.decode(ImageSource::Bytes(png_bytes(2, 2))).await.unwrap();
        assert_eq!(bitmap.dimensions(), (2, 2));
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_mock_decoder_error_injection() {
        let decoder = MockDecoder::new().with_error("boom");
        let err = decoder.decode(ImageSource::Bytes(png_bytes(2, 2))).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to decode image: boom");
    }
}
