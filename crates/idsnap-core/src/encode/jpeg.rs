//! JPEG encoding backends.
//!
//! The quality search only needs "encode this canvas at quality q and give me
//! the bytes", so the encoder sits behind [`JpegBackend`]. The default
//! [`ImageJpegBackend`] uses the `image` crate's baseline JPEG encoder.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::io::Cursor;

use super::EncodeError;

/// Something that can turn an RGB canvas into JPEG bytes.
///
/// `quality` is on the 0.0–1.0 scale used by browser encoders
/// (`canvas.toBlob(cb, "image/jpeg", q)`).
pub trait JpegBackend {
    fn encode(&self, canvas: &RgbImage, quality: f32) -> Result<Vec<u8>, EncodeError>;
}

/// Baseline JPEG via `image::codecs::jpeg::JpegEncoder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageJpegBackend;

impl JpegBackend for ImageJpegBackend {
    fn encode(&self, canvas: &RgbImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = canvas.dimensions();
        encode_jpeg(canvas.as_raw(), width, height, quality_to_percent(quality))
    }
}

/// Map a 0.0–1.0 quality to the encoder's 1–100 scale.
pub fn quality_to_percent(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 1;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, clamped)
///
/// # Errors
///
/// Fails on zero dimensions, a pixel buffer that does not match them, or an
/// encoder error.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());

    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}
