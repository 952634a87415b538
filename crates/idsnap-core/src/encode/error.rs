use thiserror::Error;

use crate::decode::DecodeError;

/// Errors that stop an encode before or during encoding.
///
/// Missing the byte window is not an error; see
/// [`SizeConstraintViolation`](super::SizeConstraintViolation).
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Target spec cannot be satisfied by construction (zero size, bad window).
    #[error("Invalid target spec: {0}")]
    InvalidSpec(String),

    /// Search configuration is out of range.
    #[error("Invalid search config: {0}")]
    InvalidConfig(String),

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Source raster could not be read or decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}
