//! Cropping with normalized coordinates.
//!
//! Crop rectangles are in the range 0.0 to 1.0 so the host can position the
//! box on a downscaled preview and apply it to the full-resolution capture.
//!
//! # Coordinate System
//!
//! - (0.0, 0.0) = top-left corner
//! - (1.0, 1.0) = bottom-right corner
//! - width/height are relative to original dimensions

use serde::{Deserialize, Serialize};

use crate::decode::RasterImage;

/// A crop region in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const FULL: CropRect = CropRect {
        left: 0.0,
        top: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn is_full(&self) -> bool {
        self.left <= 0.0 && self.top <= 0.0 && self.width >= 1.0 && self.height >= 1.0
    }
}

/// Largest centered crop of a `width × height` image with the given aspect
/// ratio (width / height).
///
/// This is the initial crop box for the fixed-aspect crop step: a 3.5 × 4.5
/// photo preset on a landscape capture trims the sides, a signature preset
/// on a portrait capture trims top and bottom.
pub fn centered_crop_for_aspect(width: u32, height: u32, aspect: f64) -> CropRect {
    if width == 0 || height == 0 || !aspect.is_finite() || aspect <= 0.0 {
        return CropRect::FULL;
    }

    let source_aspect = f64::from(width) / f64::from(height);

    if source_aspect > aspect {
        let w = aspect / source_aspect;
        CropRect {
            left: (1.0 - w) / 2.0,
            top: 0.0,
            width: w,
            height: 1.0,
        }
    } else {
        let h = source_aspect / aspect;
        CropRect {
            left: 0.0,
            top: (1.0 - h) / 2.0,
            width: 1.0,
            height: h,
        }
    }
}

/// Crop `image` to the largest centered region with the given aspect ratio.
pub fn crop_to_aspect(image: &RasterImage, aspect: f64) -> RasterImage {
    let rect = centered_crop_for_aspect(image.width, image.height, aspect);
    apply_crop_rect(image, &rect)
}

/// Apply a [`CropRect`].
pub fn apply_crop_rect(image: &RasterImage, rect: &CropRect) -> RasterImage {
    apply_crop(image, rect.left, rect.top, rect.width, rect.height)
}

/// Apply crop to an image using normalized coordinates.
///
/// # Behavior
///
/// - Coordinates extending beyond the image are clamped
/// - Minimum output dimension is 1x1 pixels
/// - Full crop (0, 0, 1, 1) returns a copy of the original image
pub fn apply_crop(
    image: &RasterImage,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> RasterImage {
    let rect = CropRect {
        left,
        top,
        width,
        height,
    };
    if rect.is_full() || image.is_empty() {
        return image.clone();
    }

    let src_w = f64::from(image.width);
    let src_h = f64::from(image.height);

    let px_left = ((left.clamp(0.0, 1.0) * src_w).round() as u32).min(image.width - 1);
    let px_top = ((top.clamp(0.0, 1.0) * src_h).round() as u32).min(image.height - 1);
    let px_width = (width.clamp(0.0, 1.0) * src_w).round() as u32;
    let px_height = (height.clamp(0.0, 1.0) * src_h).round() as u32;

    let px_right = (px_left + px_width).min(image.width);
    let px_bottom = (px_top + px_height).min(image.height);

    let out_width = px_right.saturating_sub(px_left).max(1);
    let out_height = px_bottom.saturating_sub(px_top).max(1);

    let stride = image.width as usize * 4;
    let row_len = out_width as usize * 4;
    let mut output = Vec::with_capacity(row_len * out_height as usize);

    for y in px_top..px_top + out_height {
        let start = y as usize * stride + px_left as usize * 4;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    RasterImage {
        width: out_width,
        height: out_height,
        pixels: output,
    }
}
