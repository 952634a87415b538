//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, resize_to_fit } from '@idsnap/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const preview = resize_to_fit(image, 1024, 1); // Bilinear for the crop UI
//! ```

use crate::types::{filter_from_u8, JsRasterImage};
use idsnap_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an uploaded JPEG or PNG, applying EXIF orientation.
///
/// # Errors
///
/// Returns an error string if the bytes are not a supported image or are
/// truncated.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resize an image to exact dimensions.
///
/// * `filter` - 0=Nearest, 1=Bilinear, 2=Lanczos3 (default)
#[wasm_bindgen]
pub fn resize(
    image: &JsRasterImage,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsRasterImage, JsValue> {
    let raster = image.to_raster().map_err(|e| JsValue::from_str(&e))?;

    decode::resize(&raster, width, height, filter_from_u8(filter))
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resize an image to fit within `max_edge`, preserving aspect ratio.
///
/// Images already smaller are returned unchanged (no upscaling).
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsRasterImage,
    max_edge: u32,
    filter: u8,
) -> Result<JsRasterImage, JsValue> {
    let raster = image.to_raster().map_err(|e| JsValue::from_str(&e))?;

    decode::resize_to_fit(&raster, max_edge, filter_from_u8(filter))
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
