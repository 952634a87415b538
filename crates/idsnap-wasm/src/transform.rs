//! WASM bindings for the fixed-aspect crop step.

use crate::types::JsRasterImage;
use idsnap_core::transform::{
    apply_crop as core_crop, centered_crop_for_aspect, crop_to_aspect as core_crop_to_aspect,
};
use wasm_bindgen::prelude::*;

/// Apply crop to an image using normalized coordinates (0.0 to 1.0).
///
/// # Example (TypeScript)
///
/// ```typescript
/// const cropped = apply_crop(image, box.left, box.top, box.width, box.height);
/// ```
#[wasm_bindgen]
pub fn apply_crop(
    image: &JsRasterImage,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> Result<JsRasterImage, JsValue> {
    let src = image.to_raster().map_err(|e| JsValue::from_str(&e))?;
    Ok(JsRasterImage::from_raster(core_crop(&src, left, top, width, height)))
}

/// Crop to the largest centered region with `aspect` (width / height).
#[wasm_bindgen]
pub fn crop_to_aspect(image: &JsRasterImage, aspect: f64) -> Result<JsRasterImage, JsValue> {
    let src = image.to_raster().map_err(|e| JsValue::from_str(&e))?;
    Ok(JsRasterImage::from_raster(core_crop_to_aspect(&src, aspect)))
}

/// Initial crop box for the crop UI as `[left, top, width, height]`.
#[wasm_bindgen]
pub fn default_crop_box(width: u32, height: u32, aspect: f64) -> Vec<f64> {
    let rect = centered_crop_for_aspect(width, height, aspect);
    vec![rect.left, rect.top, rect.width, rect.height]
}
