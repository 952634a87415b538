//! idsnap WASM - WebAssembly bindings for idsnap
//!
//! This crate exposes the idsnap-core pipeline to the browser app that
//! captures or uploads a photo, crops it and downloads the encoded result.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Decoding uploads and resizing
//! - `transform` - Fixed-aspect cropping
//! - `encode` - Target specs, presets and the size-constrained encoder
//!
//! # Usage
//!
//! ```typescript
//! import init, {
//!   decode_image, crop_to_aspect, encode_to_target, target_for_preset,
//! } from '@idsnap/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const cropped = crop_to_aspect(image, 3.5 / 4.5);
//! const outcome = encode_to_target(cropped, target_for_preset('photo', 100), undefined);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod transform;
mod types;

pub use decode::{decode_image, resize, resize_to_fit};
pub use encode::{
    encode_jpeg, encode_to_target, file_name_for_preset, make_target_spec, target_for_preset,
    JsEncodeOutcome,
};
pub use transform::{apply_crop, crop_to_aspect, default_crop_box};
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
///
/// Routes panics and `log` output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) finds the logger already set.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
