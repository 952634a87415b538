//! Source image decoding for idsnap.
//!
//! This module provides functionality for:
//! - Decoding uploaded or captured JPEG/PNG files into RGBA rasters
//! - Applying EXIF orientation so portrait captures come out upright
//! - Resizing for previews and exact-size output
//!
//! All operations are synchronous and single-threaded within WASM.
//!
//! # Examples
//!
//! ```ignore
//! use idsnap_core::decode::decode_image;
//!
//! let bytes = std::fs::read("capture.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod resize;
mod source;
mod types;

pub use resize::{resize, resize_to_fit};
pub use source::{decode_image, decode_image_no_orientation, get_orientation};
pub use types::{DecodeError, FilterType, Orientation, RasterImage};
