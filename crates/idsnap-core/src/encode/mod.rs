//! JPEG output for idsnap.
//!
//! This module provides functionality for:
//! - Encoding RGB pixel data to JPEG at a fixed quality
//! - Composing the exact-size output canvas (background fill + stretch-to-fill)
//! - Searching for a quality whose output fits a target byte window
//!
//! All operations are synchronous and single-threaded within WASM. Each call
//! owns its canvas and buffers; nothing is shared between calls.
//!
//! # Examples
//!
//! ```ignore
//! use idsnap_core::encode::{encode_to_target, SearchConfig};
//! use idsnap_core::target::{Preset, TargetSpec};
//!
//! let spec = TargetSpec::from_preset(Preset::Signature, 200.0)?;
//! let outcome = encode_to_target(&image, &spec, SearchConfig::default())?;
//! ```

mod canvas;
mod error;
mod jpeg;
mod search;

pub use canvas::compose_canvas;
pub use error::EncodeError;
pub use jpeg::{encode_jpeg, quality_to_percent, ImageJpegBackend, JpegBackend};
pub use search::{
    encode_to_target, EncodeAttempt, EncodeOutcome, EncodedJpeg, SearchConfig,
    SizeConstrainedEncoder, SizeConstraintViolation, QUALITY_RESOLUTION,
};
