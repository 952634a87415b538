//! idsnap Core - ID photo and signature preparation
//!
//! This crate turns a captured or uploaded photo into a JPEG that satisfies
//! an upload form's contract: exact pixel dimensions and an encoded size
//! inside a byte window (e.g. "3.5×4.5 cm, 20–50 KB").
//!
//! Pipeline: [`decode`] the source → [`transform`] crop to the preset's
//! aspect ratio → [`encode`] onto the exact-size canvas and search for a
//! JPEG quality that fits the [`target`] byte window.

pub mod decode;
pub mod encode;
pub mod target;
pub mod transform;

pub use decode::{decode_image, FilterType, RasterImage};
pub use encode::{
    encode_to_target, EncodeError, EncodeOutcome, EncodedJpeg, SearchConfig,
    SizeConstrainedEncoder, SizeConstraintViolation,
};
pub use target::{Preset, Rgb, TargetSpec};
pub use transform::{apply_crop, crop_to_aspect, CropRect};

/// Decode, crop to the preset's aspect ratio and encode in one call.
///
/// Convenience for hosts that skip the interactive crop step and accept
/// the centered default crop.
pub fn prepare_upload(
    bytes: &[u8],
    preset: Preset,
    dpi: f64,
    config: SearchConfig,
) -> Result<EncodeOutcome, EncodeError> {
    let spec = TargetSpec::from_preset(preset, dpi)?;
    let source = decode_image(bytes)?;
    let cropped = crop_to_aspect(&source, preset.aspect_ratio());
    encode_to_target(&cropped, &spec, config)
}
