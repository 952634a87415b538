//! Crop operations for the fixed-aspect crop step.
//!
//! The host positions a crop box locked to the preset's aspect ratio; these
//! functions apply it to the decoded capture before encoding.

mod crop;

pub use crop::{apply_crop, apply_crop_rect, centered_crop_for_aspect, crop_to_aspect, CropRect};
