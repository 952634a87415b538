//! Size-constrained quality search.
//!
//! Upload forms accept a JPEG only when its file size falls inside a byte
//! window. The encoder renders the target canvas once, then re-encodes it at
//! stepped quality values until the size lands inside the window or the try
//! budget runs out.
//!
//! JPEG size grows with quality but not strictly (block artifacts make it
//! noisy), so the search is a fixed-step walk rather than a bisection.
//!
//! # Example
//!
//! ```ignore
//! use idsnap_core::encode::{EncodeOutcome, SearchConfig, SizeConstrainedEncoder};
//! use idsnap_core::target::{Preset, TargetSpec};
//!
//! let spec = TargetSpec::from_preset(Preset::Photo, 100.0)?;
//! match SizeConstrainedEncoder::new(SearchConfig::default()).encode(&image, &spec)? {
//!     EncodeOutcome::Fit(jpeg) => save(Preset::Photo.file_name(), &jpeg.bytes),
//!     EncodeOutcome::OutOfRange(violation) => show_error(&violation.to_string()),
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::canvas::compose_canvas;
use super::jpeg::{ImageJpegBackend, JpegBackend};
use super::EncodeError;
use crate::decode::{FilterType, RasterImage};
use crate::target::{format_kb, TargetSpec};

/// Tunables for the quality search.
///
/// Every field has a default, so hosts may pass a partial object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quality of the first encode (0.0 to 1.0).
    pub initial_quality: f32,
    /// Amount quality moves per retry.
    pub quality_step: f32,
    /// Re-encodes allowed after the first encode.
    pub max_tries: u32,
    /// Lowest quality the search may use.
    pub quality_floor: f32,
    /// Highest quality the search may use.
    pub quality_ceiling: f32,
    /// Resampling filter used to scale the source onto the canvas.
    pub filter: FilterType,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_quality: 0.90,
            quality_step: 0.05,
            max_tries: 20,
            quality_floor: 0.10,
            quality_ceiling: 1.00,
            filter: FilterType::Lanczos3,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), EncodeError> {
        let in_unit = |q: f32| q.is_finite() && q > 0.0 && q <= 1.0;

        if !in_unit(self.quality_floor) || !in_unit(self.quality_ceiling) {
            return Err(EncodeError::InvalidConfig(format!(
                "quality bounds must lie in (0, 1], got [{}, {}]",
                self.quality_floor, self.quality_ceiling
            )));
        }
        if self.quality_floor > self.quality_ceiling {
            return Err(EncodeError::InvalidConfig(format!(
                "quality_floor ({}) exceeds quality_ceiling ({})",
                self.quality_floor, self.quality_ceiling
            )));
        }
        if !(self.quality_floor..=self.quality_ceiling).contains(&self.initial_quality) {
            return Err(EncodeError::InvalidConfig(format!(
                "initial_quality ({}) outside [{}, {}]",
                self.initial_quality, self.quality_floor, self.quality_ceiling
            )));
        }
        if !self.quality_step.is_finite() || self.quality_step < QUALITY_RESOLUTION {
            return Err(EncodeError::InvalidConfig(format!(
                "quality_step must be at least {QUALITY_RESOLUTION}, got {}",
                self.quality_step
            )));
        }
        Ok(())
    }

    fn clamp(&self, quality: f32) -> f32 {
        snap(quality).clamp(self.quality_floor, self.quality_ceiling)
    }

    fn at_bound(&self, quality: f32) -> bool {
        quality <= self.quality_floor || quality >= self.quality_ceiling
    }
}

/// Steps per unit of quality; the search never moves by less than one.
const QUALITY_STEPS_PER_UNIT: f32 = 10_000.0;

/// Smallest quality increment the search distinguishes.
pub const QUALITY_RESOLUTION: f32 = 1.0 / QUALITY_STEPS_PER_UNIT;

/// Round to [`QUALITY_RESOLUTION`] so repeated steps don't accumulate float drift.
fn snap(quality: f32) -> f32 {
    (quality * QUALITY_STEPS_PER_UNIT).round() / QUALITY_STEPS_PER_UNIT
}

/// One encode during the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodeAttempt {
    pub quality: f32,
    pub size_bytes: u64,
}

/// A JPEG that satisfies its target spec.
#[derive(Debug, Clone)]
pub struct EncodedJpeg {
    pub bytes: Vec<u8>,
    pub size_bytes: u64,
    pub quality: f32,
    pub width: u32,
    pub height: u32,
    pub attempts: Vec<EncodeAttempt>,
}

/// The search ended without meeting the byte window.
///
/// Displays as a diagnostic the UI can show verbatim, e.g.
/// `achieved 62 KB, need 20–50 KB`.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeConstraintViolation {
    /// Size of the last encode.
    pub achieved_bytes: u64,
    /// Quality of the last encode.
    pub quality: f32,
    /// The target that was asked for.
    pub constraint: TargetSpec,
    pub attempts: Vec<EncodeAttempt>,
}

impl fmt::Display for SizeConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "achieved {}, need {}",
            format_kb(self.achieved_bytes),
            self.constraint.window_label()
        )
    }
}

/// Result of a completed search. Exactly one variant is produced per call.
#[derive(Debug, Clone)]
pub enum EncodeOutcome {
    Fit(EncodedJpeg),
    OutOfRange(SizeConstraintViolation),
}

impl EncodeOutcome {
    pub fn is_fit(&self) -> bool {
        matches!(self, EncodeOutcome::Fit(_))
    }

    pub fn attempts(&self) -> &[EncodeAttempt] {
        match self {
            EncodeOutcome::Fit(jpeg) => &jpeg.attempts,
            EncodeOutcome::OutOfRange(violation) => &violation.attempts,
        }
    }

    /// Quality of the final encode.
    pub fn quality(&self) -> f32 {
        match self {
            EncodeOutcome::Fit(jpeg) => jpeg.quality,
            EncodeOutcome::OutOfRange(violation) => violation.quality,
        }
    }

    /// Size of the final encode.
    pub fn size_bytes(&self) -> u64 {
        match self {
            EncodeOutcome::Fit(jpeg) => jpeg.size_bytes,
            EncodeOutcome::OutOfRange(violation) => violation.achieved_bytes,
        }
    }

    pub fn fit(self) -> Option<EncodedJpeg> {
        match self {
            EncodeOutcome::Fit(jpeg) => Some(jpeg),
            EncodeOutcome::OutOfRange(_) => None,
        }
    }

    pub fn violation(self) -> Option<SizeConstraintViolation> {
        match self {
            EncodeOutcome::Fit(_) => None,
            EncodeOutcome::OutOfRange(violation) => Some(violation),
        }
    }
}

/// Renders a source image onto the target canvas and searches for a JPEG
/// quality whose output fits the target byte window.
#[derive(Debug, Clone, Default)]
pub struct SizeConstrainedEncoder<B = ImageJpegBackend> {
    config: SearchConfig,
    backend: B,
}

impl SizeConstrainedEncoder<ImageJpegBackend> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            backend: ImageJpegBackend,
        }
    }
}

impl<B: JpegBackend> SizeConstrainedEncoder<B> {
    pub fn with_backend(config: SearchConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Encode `image` to satisfy `spec`.
    ///
    /// # Errors
    ///
    /// `InvalidSpec`/`InvalidConfig` are reported before any encoding work.
    /// A missed byte window is returned as [`EncodeOutcome::OutOfRange`],
    /// not as an error.
    pub fn encode(
        &self,
        image: &RasterImage,
        spec: &TargetSpec,
    ) -> Result<EncodeOutcome, EncodeError> {
        spec.validate()?;
        self.config.validate()?;

        let canvas = compose_canvas(
            image,
            spec.width_px,
            spec.height_px,
            spec.background,
            self.config.filter,
        )?;

        let config = &self.config;
        let min_bytes = spec.min_bytes_or_zero();
        let mut attempts = Vec::new();

        let mut quality = config.clamp(config.initial_quality);
        let mut bytes = self.encode_attempt(&canvas, quality, &mut attempts)?;
        let mut size = bytes.len() as u64;
        let mut tries_remaining = config.max_tries;

        while tries_remaining > 0 && !spec.accepts(size) {
            let next = if size > spec.max_bytes {
                config.clamp(quality - config.quality_step)
            } else {
                config.clamp(quality + config.quality_step)
            };

            if next == quality {
                log::debug!("quality pinned at {quality:.2}, size {size} cannot move");
                break;
            }

            let previous_size = size;
            quality = next;
            bytes = self.encode_attempt(&canvas, quality, &mut attempts)?;
            size = bytes.len() as u64;
            tries_remaining -= 1;

            if config.at_bound(quality) && size == previous_size {
                log::debug!("no progress at quality bound {quality:.2}, stopping");
                break;
            }
        }

        if spec.accepts(size) {
            log::info!(
                "encoded {}x{} at quality {quality:.2}: {size} bytes after {} attempts",
                spec.width_px,
                spec.height_px,
                attempts.len()
            );
            return Ok(EncodeOutcome::Fit(EncodedJpeg {
                bytes,
                size_bytes: size,
                quality,
                width: spec.width_px,
                height: spec.height_px,
                attempts,
            }));
        }

        let violation = SizeConstraintViolation {
            achieved_bytes: size,
            quality,
            constraint: *spec,
            attempts,
        };
        if tries_remaining == 0 {
            log::warn!("try budget exhausted: {violation}");
        } else {
            log::info!("stopped early: {violation} (min {min_bytes} bytes)");
        }
        Ok(EncodeOutcome::OutOfRange(violation))
    }

    fn encode_attempt(
        &self,
        canvas: &image::RgbImage,
        quality: f32,
        attempts: &mut Vec<EncodeAttempt>,
    ) -> Result<Vec<u8>, EncodeError> {
        let bytes = self.backend.encode(canvas, quality)?;
        let size_bytes = bytes.len() as u64;
        log::debug!("attempt {}: quality {quality:.2} -> {size_bytes} bytes", attempts.len() + 1);
        attempts.push(EncodeAttempt {
            quality,
            size_bytes,
        });
        Ok(bytes)
    }
}

/// Encode with the default backend.
pub fn encode_to_target(
    image: &RasterImage,
    spec: &TargetSpec,
    config: SearchConfig,
) -> Result<EncodeOutcome, EncodeError> {
    SizeConstrainedEncoder::new(config).encode(image, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::target::{Preset, Rgb};

    /// Backend whose output size is a function of quality, recording calls.
    struct ScriptedBackend<F: Fn(f32) -> usize> {
        size_for: F,
        calls: RefCell<Vec<f32>>,
    }

    impl<F: Fn(f32) -> usize> ScriptedBackend<F> {
        fn new(size_for: F) -> Self {
            Self {
                size_for,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<f32> {
            self.calls.borrow().clone()
        }
    }

    impl<F: Fn(f32) -> usize> JpegBackend for ScriptedBackend<F> {
        fn encode(&self, _canvas: &image::RgbImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
            self.calls.borrow_mut().push(quality);
            Ok(vec![0u8; (self.size_for)(quality)])
        }
    }

    /// Deterministic pseudo-random RGBA noise.
    fn noise(width: u32, height: u32, seed: u32) -> RasterImage {
        let mut state = seed.wrapping_mul(2_654_435_761).max(1);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let v = (state >> 24) as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        RasterImage::new(width, height, pixels)
    }

    fn photo_spec() -> TargetSpec {
        TargetSpec::from_preset(Preset::Photo, 100.0).unwrap()
    }

    #[test]
    fn test_first_encode_in_range_returns_immediately() {
        let backend = ScriptedBackend::new(|_| 30_000);
        let encoder = SizeConstrainedEncoder::with_backend(SearchConfig::default(), backend);

        let outcome = encoder
            .encode(&RasterImage::solid(20, 20, [1, 2, 3]), &photo_spec())
            .unwrap();

        assert!(outcome.is_fit());
        assert_eq!(encoder.backend().calls(), vec![0.9]);
        let jpeg = outcome.fit().unwrap();
        assert_eq!(jpeg.size_bytes, 30_000);
        assert_eq!((jpeg.width, jpeg.height), (138, 177));
    }

    #[test]
    fn test_steps_down_until_under_max() {
        // 90 000 bytes at 0.90, 5 000 fewer per step.
        let backend = ScriptedBackend::new(|q| (q * 100_000.0) as usize);
        let encoder = SizeConstrainedEncoder::with_backend(SearchConfig::default(), backend);
        let spec = TargetSpec::new(10, 10, 70_000);

        let outcome = encoder.encode(&RasterImage::solid(4, 4, [0, 0, 0]), &spec).unwrap();

        assert!(outcome.is_fit());
        assert_eq!(encoder.backend().calls(), vec![0.9, 0.85, 0.8, 0.75, 0.7]);
        assert!((outcome.quality() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_steps_up_until_over_min() {
        let backend = ScriptedBackend::new(|q| (q * 20_000.0) as usize);
        let encoder = SizeConstrainedEncoder::with_backend(SearchConfig::default(), backend);
        let spec = TargetSpec::new(10, 10, 50_000).with_min_bytes(18_500);

        let outcome = encoder.encode(&RasterImage::solid(4, 4, [0, 0, 0]), &spec).unwrap();

        assert!(outcome.is_fit());
        assert_eq!(encoder.backend().calls(), vec![0.9, 0.95]);
    }

    #[test]
    fn test_invalid_spec_does_no_encoding() {
        let backend = ScriptedBackend::new(|_| 1);
        let encoder = SizeConstrainedEncoder::with_backend(SearchConfig::default(), backend);

        let result =
            encoder.encode(&RasterImage::solid(4, 4, [0, 0, 0]), &TargetSpec::new(10, 10, 0));

        assert!(matches!(result, Err(EncodeError::InvalidSpec(_))));
        assert!(encoder.backend().calls().is_empty());
    }

    #[test]
    fn test_oversized_canvas_fails_before_encoding() {
        let backend = ScriptedBackend::new(|_| 1);
        let encoder = SizeConstrainedEncoder::with_backend(SearchConfig::default(), backend);
        let spec = TargetSpec::new(u32::MAX, u32::MAX, 1000);

        let result = encoder.encode(&RasterImage::solid(2, 2, [0, 0, 0]), &spec);

        assert!(matches!(result, Err(EncodeError::InvalidSpec(_))));
        assert!(encoder.backend().calls().is_empty());
    }

    #[test]
    fn test_negative_max_bytes_fails_before_encoding() {
        // The host hands over signed numbers; -1 never reaches the encoder.
        let spec = TargetSpec::try_new(138, 177, Some(20480), -1);
        assert!(matches!(spec, Err(EncodeError::InvalidSpec(_))));
    }

    #[test]
    fn test_invalid_config_does_no_encoding() {
        let config = SearchConfig {
            quality_step: 0.0,
            ..SearchConfig::default()
        };
        let backend = ScriptedBackend::new(|_| 1);
        let encoder = SizeConstrainedEncoder::with_backend(config, backend);

        let result = encoder.encode(&RasterImage::solid(4, 4, [0, 0, 0]), &photo_spec());

        assert!(matches!(result, Err(EncodeError::InvalidConfig(_))));
        assert!(encoder.backend().calls().is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(SearchConfig::default().validate().is_ok());

        let mut config = SearchConfig::default();
        config.quality_floor = 0.95;
        assert!(config.validate().is_err());

        let mut config = SearchConfig::default();
        config.quality_ceiling = 1.5;
        assert!(config.validate().is_err());

        let mut config = SearchConfig::default();
        config.quality_floor = 0.0;
        assert!(config.validate().is_err());

        let mut config = SearchConfig::default();
        config.quality_step = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fine_step_keeps_searching() {
        let config = SearchConfig {
            quality_step: 0.004,
            ..SearchConfig::default()
        };
        let backend = ScriptedBackend::new(|q| (q * 100_000.0) as usize);
        let encoder = SizeConstrainedEncoder::with_backend(config, backend);
        let spec = TargetSpec::new(10, 10, 89_000);

        let outcome = encoder.encode(&RasterImage::solid(4, 4, [0, 0, 0]), &spec).unwrap();

        assert!(outcome.is_fit());
        assert_eq!(encoder.backend().calls(), vec![0.9, 0.896, 0.892, 0.888]);
    }

    #[test]
    fn test_step_below_resolution_rejected() {
        let config = SearchConfig {
            quality_step: QUALITY_RESOLUTION / 2.0,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(EncodeError::InvalidConfig(_))));

        let config = SearchConfig {
            quality_step: QUALITY_RESOLUTION,
            ..SearchConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_budget_exhausted_reports_violation() {
        // Oscillates: above max at every odd step, below min at every even one.
        let backend = ScriptedBackend::new(|q| {
            if (q * 100.0).round() as u32 % 10 == 0 {
                60_000
            } else {
                10_000
            }
        });
        let config = SearchConfig {
            max_tries: 5,
            ..SearchConfig::default()
        };
        let encoder = SizeConstrainedEncoder::with_backend(config, backend);

        let outcome = encoder.encode(&RasterImage::solid(4, 4, [0, 0, 0]), &photo_spec()).unwrap();

        assert!(!outcome.is_fit());
        assert_eq!(encoder.backend().calls().len(), 6);
        let violation = outcome.violation().unwrap();
        assert_eq!(violation.attempts.len(), 6);
        assert_eq!(violation.constraint, photo_spec());
    }

    #[test]
    fn test_flat_image_stops_at_ceiling() {
        // Size never changes: climb 0.90 -> 0.95 -> 1.00, then give up.
        let backend = ScriptedBackend::new(|_| 1_000);
        let encoder = SizeConstrainedEncoder::with_backend(SearchConfig::default(), backend);

        let outcome = encoder.encode(&RasterImage::solid(4, 4, [9, 9, 9]), &photo_spec()).unwrap();

        assert_eq!(encoder.backend().calls(), vec![0.9, 0.95, 1.0]);
        let violation = outcome.violation().unwrap();
        assert_eq!(violation.achieved_bytes, 1_000);
        assert!((violation.quality - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pinned_at_floor_skips_reencode() {
        let config = SearchConfig {
            initial_quality: 0.1,
            ..SearchConfig::default()
        };
        let backend = ScriptedBackend::new(|_| 5_000);
        let encoder = SizeConstrainedEncoder::with_backend(config, backend);

        let outcome = encoder
            .encode(&RasterImage::solid(4, 4, [0, 0, 0]), &TargetSpec::new(8, 8, 1024))
            .unwrap();

        assert_eq!(encoder.backend().calls(), vec![0.1]);
        assert!(!outcome.is_fit());
    }

    #[test]
    fn test_quality_snapping_reaches_floor_exactly() {
        let backend = ScriptedBackend::new(|_| 5_000);
        let encoder = SizeConstrainedEncoder::with_backend(SearchConfig::default(), backend);

        let outcome = encoder
            .encode(&RasterImage::solid(4, 4, [0, 0, 0]), &TargetSpec::new(8, 8, 1024))
            .unwrap();

        let calls = encoder.backend().calls();
        assert_eq!(calls.len(), 17);
        assert_eq!(*calls.last().unwrap(), 0.1);
        assert!(!outcome.is_fit());
    }

    #[test]
    fn test_violation_message() {
        let violation = SizeConstraintViolation {
            achieved_bytes: 62 * 1024,
            quality: 0.1,
            constraint: photo_spec(),
            attempts: Vec::new(),
        };
        assert_eq!(violation.to_string(), "achieved 62 KB, need 20–50 KB");

        let signature = TargetSpec::from_preset(Preset::Signature, 100.0).unwrap();
        let violation = SizeConstraintViolation {
            achieved_bytes: 25 * 1024,
            quality: 0.1,
            constraint: signature,
            attempts: Vec::new(),
        };
        assert_eq!(violation.to_string(), "achieved 25 KB, need at most 20 KB");
    }

    // Real-encoder scenarios.

    #[test]
    fn test_photo_preset_from_large_source() {
        let source = noise(800, 1000, 7);
        let spec = photo_spec();
        let config = SearchConfig {
            filter: FilterType::Nearest,
            ..SearchConfig::default()
        };

        let jpeg = encode_to_target(&source, &spec, config).unwrap().fit().unwrap();

        assert!(jpeg.size_bytes >= 20480 && jpeg.size_bytes <= 51200);
        assert_eq!(jpeg.size_bytes, jpeg.bytes.len() as u64);
        let decoded = image::load_from_memory(&jpeg.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (138, 177));
    }

    #[test]
    fn test_noise_cannot_fit_one_kilobyte() {
        let source = noise(200, 200, 3);
        let spec = TargetSpec::new(200, 200, 1024);

        let outcome = encode_to_target(&source, &spec, SearchConfig::default()).unwrap();

        let violation = outcome.violation().unwrap();
        assert!(violation.achieved_bytes > 1024);
        assert!((violation.quality - 0.1).abs() < 1e-6);
        assert!(violation.attempts.len() <= 21);
    }

    #[test]
    fn test_flat_image_cannot_reach_minimum() {
        let source = RasterImage::solid(300, 400, [200, 180, 160]);
        let spec = photo_spec();

        let outcome = encode_to_target(&source, &spec, SearchConfig::default()).unwrap();

        let violation = outcome.violation().unwrap();
        assert!(violation.achieved_bytes < 20480);
        assert!((violation.quality - 1.0).abs() < 1e-6);
        // 0.90, 0.95, 1.00 and at most one repeat at the ceiling.
        assert!(violation.attempts.len() <= 4);
    }

    #[test]
    fn test_transparent_source_uses_background() {
        let source = RasterImage::new(2, 2, vec![0u8; 16]);
        let spec = TargetSpec::new(16, 16, 50_000).with_background(Rgb::new(0, 0, 255));

        let jpeg = encode_to_target(&source, &spec, SearchConfig::default())
            .unwrap()
            .fit()
            .unwrap();

        let decoded = image::load_from_memory(&jpeg.bytes).unwrap().into_rgb8();
        let px = decoded.get_pixel(8, 8).0;
        assert!(px[2] > 200 && px[0] < 40 && px[1] < 40, "got {px:?}");
    }

    #[test]
    fn test_repeat_encode_gives_same_verdict() {
        let source = noise(300, 300, 11);
        let spec = photo_spec();

        let a = encode_to_target(&source, &spec, SearchConfig::default()).unwrap();
        let b = encode_to_target(&source, &spec, SearchConfig::default()).unwrap();

        assert_eq!(a.is_fit(), b.is_fit());
        assert_eq!(a.size_bytes(), b.size_bytes());
        assert_eq!(a.attempts(), b.attempts());
    }
}
