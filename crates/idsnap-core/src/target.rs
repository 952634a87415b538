//! Target output contracts: pixel dimensions, byte window and background.
//!
//! Upload forms state their requirements in physical units ("3.5 × 4.5 cm,
//! 20–50 KB"). A [`TargetSpec`] is the pixel/byte translation of such a
//! requirement; [`Preset`] covers the two forms the UI offers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::encode::EncodeError;

/// Inches per centimetre.
pub const INCHES_PER_CM: f64 = 0.393701;

/// Bytes per kilobyte as upload forms count them.
pub const BYTES_PER_KB: u64 = 1024;

/// Longest edge a baseline JPEG can encode.
pub const MAX_EDGE_PX: u32 = 65_535;

/// Canvas area cap; the RGBA and RGB buffers both have to fit in wasm32 memory.
pub const MAX_PIXELS: u64 = 40_000_000;

/// Convert a physical length to pixels at the given DPI.
///
/// Rounds to the nearest pixel; 3.5 cm at 100 DPI is 138 px.
pub fn cm_to_px(cm: f64, dpi: f64) -> u32 {
    (cm * dpi * INCHES_PER_CM).round().max(0.0) as u32
}

/// Solid background color used to flatten transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// The upload forms the UI knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Passport-style photo: 3.5 × 4.5 cm, 20–50 KB.
    Photo,
    /// Signature strip: 3.5 × 1.5 cm, up to 20 KB.
    Signature,
}

impl Preset {
    /// Physical size as (width, height) in centimetres.
    pub fn size_cm(self) -> (f64, f64) {
        match self {
            Preset::Photo => (3.5, 4.5),
            Preset::Signature => (3.5, 1.5),
        }
    }

    /// Accepted byte window as (min, max).
    pub fn byte_window(self) -> (Option<u64>, u64) {
        match self {
            Preset::Photo => (Some(20 * BYTES_PER_KB), 50 * BYTES_PER_KB),
            Preset::Signature => (None, 20 * BYTES_PER_KB),
        }
    }

    /// Conventional download file name for the encoded result.
    pub fn file_name(self) -> &'static str {
        match self {
            Preset::Photo => "photo.jpg",
            Preset::Signature => "signature.jpg",
        }
    }

    /// Width divided by height, for the fixed-aspect crop step.
    pub fn aspect_ratio(self) -> f64 {
        let (w, h) = self.size_cm();
        w / h
    }
}

impl FromStr for Preset {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "photo" => Ok(Preset::Photo),
            "signature" => Ok(Preset::Signature),
            other => Err(EncodeError::InvalidSpec(format!("unknown preset '{other}'"))),
        }
    }
}

/// The size/dimension contract one encode call must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Output width in pixels.
    pub width_px: u32,
    /// Output height in pixels.
    pub height_px: u32,
    /// Lower bound on the encoded size; `None` means no lower bound.
    #[serde(default)]
    pub min_bytes: Option<u64>,
    /// Upper bound on the encoded size.
    pub max_bytes: u64,
    /// Fill color behind transparent source pixels.
    #[serde(default)]
    pub background: Rgb,
}

impl TargetSpec {
    /// Spec with no lower size bound and a white background.
    pub fn new(width_px: u32, height_px: u32, max_bytes: u64) -> Self {
        Self {
            width_px,
            height_px,
            min_bytes: None,
            max_bytes,
            background: Rgb::WHITE,
        }
    }

    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = Some(min_bytes);
        self
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    /// Build a spec from signed host-side integers.
    ///
    /// JavaScript numbers may be zero or negative; anything that cannot be
    /// a valid spec is rejected here as `InvalidSpec`.
    pub fn try_new(
        width_px: i64,
        height_px: i64,
        min_bytes: Option<i64>,
        max_bytes: i64,
    ) -> Result<Self, EncodeError> {
        let width = positive_u32("width", width_px)?;
        let height = positive_u32("height", height_px)?;
        if max_bytes <= 0 {
            return Err(EncodeError::InvalidSpec(format!(
                "max_bytes must be positive, got {max_bytes}"
            )));
        }
        let min = match min_bytes {
            Some(m) if m < 0 => {
                return Err(EncodeError::InvalidSpec(format!(
                    "min_bytes must not be negative, got {m}"
                )))
            }
            Some(m) => Some(m as u64),
            None => None,
        };

        let spec = Self {
            width_px: width,
            height_px: height,
            min_bytes: min,
            max_bytes: max_bytes as u64,
            background: Rgb::WHITE,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Translate a preset to pixels at `dpi`.
    pub fn from_preset(preset: Preset, dpi: f64) -> Result<Self, EncodeError> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(EncodeError::InvalidSpec(format!(
                "dpi must be a positive number, got {dpi}"
            )));
        }
        let (w_cm, h_cm) = preset.size_cm();
        let (min_bytes, max_bytes) = preset.byte_window();

        let spec = Self {
            width_px: cm_to_px(w_cm, dpi),
            height_px: cm_to_px(h_cm, dpi),
            min_bytes,
            max_bytes,
            background: Rgb::WHITE,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the target before any work is done.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.width_px == 0 || self.height_px == 0 {
            return Err(EncodeError::InvalidSpec(format!(
                "dimensions must be non-zero, got {}x{}",
                self.width_px, self.height_px
            )));
        }
        if self.width_px > MAX_EDGE_PX || self.height_px > MAX_EDGE_PX {
            return Err(EncodeError::InvalidSpec(format!(
                "dimensions {}x{} exceed the JPEG limit of {MAX_EDGE_PX} px per edge",
                self.width_px, self.height_px
            )));
        }
        let pixels = u64::from(self.width_px) * u64::from(self.height_px);
        if pixels > MAX_PIXELS {
            return Err(EncodeError::InvalidSpec(format!(
                "{}x{} is {pixels} pixels, limit is {MAX_PIXELS}",
                self.width_px, self.height_px
            )));
        }
        if self.max_bytes == 0 {
            return Err(EncodeError::InvalidSpec("max_bytes must be positive".to_string()));
        }
        if let Some(min) = self.min_bytes {
            if min > self.max_bytes {
                return Err(EncodeError::InvalidSpec(format!(
                    "min_bytes ({min}) exceeds max_bytes ({})",
                    self.max_bytes
                )));
            }
        }
        Ok(())
    }

    /// Lower bound with an absent bound treated as zero.
    pub fn min_bytes_or_zero(&self) -> u64 {
        self.min_bytes.unwrap_or(0)
    }

    /// Whether an encoded size satisfies the byte window.
    pub fn accepts(&self, size_bytes: u64) -> bool {
        size_bytes >= self.min_bytes_or_zero() && size_bytes <= self.max_bytes
    }

    /// Human-readable byte window, e.g. `20–50 KB` or `at most 20 KB`.
    pub fn window_label(&self) -> String {
        match self.min_bytes {
            Some(min) if min > 0 => {
                format!("{}–{}", format_kb_value(min), format_kb(self.max_bytes))
            }
            _ => format!("at most {}", format_kb(self.max_bytes)),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} px, {}",
            self.width_px,
            self.height_px,
            self.window_label()
        )
    }
}

/// Format a byte count as kilobytes, with one decimal unless exact.
///
/// A size that is not a whole number of KB never prints as one: 51250 bytes
/// is "50.1 KB", not "50.0 KB", so a miss next to a bound still reads as a miss.
pub fn format_kb(bytes: u64) -> String {
    format!("{} KB", format_kb_value(bytes))
}

fn format_kb_value(bytes: u64) -> String {
    if bytes % BYTES_PER_KB == 0 {
        return format!("{}", bytes / BYTES_PER_KB);
    }

    let whole = bytes / BYTES_PER_KB;
    let mut tenths = (bytes as f64 * 10.0 / BYTES_PER_KB as f64).round() as u64;
    if tenths % 10 == 0 {
        tenths = if tenths / 10 > whole { tenths - 1 } else { tenths + 1 };
    }
    format!("{}.{}", tenths / 10, tenths % 10)
}

fn positive_u32(name: &str, value: i64) -> Result<u32, EncodeError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| EncodeError::InvalidSpec(format!("{name} must be positive, got {value}")))
}
