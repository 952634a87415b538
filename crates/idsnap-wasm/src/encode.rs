//! Encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_jpeg`] - Encode an image at one fixed quality
//! - [`encode_to_target`] - Quality search into a target byte window
//! - [`target_for_preset`] / [`make_target_spec`] - Build target specs
//! - [`file_name_for_preset`] - Conventional download name
//!
//! # Example
//!
//! ```typescript
//! import { encode_to_target, target_for_preset, file_name_for_preset } from '@idsnap/wasm';
//!
//! const spec = target_for_preset('photo', 100);
//! const outcome = encode_to_target(cropped, spec, { max_tries: 10 });
//! if (outcome.ok) {
//!   download(new Blob([outcome.bytes], { type: 'image/jpeg' }), file_name_for_preset('photo'));
//! } else {
//!   showError(outcome.message); // "achieved 62 KB, need 20–50 KB"
//! }
//! ```

use crate::types::JsRasterImage;
use idsnap_core::encode::{self, EncodeOutcome, SearchConfig, SizeConstrainedEncoder};
use idsnap_core::target::{Preset, Rgb, TargetSpec};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// Helper struct for deserializing host target specs via serde.
///
/// Fields are signed so that negative numbers from JS surface as an
/// invalid-spec error rather than a type mismatch.
#[derive(Deserialize)]
struct TargetSpecJs {
    width_px: i64,
    height_px: i64,
    #[serde(default)]
    min_bytes: Option<i64>,
    max_bytes: i64,
    #[serde(default)]
    background: Option<Rgb>,
}

impl TargetSpecJs {
    fn into_spec(self) -> Result<TargetSpec, String> {
        let spec =
            TargetSpec::try_new(self.width_px, self.height_px, self.min_bytes, self.max_bytes)
                .map_err(|e| e.to_string())?;
        Ok(spec.with_background(self.background.unwrap_or_default()))
    }
}

/// Result of [`encode_to_target`].
///
/// `ok` tells which half is meaningful: on success `bytes` holds the JPEG,
/// on failure `message` holds a diagnostic to show verbatim.
#[wasm_bindgen]
pub struct JsEncodeOutcome {
    ok: bool,
    bytes: Vec<u8>,
    size_bytes: f64,
    quality: f32,
    attempts: u32,
    width: u32,
    height: u32,
    message: String,
}

#[wasm_bindgen]
impl JsEncodeOutcome {
    #[wasm_bindgen(getter)]
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// JPEG bytes on success, empty otherwise.
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Size of the final encode in bytes.
    #[wasm_bindgen(getter)]
    pub fn size_bytes(&self) -> f64 {
        self.size_bytes
    }

    /// Quality of the final encode (0.0 to 1.0).
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Number of encodes the search performed.
    #[wasm_bindgen(getter)]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Diagnostic for a missed byte window, empty on success.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl JsEncodeOutcome {
    fn from_outcome(outcome: EncodeOutcome) -> Self {
        let attempts = outcome.attempts().len() as u32;
        match outcome {
            EncodeOutcome::Fit(jpeg) => Self {
                ok: true,
                size_bytes: jpeg.size_bytes as f64,
                quality: jpeg.quality,
                attempts,
                width: jpeg.width,
                height: jpeg.height,
                message: String::new(),
                bytes: jpeg.bytes,
            },
            EncodeOutcome::OutOfRange(violation) => Self {
                ok: false,
                bytes: Vec::new(),
                size_bytes: violation.achieved_bytes as f64,
                quality: violation.quality,
                attempts,
                width: violation.constraint.width_px,
                height: violation.constraint.height_px,
                message: violation.to_string(),
            },
        }
    }
}

/// Encode an image at a fixed quality (0.0 to 1.0).
///
/// Transparent pixels are flattened over white.
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsRasterImage, quality: f32) -> Result<Vec<u8>, JsValue> {
    encode_fixed(image, quality).map_err(|e| JsValue::from_str(&e))
}

/// Encode an image to satisfy a target spec.
///
/// * `spec` - `{ width_px, height_px, min_bytes?, max_bytes, background? }`
/// * `config` - optional partial search config; `undefined` uses defaults
///
/// # Errors
///
/// Invalid specs/configs and unreadable images are errors. Missing the byte
/// window is not: it returns an outcome with `ok == false`.
#[wasm_bindgen]
pub fn encode_to_target(
    image: &JsRasterImage,
    spec: JsValue,
    config: JsValue,
) -> Result<JsEncodeOutcome, JsValue> {
    let spec: TargetSpecJs = serde_wasm_bindgen::from_value(spec)
        .map_err(|e| JsValue::from_str(&format!("Invalid target spec: {}", e)))?;
    let config = if config.is_undefined() || config.is_null() {
        SearchConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid search config: {}", e)))?
    };

    let spec = spec.into_spec().map_err(|e| JsValue::from_str(&e))?;
    encode_with(image, &spec, config).map_err(|e| JsValue::from_str(&e))
}

/// Target spec for a named preset (`"photo"` or `"signature"`) at `dpi`.
#[wasm_bindgen]
pub fn target_for_preset(name: &str, dpi: f64) -> Result<JsValue, JsValue> {
    let spec = preset_spec(name, dpi).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&spec).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Build a target spec from raw numbers, validating them.
///
/// Pass `undefined` for `min_bytes` when there is no lower bound.
#[wasm_bindgen]
pub fn make_target_spec(
    width_px: f64,
    height_px: f64,
    min_bytes: Option<f64>,
    max_bytes: f64,
) -> Result<JsValue, JsValue> {
    let spec = spec_from_numbers(width_px, height_px, min_bytes, max_bytes)
        .map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&spec).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Download file name for a named preset.
#[wasm_bindgen]
pub fn file_name_for_preset(name: &str) -> Result<String, JsValue> {
    name.parse::<Preset>()
        .map(|preset| preset.file_name().to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn preset_spec(name: &str, dpi: f64) -> Result<TargetSpec, String> {
    let preset: Preset = name.parse().map_err(|e: encode::EncodeError| e.to_string())?;
    TargetSpec::from_preset(preset, dpi).map_err(|e| e.to_string())
}

/// JS numbers are doubles; only whole numbers are meaningful here.
fn spec_from_numbers(
    width_px: f64,
    height_px: f64,
    min_bytes: Option<f64>,
    max_bytes: f64,
) -> Result<TargetSpec, String> {
    let whole = |name: &str, v: f64| {
        if v.is_finite() && v.fract() == 0.0 {
            Ok(v as i64)
        } else {
            Err(format!("Invalid target spec: {name} must be a whole number, got {v}"))
        }
    };

    let min = min_bytes.map(|m| whole("min_bytes", m)).transpose()?;
    TargetSpec::try_new(
        whole("width_px", width_px)?,
        whole("height_px", height_px)?,
        min,
        whole("max_bytes", max_bytes)?,
    )
    .map_err(|e| e.to_string())
}

fn encode_fixed(image: &JsRasterImage, quality: f32) -> Result<Vec<u8>, String> {
    let raster = image.to_raster()?;
    let canvas = encode::compose_canvas(
        &raster,
        raster.width,
        raster.height,
        Rgb::WHITE,
        Default::default(),
    )
    .map_err(|e| e.to_string())?;

    encode::encode_jpeg(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        encode::quality_to_percent(quality),
    )
    .map_err(|e| e.to_string())
}

fn encode_with(
    image: &JsRasterImage,
    spec: &TargetSpec,
    config: SearchConfig,
) -> Result<JsEncodeOutcome, String> {
    let raster = image.to_raster()?;
    let outcome = SizeConstrainedEncoder::new(config)
        .encode(&raster, spec)
        .map_err(|e| e.to_string())?;

    if let EncodeOutcome::OutOfRange(violation) = &outcome {
        log::warn!("{} ({})", violation, violation.constraint);
    }
    Ok(JsEncodeOutcome::from_outcome(outcome))
}
