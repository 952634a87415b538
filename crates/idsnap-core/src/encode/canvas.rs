//! Output canvas composition.
//!
//! The canvas is always exactly the target size. The source is stretched to
//! cover it completely (no letterboxing) and any transparency is flattened
//! over the background color, since JPEG has no alpha channel.

use image::{imageops, DynamicImage, RgbImage};

use crate::decode::{DecodeError, FilterType, RasterImage};
use crate::target::Rgb;

/// Fill a `width × height` canvas with `background` and draw `image`
/// stretched over it.
pub fn compose_canvas(
    image: &RasterImage,
    width: u32,
    height: u32,
    background: Rgb,
    filter: FilterType,
) -> Result<RgbImage, DecodeError> {
    if image.is_empty() {
        return Err(DecodeError::CorruptedFile(format!(
            "source image is empty ({}x{})",
            image.width, image.height
        )));
    }

    let source = image.to_rgba_image().ok_or_else(|| DecodeError::InvalidPixelData {
        expected: (image.width as usize) * (image.height as usize) * 4,
        actual: image.pixels.len(),
    })?;

    let scaled = if source.dimensions() == (width, height) {
        source
    } else {
        imageops::resize(&source, width, height, filter.to_image_filter())
    };

    if !image.has_transparency() {
        return Ok(DynamicImage::ImageRgba8(scaled).into_rgb8());
    }

    let mut canvas = RgbImage::from_pixel(width, height, image::Rgb(background.to_array()));
    for (dst, src) in canvas.pixels_mut().zip(scaled.pixels()) {
        let [r, g, b, a] = src.0;
        dst.0 = match a {
            255 => [r, g, b],
            0 => dst.0,
            _ => {
                let bg = dst.0;
                [blend(r, bg[0], a), blend(g, bg[1], a), blend(b, bg[2], a)]
            }
        };
    }

    Ok(canvas)
}

/// Source-over blend of one channel.
fn blend(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255) as u8
}
