//! Hue/saturation-preserving luminance reconstruction.
//!
//! The pipeline perturbs only the achromatic luminance of an image.
//! To keep the visible color cast untouched, the perturbed plane is
//! re-embedded as the value channel of a hue/saturation/value
//! representation of the *original* image: hue and saturation come
//! straight from the unmodified pixels, so they are preserved exactly
//! regardless of how strongly luminance was perturbed.

use crate::types::RgbImage;

/// Standard luminance weighted sum of linear RGB.
pub(crate) fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.114f32.mul_add(b, 0.299f32.mul_add(r, 0.587 * g))
}

/// Convert an 8-bit RGB triple to (hue °, saturation, value) with
/// hue in [0, 360) and saturation/value in [0, 1].
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let rf = f32::from(r) / 255.0;
    let gf = f32::from(g) / 255.0;
    let bf = f32::from(b) / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta).rem_euclid(6.0))
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    (hue, saturation, max)
}

/// Convert (hue °, saturation, value) back to an 8-bit RGB triple.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (u8, u8, u8) {
    let chroma = value * saturation;
    let sector = (hue / 60.0).rem_euclid(6.0);
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = value - chroma;

    let (rf, gf, bf) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let to_byte = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(rf), to_byte(gf), to_byte(bf))
}

/// Rebuild an image from the original's hue and saturation and a
/// replacement value plane.
///
/// `value` holds one 8-bit sample per pixel in row-major order and
/// must match the image's pixel count.
#[must_use]
pub fn replace_value(original: &RgbImage, value: &[u8]) -> RgbImage {
    debug_assert_eq!(
        value.len(),
        (original.width() * original.height()) as usize,
    );

    let width = original.width() as usize;
    RgbImage::from_fn(original.width(), original.height(), |x, y| {
        let image::Rgb([r, g, b]) = *original.get_pixel(x, y);
        let (hue, saturation, _) = rgb_to_hsv(r, g, b);
        let v = f32::from(value[y as usize * width + x as usize]) / 255.0;
        let (nr, ng, nb) = hsv_to_rgb(hue, saturation, v);
        image::Rgb([nr, ng, nb])
    })
}
