//! Ordered cosmetic post-filters applied after reconstruction.
//!
//! The chain runs strictly as desaturate -> brighten -> blur ->
//! sharpen; each step consumes the previous step's output, and the
//! order matters (sharpening is intended to restore detail the blur
//! step attenuated). A step whose magnitude parameter is exactly zero
//! is skipped; no other condition disables a step.
//!
//! The blur wraps [`imageproc::filter::gaussian_blur_f32`], which only
//! accepts single-channel images, so color images are split into
//! channels, blurred independently, and reassembled. Gaussian blur is
//! linear and per-channel, so this is equivalent to blurring in color
//! space.

use image::GrayImage;

use crate::color;
use crate::preset::PresetParams;
use crate::types::RgbImage;

/// Fixed unsharp-mask radius (Gaussian sigma, pixels).
pub const SHARPEN_RADIUS: f32 = 0.5;

/// Run the full post-filter chain with preset parameters.
#[must_use]
pub fn apply(image: RgbImage, params: &PresetParams) -> RgbImage {
    let mut image = image;
    if params.desaturate_fraction != 0.0 {
        desaturate(&mut image, params.desaturate_fraction);
    }
    if params.brightness_fraction != 0.0 {
        brighten(&mut image, params.brightness_fraction);
    }
    if params.blur_radius > 0.0 {
        image = gaussian_blur(&image, params.blur_radius);
    }
    if params.sharpen_percent > 0.0 {
        image = unsharp_mask(
            &image,
            params.sharpen_percent,
            SHARPEN_RADIUS,
            params.sharpen_threshold,
        );
    }
    image
}

/// Multiply each pixel's chroma by `1 - fraction` in place by blending
/// every channel toward the pixel's luminance.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn desaturate(image: &mut RgbImage, fraction: f32) {
    let keep = 1.0 - fraction;
    for pixel in image.pixels_mut() {
        let [r, g, b] = pixel.0.map(f32::from);
        let l = color::luma(r, g, b);
        pixel.0 = [r, g, b].map(|c| (c - l).mul_add(keep, l).round().clamp(0.0, 255.0) as u8);
    }
}

/// Multiply luminance by `1 + fraction` in place, scaling every
/// channel uniformly and clamping to the valid range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn brighten(image: &mut RgbImage, fraction: f32) {
    let gain = 1.0 + fraction;
    for pixel in image.pixels_mut() {
        pixel.0 = pixel
            .0
            .map(|c| (f32::from(c) * gain).round().clamp(0.0, 255.0) as u8);
    }
}

/// Isotropic Gaussian blur of a color image, channel by channel.
///
/// Non-positive sigma values return the image unchanged, since the
/// underlying `imageproc` function panics on `sigma <= 0.0`.
#[must_use]
pub fn gaussian_blur(image: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 {
        return image.clone();
    }

    let (w, h) = (image.width(), image.height());

    let channels: [GrayImage; 3] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });
    let blurred: [GrayImage; 3] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], sigma));

    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
        ])
    })
}

/// Unsharp-mask sharpening: amplify the difference between the image
/// and a Gaussian-blurred copy by `percent`/100, wherever that
/// difference exceeds `threshold` brightness steps.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn unsharp_mask(image: &RgbImage, percent: f32, radius: f32, threshold: i16) -> RgbImage {
    let blurred = gaussian_blur(image, radius);
    let strength = percent / 100.0;

    let mut output = image.clone();
    for (pixel, soft) in output.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let diff = i16::from(pixel.0[c]) - i16::from(soft.0[c]);
            if diff.abs() >= threshold {
                let sharpened = f32::from(diff).mul_add(strength, f32::from(pixel.0[c]));
                pixel.0[c] = sharpened.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Preset;

    /// Left half dark red, right half bright cyan: both chroma and a
    /// sharp luminance edge to exercise every step.
    fn two_tone_image() -> RgbImage {
        RgbImage::from_fn(16, 16, |x, _y| {
            if x < 8 {
                image::Rgb([120, 30, 30])
            } else {
                image::Rgb([60, 200, 220])
            }
        })
    }

    #[test]
    fn chain_is_deterministic() {
        let params = *Preset::Strong.params();
        let a = apply(two_tone_image(), &params);
        let b = apply(two_tone_image(), &params);
        assert_eq!(a, b);
    }

    #[test]
    fn all_zero_parameters_are_identity() {
        let params = PresetParams {
            noise_sigma: 0.0,
            spectral_factor: 0.0,
            desaturate_fraction: 0.0,
            brightness_fraction: 0.0,
            blur_radius: 0.0,
            sharpen_percent: 0.0,
            sharpen_threshold: 3,
        };
        let img = two_tone_image();
        assert_eq!(apply(img.clone(), &params), img);
    }

    #[test]
    fn desaturate_full_fraction_yields_gray() {
        let mut img = two_tone_image();
        desaturate(&mut img, 1.0);
        for pixel in img.pixels() {
            let [r, g, b] = pixel.0;
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "not gray: {:?}", pixel.0);
        }
    }

    #[test]
    fn desaturate_preserves_luminance() {
        let mut img = two_tone_image();
        desaturate(&mut img, 0.5);
        for (before, after) in two_tone_image().pixels().zip(img.pixels()) {
            let [r0, g0, b0] = before.0.map(f32::from);
            let [r1, g1, b1] = after.0.map(f32::from);
            let delta = (color::luma(r0, g0, b0) - color::luma(r1, g1, b1)).abs();
            assert!(delta <= 1.5, "luminance drifted by {delta}");
        }
    }

    #[test]
    fn brighten_scales_channels() {
        let mut img = RgbImage::from_pixel(2, 2, image::Rgb([100, 50, 200]));
        brighten(&mut img, 0.1);
        assert_eq!(img.get_pixel(0, 0).0, [110, 55, 220]);
    }

    #[test]
    fn brighten_clamps_at_white() {
        let mut img = RgbImage::from_pixel(2, 2, image::Rgb([250, 250, 250]));
        brighten(&mut img, 0.5);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn blur_zero_sigma_returns_identical_image() {
        let img = two_tone_image();
        assert_eq!(gaussian_blur(&img, 0.0), img);
    }

    #[test]
    fn blur_softens_sharp_edge() {
        let img = two_tone_image();
        let blurred = gaussian_blur(&img, 2.0);
        // Green channel jumps 30 -> 200 at x=8; after blurring, the
        // boundary pixels should hold intermediate values.
        let left = blurred.get_pixel(7, 8).0[1];
        let right = blurred.get_pixel(8, 8).0[1];
        assert!(left > 30, "expected blur to raise left-of-edge, got {left}");
        assert!(right < 200, "expected blur to lower right-of-edge, got {right}");
    }

    #[test]
    fn sharpen_increases_edge_contrast() {
        let blurred = gaussian_blur(&two_tone_image(), 1.0);
        let sharpened = unsharp_mask(&blurred, 80.0, SHARPEN_RADIUS, 0);

        let contrast = |img: &RgbImage| {
            i16::from(img.get_pixel(8, 8).0[1]) - i16::from(img.get_pixel(7, 8).0[1])
        };
        assert!(
            contrast(&sharpened) > contrast(&blurred),
            "expected sharpening to widen the edge: {} vs {}",
            contrast(&sharpened),
            contrast(&blurred),
        );
    }

    #[test]
    fn sharpen_respects_threshold_on_flat_regions() {
        // A uniform image has zero difference everywhere; any nonzero
        // threshold must leave it untouched.
        let img = RgbImage::from_pixel(8, 8, image::Rgb([77, 150, 33]));
        let sharpened = unsharp_mask(&img, 100.0, SHARPEN_RADIUS, 3);
        assert_eq!(sharpened, img);
    }

    #[test]
    fn full_chain_output_stays_in_range() {
        // u8 storage cannot overflow, but the chain must also not wrap
        // via a bad intermediate cast; saturated input is the stress case.
        let img = RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 0, 255])
            } else {
                image::Rgb([0, 255, 0])
            }
        });
        let params = *Preset::Strong.params();
        let out = apply(img, &params);
        assert_eq!(out.width(), 16);
        assert_eq!(out.height(), 16);
    }
}
