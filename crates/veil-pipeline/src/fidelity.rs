//! Peak signal-to-noise ratio between two pixel buffers.
//!
//! Reporting-only: the pipeline never adapts its behavior to the
//! score.

use crate::types::RgbImage;

/// Compute PSNR between two same-sized images, in dB.
///
/// `20 * log10(255 / sqrt(MSE))` over all samples as f64, or
/// `f64::INFINITY` when the buffers are bit-identical. Higher means
/// more similar.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn psnr(original: &RgbImage, processed: &RgbImage) -> f64 {
    debug_assert_eq!(original.dimensions(), processed.dimensions());

    let sum_sq: f64 = original
        .as_raw()
        .iter()
        .zip(processed.as_raw())
        .map(|(&a, &b)| {
            let diff = f64::from(a) - f64::from(b);
            diff * diff
        })
        .sum();
    let mse = sum_sq / original.as_raw().len() as f64;

    if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (255.0 / mse.sqrt()).log10()
    }
}
