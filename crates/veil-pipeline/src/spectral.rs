//! Frequency-domain perturbation of the luminance plane.
//!
//! Computes the 2-D FFT of the luminance channel, adds proportional
//! Gaussian noise to a fixed mid-frequency sub-band, inverts the
//! transform, and blends a small fraction of the perturbed candidate
//! back into the original plane. Origin fingerprints left by
//! generative and re-encoding pipelines concentrate in specific
//! frequency bands; a proportional perturbation there changes the
//! frequency signature while staying spatially imperceptible.
//!
//! The row pass transforms the row-major buffer directly; the column
//! pass gathers each column into a scratch buffer, transforms it, and
//! scatters it back, avoiding a full transposed copy.

use log::{debug, warn};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::color;

/// Inclusive lower edge of the perturbed frequency sub-band.
pub const BAND_LOW: usize = 20;

/// Exclusive upper edge of the perturbed frequency sub-band. Clipped
/// to the image's frequency-domain extent for smaller images.
pub const BAND_HIGH: usize = 100;

/// Fraction of the original plane kept in the output blend.
const BLEND_ORIGINAL: f32 = 0.98;

/// Base scale applied to the preset factor before sampling.
const NOISE_BASE_SCALE: f64 = 2e-4;

/// Extract the luminance plane from an interleaved RGB f32 buffer
/// using the standard weights (0.299 R + 0.587 G + 0.114 B).
#[must_use]
pub fn luminance_plane(samples: &[f32]) -> Vec<f32> {
    samples
        .chunks_exact(3)
        .map(|px| color::luma(px[0], px[1], px[2]))
        .collect()
}

/// Perturb a mid-frequency band of the luminance plane.
///
/// Each complex coefficient with both axes in
/// [`BAND_LOW`]..[`BAND_HIGH`] (clipped to the available extent)
/// receives real-axis Gaussian noise scaled by the coefficient's own
/// magnitude and by `factor` × 2e-4. The result is 98 % original plane
/// and 2 % perturbed-and-clamped candidate.
///
/// The stage passes the plane through unchanged when:
/// - `factor` is non-positive (stage disabled by preset),
/// - either image dimension is too small to contain the sub-band,
/// - the inverse transform produces non-finite samples (degenerate
///   input; recovered locally rather than propagating NaN).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn perturb_luminance<R: Rng + ?Sized>(
    luma: &[f32],
    width: usize,
    height: usize,
    factor: f64,
    rng: &mut R,
) -> Vec<f32> {
    debug_assert_eq!(luma.len(), width * height);

    if factor <= 0.0 {
        return luma.to_vec();
    }
    if width.min(height) <= BAND_LOW {
        debug!("image {width}x{height} smaller than frequency sub-band, skipping perturbation");
        return luma.to_vec();
    }
    let Ok(normal) = Normal::new(0.0, factor * NOISE_BASE_SCALE) else {
        return luma.to_vec();
    };

    let mut data: Vec<Complex<f64>> = luma
        .iter()
        .map(|&v| Complex::new(f64::from(v), 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    transform_2d(
        &mut data,
        width,
        height,
        &planner.plan_fft_forward(width),
        &planner.plan_fft_forward(height),
    );

    // Proportional noise on the real axis of every in-band coefficient.
    for y in BAND_LOW..BAND_HIGH.min(height) {
        for x in BAND_LOW..BAND_HIGH.min(width) {
            let idx = y * width + x;
            let magnitude = data[idx].norm();
            data[idx].re += normal.sample(rng) * magnitude;
        }
    }

    transform_2d(
        &mut data,
        width,
        height,
        &planner.plan_fft_inverse(width),
        &planner.plan_fft_inverse(height),
    );

    // rustfft leaves the inverse unnormalized.
    let scale = 1.0 / (width * height) as f64;
    let candidate: Vec<f64> = data.iter().map(|c| c.re * scale).collect();

    if !candidate.iter().all(|v| v.is_finite()) {
        warn!("frequency transform produced non-finite samples, passing luminance through");
        return luma.to_vec();
    }

    luma.iter()
        .zip(&candidate)
        .map(|(&orig, &new)| {
            BLEND_ORIGINAL.mul_add(orig, (1.0 - BLEND_ORIGINAL) * (new as f32).clamp(0.0, 255.0))
        })
        .collect()
}

/// Apply a 1-D transform along rows, then along columns.
///
/// `data` is row-major with `height` rows of `width` samples;
/// `row_fft`/`col_fft` must be planned for those lengths.
fn transform_2d(
    data: &mut [Complex<f64>],
    width: usize,
    height: usize,
    row_fft: &std::sync::Arc<dyn Fft<f64>>,
    col_fft: &std::sync::Arc<dyn Fft<f64>>,
) {
    // Row-major layout means the buffer is already `height` contiguous
    // rows of length `width`.
    row_fft.process(data);

    let mut column = vec![Complex::new(0.0, 0.0); height];
    for x in 0..width {
        for (y, slot) in column.iter_mut().enumerate() {
            *slot = data[y * width + x];
        }
        col_fft.process(&mut column);
        for (y, slot) in column.iter().enumerate() {
            data[y * width + x] = *slot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// A 128x128 broadband plane: a deterministic hash pattern spreads
    /// energy across all frequencies, so the mid band has coefficients
    /// worth perturbing.
    fn structured_plane() -> (Vec<f32>, usize, usize) {
        let (width, height) = (128, 128);
        let plane = (0..width * height)
            .map(|i: usize| (i.wrapping_mul(2_654_435_761) % 256) as f32)
            .collect();
        (plane, width, height)
    }

    #[test]
    fn luminance_plane_uses_standard_weights() {
        let samples = [255.0, 0.0, 0.0, 0.0, 255.0, 0.0, 0.0, 0.0, 255.0];
        let luma = luminance_plane(&samples);
        assert!((luma[0] - 0.299 * 255.0).abs() < 1e-3);
        assert!((luma[1] - 0.587 * 255.0).abs() < 1e-3);
        assert!((luma[2] - 0.114 * 255.0).abs() < 1e-3);
    }

    #[test]
    fn zero_factor_is_identity() {
        let (plane, w, h) = structured_plane();
        let mut rng = StdRng::seed_from_u64(1);
        let out = perturb_luminance(&plane, w, h, 0.0, &mut rng);
        assert_eq!(out, plane);
    }

    #[test]
    fn image_smaller_than_band_is_passed_through() {
        let plane = vec![100.0; 16 * 16];
        let mut rng = StdRng::seed_from_u64(1);
        let out = perturb_luminance(&plane, 16, 16, 0.2, &mut rng);
        assert_eq!(out, plane);
    }

    #[test]
    fn band_is_clipped_for_narrow_images() {
        // 32 columns: the sub-band clips to 20..32 horizontally but the
        // stage must still run without indexing out of range.
        let (width, height) = (32, 128);
        let plane: Vec<f32> = (0..width * height)
            .map(|i| ((i % 251) as f32) * 255.0 / 250.0)
            .collect();
        let mut rng = StdRng::seed_from_u64(5);
        let out = perturb_luminance(&plane, width, height, 0.2, &mut rng);
        assert_eq!(out.len(), plane.len());
        assert!(out.iter().all(|v| v.is_finite() && (0.0..=255.0).contains(v)));
    }

    #[test]
    fn output_stays_in_valid_range() {
        let (plane, w, h) = structured_plane();
        let mut rng = StdRng::seed_from_u64(2);
        let out = perturb_luminance(&plane, w, h, 0.2, &mut rng);
        assert!(out.iter().all(|v| (0.0..=255.0).contains(v)));
    }

    #[test]
    fn perturbation_is_small_but_nonzero() {
        let (plane, w, h) = structured_plane();
        let mut rng = StdRng::seed_from_u64(3);
        let out = perturb_luminance(&plane, w, h, 1.0, &mut rng);

        let max_delta = plane
            .iter()
            .zip(&out)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        // The 98/2 blend and the tiny noise base keep the spatial change
        // well under one 8-bit step even at an exaggerated factor.
        assert!(max_delta < 8.0, "perturbation too large: {max_delta}");
        assert!(max_delta > 0.0, "expected the stage to change something");
    }

    #[test]
    fn constant_plane_survives_without_nan() {
        // Degenerate all-constant input: every non-DC coefficient is
        // zero, so proportional noise perturbs nothing and the output
        // must come back finite and essentially unchanged.
        let plane = vec![128.0; 128 * 128];
        let mut rng = StdRng::seed_from_u64(4);
        let out = perturb_luminance(&plane, 128, 128, 0.2, &mut rng);
        assert!(out.iter().all(|v| v.is_finite()));
        assert!(out.iter().all(|&v| (v - 128.0).abs() < 0.5));
    }

    #[test]
    fn same_seed_reproduces_identical_output() {
        let (plane, w, h) = structured_plane();
        let a = perturb_luminance(&plane, w, h, 0.12, &mut StdRng::seed_from_u64(77));
        let b = perturb_luminance(&plane, w, h, 0.12, &mut StdRng::seed_from_u64(77));
        assert_eq!(a, b);
    }

    #[test]
    fn round_trip_without_noise_recovers_plane() {
        // Forward + inverse with the in-band noise disabled must be a
        // near-exact identity; this pins the 1/(w*h) normalization.
        let (plane, w, h) = structured_plane();
        let mut rng = StdRng::seed_from_u64(6);
        let out = perturb_luminance(&plane, w, h, f64::MIN_POSITIVE, &mut rng);
        for (a, b) in plane.iter().zip(&out) {
            assert!((a - b).abs() < 1e-2, "round trip drifted: {a} vs {b}");
        }
    }
}
