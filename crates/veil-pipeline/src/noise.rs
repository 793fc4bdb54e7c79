//! Additive Gaussian noise in linear RGB space.
//!
//! Draws one independent zero-mean sample per channel per pixel and
//! adds it to the floating-point working buffer, clamping back into
//! the valid 0-255 range. The expected perturbation magnitude scales
//! linearly with sigma.
//!
//! The random source is an explicit parameter rather than an internal
//! `thread_rng` so callers control reproducibility: tests and seeded
//! batch runs supply a deterministic generator, interactive runs
//! supply an entropy-seeded one.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Add zero-mean Gaussian noise with standard deviation `sigma` to
/// every sample, clamping the result to [0, 255].
///
/// A non-positive `sigma` leaves the buffer untouched.
#[allow(clippy::cast_possible_truncation)]
pub fn add_gaussian<R: Rng + ?Sized>(samples: &mut [f32], sigma: f64, rng: &mut R) {
    if sigma <= 0.0 {
        return;
    }
    let Ok(normal) = Normal::new(0.0, sigma) else {
        return;
    };

    for sample in samples {
        *sample = (*sample + normal.sample(rng) as f32).clamp(0.0, 255.0);
    }
}
