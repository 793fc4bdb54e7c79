//! veil-pipeline: Pure image perturbation pipeline (sans-IO).
//!
//! Disrupts statistical origin fingerprints in raster images through:
//! additive Gaussian noise -> frequency-domain perturbation of a
//! mid-band of the luminance spectrum -> hue/saturation-preserving
//! reconstruction -> cosmetic post-filters -> fidelity measurement.
//!
//! All transforms are context-free and applied uniformly across the
//! frame; nothing here is content-aware, and the fidelity score is
//! never fed back into a stage. This crate has **no I/O
//! dependencies** -- it operates on in-memory byte slices and pixel
//! buffers and returns structured data. File discovery, the worker
//! pool, and PNG writing live in `veil-batch`.

pub mod color;
pub mod fidelity;
pub mod noise;
pub mod postfilter;
pub mod preset;
pub mod spectral;
pub mod types;

use rand::Rng;

pub use preset::{Preset, PresetParams};
pub use types::{PipelineError, ProcessOutcome, RgbImage};

/// Run the full perturbation pipeline on encoded image bytes.
///
/// Decodes the input (PNG, JPEG, BMP, TIFF), runs
/// [`process_image`], and returns the perturbed buffer together with
/// its fidelity score. The caller supplies the random source; seed it
/// for reproducible output, or use an entropy-seeded generator for
/// the default unseeded behavior.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::UnreadableInput`] if the bytes cannot be
/// decoded.
pub fn process<R: Rng + ?Sized>(
    image_bytes: &[u8],
    params: &PresetParams,
    rng: &mut R,
) -> Result<ProcessOutcome, PipelineError> {
    if image_bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let original = image::load_from_memory(image_bytes)?.to_rgb8();
    Ok(process_image(&original, params, rng))
}

/// Run the full perturbation pipeline on a decoded pixel buffer.
///
/// # Pipeline steps
///
/// 1. Additive per-channel Gaussian noise on a floating-point copy
/// 2. Frequency-domain perturbation of the luminance plane
/// 3. Hue/saturation-preserving reconstruction (value channel only)
/// 4. Post-filters: desaturate -> brighten -> blur -> sharpen
/// 5. PSNR measurement against the unmodified input
///
/// Infallible: the only numerically fragile stage (the frequency
/// transform) recovers locally by passing luminance through unchanged.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn process_image<R: Rng + ?Sized>(
    original: &RgbImage,
    params: &PresetParams,
    rng: &mut R,
) -> ProcessOutcome {
    let width = original.width() as usize;
    let height = original.height() as usize;

    // 1. Per-channel Gaussian noise on a linear f32 working buffer.
    let mut samples: Vec<f32> = original.as_raw().iter().map(|&v| f32::from(v)).collect();
    noise::add_gaussian(&mut samples, params.noise_sigma, rng);

    // 2. Luminance of the noised buffer, perturbed in the frequency domain.
    let luma = spectral::luminance_plane(&samples);
    let perturbed = spectral::perturb_luminance(&luma, width, height, params.spectral_factor, rng);

    // 3. Re-embed as the value channel; hue and saturation stay
    //    bit-identical to the original.
    let value: Vec<u8> = perturbed
        .iter()
        .map(|&v| v.clamp(0.0, 255.0).round() as u8)
        .collect();
    let reconstructed = color::replace_value(original, &value);

    // 4. Cosmetic post-filter chain.
    let filtered = postfilter::apply(reconstructed, params);

    // 5. Fidelity score for reporting.
    let psnr_db = fidelity::psnr(original, &filtered);

    ProcessOutcome {
        image: filtered,
        psnr_db,
    }
}
