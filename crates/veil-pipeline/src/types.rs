//! Shared types for the veil perturbation pipeline.

/// Re-export `RgbImage` so downstream crates can reference pixel
/// buffers without depending on `image` directly.
pub use image::RgbImage;

/// Result of running the full perturbation pipeline on one image.
///
/// Contains the final pixel buffer and the fidelity score measured
/// between it and the unmodified input. The score is reporting-only:
/// no stage adapts its behavior based on it.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// The perturbed image, clamped to 8-bit per sample.
    pub image: RgbImage,

    /// Peak signal-to-noise ratio between input and output, in dB.
    /// `f64::INFINITY` when the output is bit-identical to the input.
    pub psnr_db: f64,
}

/// Errors that can occur during pipeline processing.
///
/// Numeric instability in the frequency stage is *not* represented
/// here: it is recovered locally by passing the luminance plane
/// through unchanged (see [`crate::spectral::perturb_luminance`]).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    UnreadableInput(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A preset name outside {light, medium, strong} was requested.
    #[error("unknown preset name: {0:?}")]
    InvalidPreset(String),
}
