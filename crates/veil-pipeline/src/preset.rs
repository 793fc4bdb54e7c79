//! Named strength presets controlling every pipeline stage.
//!
//! A preset is an immutable bundle of transform magnitudes selected by
//! name. The three built-in bundles scale every downstream stage
//! together, from barely-measurable (`light`) to the strongest
//! perturbation that stays visually imperceptible (`strong`).
//!
//! All values are in final units: `noise_sigma` is the per-sample
//! Gaussian standard deviation on the 0-255 scale, `blur_radius` is
//! the Gaussian sigma in pixels actually handed to the blur filter,
//! and `sharpen_percent` is the unsharp-mask strength out of 100.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// Strength preset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Minimal perturbation; highest output fidelity.
    Light,
    /// Balanced perturbation strength.
    Medium,
    /// Strongest perturbation; lowest output fidelity.
    Strong,
}

/// Parameter bundle consumed by the pipeline stages.
///
/// Immutable once constructed; the built-in bundles are `const` and
/// there is no runtime mutation path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetParams {
    /// Standard deviation of the per-channel Gaussian noise stage.
    pub noise_sigma: f64,

    /// Strength factor for the frequency-domain perturbation stage.
    /// Scaled by a fixed base of 2e-4 before sampling.
    pub spectral_factor: f64,

    /// Fraction of chroma removed by the desaturation step (0.0-1.0).
    pub desaturate_fraction: f32,

    /// Luminance gain of the brightness step: output luminance is
    /// multiplied by `1 + brightness_fraction`. Zero skips the step.
    pub brightness_fraction: f32,

    /// Gaussian sigma of the spatial blur step, in pixels.
    pub blur_radius: f32,

    /// Unsharp-mask strength out of 100.
    pub sharpen_percent: f32,

    /// Minimum per-sample difference (0-255 scale) that the sharpen
    /// step will amplify.
    pub sharpen_threshold: i16,
}

const LIGHT: PresetParams = PresetParams {
    noise_sigma: 0.3,
    spectral_factor: 0.08,
    desaturate_fraction: 0.002,
    brightness_fraction: 0.0,
    blur_radius: 0.01,
    sharpen_percent: 10.0,
    sharpen_threshold: 3,
};

const MEDIUM: PresetParams = PresetParams {
    noise_sigma: 0.8,
    spectral_factor: 0.12,
    desaturate_fraction: 0.004,
    brightness_fraction: 0.0,
    blur_radius: 0.02,
    sharpen_percent: 20.0,
    sharpen_threshold: 3,
};

const STRONG: PresetParams = PresetParams {
    noise_sigma: 1.8,
    spectral_factor: 0.20,
    desaturate_fraction: 0.008,
    brightness_fraction: 0.0,
    blur_radius: 0.04,
    sharpen_percent: 30.0,
    sharpen_threshold: 3,
};

impl Preset {
    /// All presets, weakest first.
    pub const ALL: [Self; 3] = [Self::Light, Self::Medium, Self::Strong];

    /// The parameter bundle for this preset.
    #[must_use]
    pub const fn params(self) -> &'static PresetParams {
        match self {
            Self::Light => &LIGHT,
            Self::Medium => &MEDIUM,
            Self::Strong => &STRONG,
        }
    }

    /// The lowercase preset name, as used in output filenames.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = PipelineError;

    /// Resolve a preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPreset`] for any name outside
    /// {`light`, `medium`, `strong`}. There is deliberately no
    /// permissive fallback: an unrecognized name is more likely a typo
    /// than a request for the weakest setting.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "strong" => Ok(Self::Strong),
            other => Err(PipelineError::InvalidPreset(other.to_string())),
        }
    }
}
