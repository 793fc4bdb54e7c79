//! Metadata-free PNG output with deterministic naming.
//!
//! Output files are rebuilt from the raw pixel buffer alone, so no
//! profile, EXIF, or text chunk from the source (or from any decoding
//! library) can survive into the result. The encode happens into a
//! memory buffer first and hits the disk in a single write, so a
//! failed task leaves no partial file behind.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use veil_pipeline::{Preset, RgbImage};

use crate::types::TaskError;

/// Filename prefix of every produced PNG.
pub const OUTPUT_PREFIX: &str = "veil";

/// Deterministic output path for a source image and preset:
/// `<output_dir>/veil_<preset>_<source-stem>.png`.
///
/// Distinct inputs in one batch map to distinct filenames (within the
/// limits of stem collisions across directories), so parallel workers
/// never write to the same path.
#[must_use]
pub fn output_path(output_dir: &Path, preset: Preset, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    output_dir.join(format!("{OUTPUT_PREFIX}_{preset}_{stem}.png"))
}

/// Encode `image` as a metadata-free PNG and write it to `path`.
///
/// Fast compression is used: output size matters less than batch
/// throughput, and PNG is lossless at every level.
///
/// # Errors
///
/// Returns [`TaskError::WriteFailure`] if encoding fails or the file
/// cannot be written.
pub fn write_clean_png(image: &RgbImage, path: &Path) -> Result<(), TaskError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::Adaptive);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| TaskError::WriteFailure {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    fs::write(path, &buf).map_err(|e| TaskError::WriteFailure {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
