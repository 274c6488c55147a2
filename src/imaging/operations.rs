//! High-level normalization steps.
//!
//! These functions combine calculations with backend execution. Each takes
//! an input path and returns the path the next step should use, which is the
//! input itself when nothing had to be done.
//!
//! Output paths are reported through `register` *before* the backend
//! writes, so a caller tracking temporary files also sees a half-written
//! output when encoding fails.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_aspect_crop;
use super::params::{AspectEnvelope, ConvertParams, CropParams, Quality};
use crate::naming;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Plan a format conversion without executing it.
///
/// `None` when `source` is already canonical.
pub fn plan_conversion(source: &Path, quality: Quality) -> Option<ConvertParams> {
    if naming::is_canonical(source) {
        return None;
    }
    Some(ConvertParams {
        source: source.to_path_buf(),
        output: naming::converted_path(source),
        quality,
    })
}

/// Re-encode `source` as canonical JPEG next to it.
pub fn convert_to_canonical(
    backend: &impl ImageBackend,
    source: &Path,
    quality: Quality,
    mut register: impl FnMut(&Path),
) -> Result<PathBuf> {
    let Some(params) = plan_conversion(source, quality) else {
        return Ok(source.to_path_buf());
    };
    register(&params.output);
    backend.convert(&params)?;
    tracing::info!(from = %source.display(), to = %params.output.display(), "converted image");
    Ok(params.output)
}

/// Plan an aspect-ratio crop for an image of known dimensions.
///
/// `None` when the ratio is inside the envelope.
pub fn plan_crop(
    source: &Path,
    dims: (u32, u32),
    envelope: AspectEnvelope,
    quality: Quality,
) -> Option<CropParams> {
    let crop = calculate_aspect_crop(dims, envelope)?;
    Some(CropParams {
        source: source.to_path_buf(),
        output: naming::processed_path(source),
        crop,
        quality,
    })
}

/// Center-crop `source` into the aspect envelope.
pub fn correct_aspect(
    backend: &impl ImageBackend,
    source: &Path,
    envelope: AspectEnvelope,
    quality: Quality,
    mut register: impl FnMut(&Path),
) -> Result<PathBuf> {
    let dims = get_dimensions(backend, source)?;
    if dims.0 == 0 || dims.1 == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Image has no pixels: {}",
            source.display()
        )));
    }
    let Some(params) = plan_crop(source, dims, envelope, quality) else {
        tracing::debug!(
            file = %source.display(),
            width = dims.0,
            height = dims.1,
            "aspect ratio within envelope"
        );
        return Ok(source.to_path_buf());
    };
    register(&params.output);
    backend.crop(&params)?;
    tracing::info!(
        file = %params.output.display(),
        width = params.crop.width,
        height = params.crop.height,
        "cropped to aspect envelope"
    );
    Ok(params.output)
}
