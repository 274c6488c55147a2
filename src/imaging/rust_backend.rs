//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only, format from content) |
//! | Decode (JPEG, PNG) | `image::ImageReader` with format guessed from content |
//! | Flatten to RGB | `DynamicImage::to_rgb8` (alpha and palette discarded) |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{ConvertParams, CropParams, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from the file contents so a PNG saved with a
/// `.jpg` name still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Flatten to 8-bit RGB and write a baseline JPEG.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let rgb = img.to_rgb8();
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.value() as u8);
    rgb.write_with_encoder(encoder).map_err(|e| {
        BackendError::ProcessingFailed(format!("JPEG encode failed for {}: {}", path.display(), e))
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        save_jpeg(&img, &params.output, params.quality)
    }

    fn crop(&self, params: &CropParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let c = params.crop;
        if c.right() > img.width() || c.bottom() > img.height() {
            return Err(BackendError::ProcessingFailed(format!(
                "Crop {}x{}+{}+{} exceeds image {}x{}",
                c.width,
                c.height,
                c.left,
                c.top,
                img.width(),
                img.height()
            )));
        }
        let cropped = img.crop_imm(c.left, c.top, c.width, c.height);
        save_jpeg(&cropped, &params.output, params.quality)
    }
}
