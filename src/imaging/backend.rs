//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations normalization
//! needs: identify, convert and crop.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::params::{ConvertParams, CropParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode any supported format and re-encode it as RGB JPEG.
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError>;

    /// Crop to a box, flatten to RGB and encode as JPEG.
    fn crop(&self, params: &CropParams) -> Result<(), BackendError>;
}

impl<T: ImageBackend + ?Sized> ImageBackend for &T {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        (**self).identify(path)
    }

    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
        (**self).convert(params)
    }

    fn crop(&self, params: &CropParams) -> Result<(), BackendError> {
        (**self).crop(params)
    }
}
