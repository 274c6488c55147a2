//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which artifacts to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1-100, default 95). Clamped on construction.
//! - [`AspectEnvelope`]: inclusive width/height ratio range the service accepts.
//! - [`ConvertParams`]: re-encode a source image as canonical JPEG.
//! - [`CropParams`]: center crop box plus output path and quality.

use super::calculations::CropBox;
use std::path::PathBuf;

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Accepted width/height ratio range, inclusive on both ends.
///
/// The defaults are the destination platform's portrait (4:5) and landscape
/// (1.91:1) limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectEnvelope {
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl AspectEnvelope {
    pub fn new(min_ratio: f64, max_ratio: f64) -> Self {
        Self {
            min_ratio,
            max_ratio,
        }
    }

    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.min_ratio && ratio <= self.max_ratio
    }
}

impl Default for AspectEnvelope {
    fn default() -> Self {
        Self::new(0.8, 1.91)
    }
}

/// Re-encode `source` as a 3-channel JPEG at `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub quality: Quality,
}

/// Crop `source` to `crop`, flatten to RGB and write a JPEG at `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub crop: CropBox,
    pub quality: Quality,
}
