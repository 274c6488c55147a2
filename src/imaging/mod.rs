//! Image normalization in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions`, format sniffed |
//! | **Convert → JPEG** | decode + `to_rgb8` + `JpegEncoder` |
//! | **Aspect crop** | `crop_imm` on the box from [`calculate_aspect_crop`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: The two normalization steps combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{CropBox, calculate_aspect_crop};
pub use operations::{convert_to_canonical, correct_aspect, get_dimensions};
pub use params::{AspectEnvelope, ConvertParams, CropParams, Quality};
pub use rust_backend::RustBackend;
