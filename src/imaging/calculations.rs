//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::AspectEnvelope;

/// A rectangular region inside an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

/// Calculate the center crop that brings an image inside `envelope`.
///
/// Returns `None` when the ratio is already acceptable, so the caller can
/// keep using the source untouched.
///
/// - too tall (`w/h < min`): keep the width, height becomes `floor(w / min)`
/// - too wide (`w/h > max`): keep the height, width becomes `floor(h * max)`
///
/// # Examples
/// ```
/// # use daily_post::imaging::{AspectEnvelope, calculate_aspect_crop};
/// let crop = calculate_aspect_crop((1000, 2000), AspectEnvelope::default()).unwrap();
/// assert_eq!((crop.width, crop.height), (1000, 1250));
/// assert_eq!((crop.left, crop.top), (0, 375));
///
/// assert_eq!(calculate_aspect_crop((1000, 1000), AspectEnvelope::default()), None);
/// ```
pub fn calculate_aspect_crop(dims: (u32, u32), envelope: AspectEnvelope) -> Option<CropBox> {
    let (w, h) = dims;
    if w == 0 || h == 0 {
        return None;
    }
    let ratio = w as f64 / h as f64;

    let (target_w, target_h) = if ratio < envelope.min_ratio {
        // Too tall: trim top and bottom
        let target_h = (w as f64 / envelope.min_ratio).floor() as u32;
        (w, target_h.clamp(1, h))
    } else if ratio > envelope.max_ratio {
        // Too wide: trim left and right
        let target_w = (h as f64 * envelope.max_ratio).floor() as u32;
        (target_w.clamp(1, w), h)
    } else {
        return None;
    };

    Some(CropBox {
        left: (w - target_w) / 2,
        top: (h - target_h) / 2,
        width: target_w,
        height: target_h,
    })
}
