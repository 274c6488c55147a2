//! Filename conventions shared by the selector and the normalizer.
//!
//! ## Candidates
//!
//! A file is a candidate when its extension is one of [`IMAGE_EXTENSIONS`],
//! compared case-insensitively: `Sunset.JPG`, `dawn.jpeg` and `cat.png` all
//! qualify, `notes.txt` and `.hidden.jpg` do not.
//!
//! ## Intermediate artifacts
//!
//! Normalization writes its outputs next to the source image:
//!
//! ```text
//! UPLOADS/
//! ├── 042-harbour.png               # candidate (never modified)
//! ├── 042-harbour.jpg               # format-converted artifact
//! └── 042-harbour_processed.jpg     # aspect-cropped artifact
//! ```
//!
//! When a derived name is already taken by another file, a numbered variant
//! (`042-harbour-2.jpg`) is used instead so user files are never overwritten.

use std::path::{Path, PathBuf};

/// Extensions recognized as candidate images (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extension written for every generated artifact.
pub const CANONICAL_EXTENSION: &str = "jpg";

const PROCESSED_SUFFIX: &str = "_processed";

/// Lowercased extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Whether the file name carries a recognized image extension.
///
/// Hidden files are never candidates.
pub fn is_candidate_image(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    if hidden {
        return false;
    }
    extension_of(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether the file is already in the canonical (JPEG) encoding.
pub fn is_canonical(path: &Path) -> bool {
    matches!(extension_of(path).as_deref(), Some("jpg" | "jpeg"))
}

/// Path for the format-converted copy of `source`: same stem, `.jpg`.
pub fn converted_path(source: &Path) -> PathBuf {
    first_free(source.with_extension(CANONICAL_EXTENSION))
}

/// Path for the aspect-cropped copy of `source`: `<stem>_processed.jpg`.
pub fn processed_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = format!("{stem}{PROCESSED_SUFFIX}.{CANONICAL_EXTENSION}");
    first_free(source.with_file_name(name))
}

/// Return `path` if nothing exists there, otherwise the first free
/// `<stem>-N.<ext>` sibling starting at N = 2.
fn first_free(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    (2u32..)
        .map(|n| path.with_file_name(format!("{stem}-{n}.{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(path)
}
