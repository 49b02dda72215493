//! High-level image operations.
//!
//! These functions decide which files to write and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::params::{ConvertParams, IconParams, Quality};
use crate::tags::favicon::FAVICONS;
use crate::types::Dimensions;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Extensions that get AVIF/WebP siblings.
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Whether `path` is a PNG/JPEG that gets modern-format siblings.
pub fn is_convertible(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| CONVERTIBLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Sibling paths for the modern formats: `hero.jpg` → `hero.avif`, `hero.webp`.
pub fn variant_paths(source: &Path) -> [PathBuf; 2] {
    [source.with_extension("avif"), source.with_extension("webp")]
}

/// Write AVIF and WebP siblings next to `source`.
///
/// Returns the written paths.
pub fn create_variants(
    backend: &impl ImageBackend,
    source: &Path,
    quality: Quality,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(2);
    for output in variant_paths(source) {
        backend.convert(&ConvertParams {
            source: source.to_path_buf(),
            output: output.clone(),
            quality,
        })?;
        written.push(output);
    }
    Ok(written)
}

/// Resize `source` into every icon of the favicon set under `output_dir`.
pub fn create_favicons(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    FAVICONS
        .iter()
        .map(|icon| {
            let output = output_dir.join(icon.file_name);
            backend.resize_square(&IconParams {
                source: source.to_path_buf(),
                output: output.clone(),
                size: icon.size,
            })?;
            Ok(output)
        })
        .collect()
}
