//! Image and favicon stages.
//!
//! The image stage copies the source image tree into the output directory
//! unchanged and then writes AVIF and WebP siblings next to every copied PNG
//! and JPEG:
//!
//! ```text
//! dist/images/
//! ├── hero.jpg        # copied original
//! ├── hero.avif       # generated
//! ├── hero.webp       # generated
//! ├── banner-sp.jpg
//! ├── banner-sp.avif
//! ├── banner-sp.webp
//! └── logo.svg        # copied, not converted
//! ```
//!
//! The favicon stage resizes `images/favicon.png` into the icon set declared
//! in [`FAVICONS`](crate::tags::favicon::FAVICONS), written to the output root.
//!
//! ## Parallel Processing
//!
//! Conversions run in parallel using [rayon](https://docs.rs/rayon); the pool
//! size comes from `[processing] max_processes`. One failed conversion does
//! not stop the others; failures are collected into the report.

use crate::imaging::{BackendError, ImageBackend, Quality, create_favicons, create_variants, is_convertible};
use crate::scan::relative_key;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
}

/// One image whose conversion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    /// Path relative to the output image directory.
    pub path: String,
    pub reason: String,
}

/// Outcome of the image stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageStageReport {
    /// Files copied from the source image tree.
    pub copied: usize,
    /// PNG/JPEG files that got both siblings.
    pub converted: usize,
    pub failures: Vec<ConversionFailure>,
}

/// Copy `src` into `dst` recursively. Returns the number of files copied.
///
/// A missing `src` copies nothing.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, ProcessError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy the image tree and convert every PNG/JPEG in the copy.
pub fn process_images(
    backend: &impl ImageBackend,
    images_src: &Path,
    images_out: &Path,
    quality: Quality,
) -> Result<ImageStageReport, ProcessError> {
    let copied = copy_dir_recursive(images_src, images_out)?;
    if copied == 0 {
        return Ok(ImageStageReport::default());
    }

    let mut convertible = Vec::new();
    for entry in WalkDir::new(images_out).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_convertible(entry.path()) {
            convertible.push(entry.into_path());
        }
    }

    let results: Vec<(PathBuf, Result<Vec<PathBuf>, BackendError>)> = convertible
        .par_iter()
        .map(|path| (path.clone(), create_variants(backend, path, quality)))
        .collect();

    let mut report = ImageStageReport {
        copied,
        ..Default::default()
    };
    for (path, result) in results {
        match result {
            Ok(_) => report.converted += 1,
            Err(e) => report.failures.push(ConversionFailure {
                path: relative_key(&path, images_out),
                reason: e.to_string(),
            }),
        }
    }
    Ok(report)
}

/// Generate the favicon set from `source` into `output_dir`.
///
/// Returns `Ok(None)` when there is no source icon.
pub fn process_favicon(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
) -> Result<Option<Vec<PathBuf>>, ProcessError> {
    if !source.is_file() {
        return Ok(None);
    }
    fs::create_dir_all(output_dir)?;
    Ok(Some(create_favicons(backend, source, output_dir)?))
}
