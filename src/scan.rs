//! Image tree scanning.
//!
//! Stage 1 of the build. Walks the image directory once and produces the two
//! read-only inputs of the image tag rewriter:
//!
//! - the [`SpImageSet`]: PC-side paths of images that have a `-sp` sibling
//! - the [`DimensionTable`]: pixel size of every measurable image
//!
//! ## Directory Structure
//!
//! ```text
//! src/
//! └── images/
//!     ├── hero.jpg              # PC only
//!     ├── banner.jpg            # PC
//!     ├── banner-sp.jpg         # SP variant of banner.jpg
//!     ├── logo.svg              # measured from its width/height attributes
//!     └── campaign/
//!         └── item.png          # nested directories are fine
//! ```
//!
//! All paths are recorded relative to the source directory with forward
//! slashes (`images/banner.jpg`), which is how the page refers to them.
//!
//! A missing image directory is an empty tree, not an error.

use crate::imaging::{ImageBackend, get_dimensions};
use crate::types::{DimensionTable, Dimensions, SpImageSet, Warning};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Dimension table error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File extensions treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "svg", "avif"];

/// Extensions the raster backend can measure.
const MEASURABLE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Suffix marking the SP variant of an image (`banner-sp.jpg`).
pub const SP_SUFFIX: &str = "-sp";

static SVG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<svg\b([^>]*)>").unwrap());

static SVG_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)\s*(?:px)?\s*$").unwrap());

/// Output of the scan stage.
#[derive(Debug, Default, Serialize)]
pub struct ScanResult {
    /// Every image file, relative to the source directory, sorted.
    pub images: Vec<String>,
    pub sp_images: SpImageSet,
    pub dimensions: DimensionTable,
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

/// Scan `source_dir/images_dir` and measure every image.
pub fn scan(
    backend: &impl ImageBackend,
    source_dir: &Path,
    images_dir: &str,
) -> Result<ScanResult, ScanError> {
    let files = list_images(&source_dir.join(images_dir))?;
    let images: Vec<String> = files
        .iter()
        .map(|path| relative_key(path, source_dir))
        .collect();
    let sp_images = find_sp_images(&images);
    let (dimensions, warnings) = measure_dimensions(backend, &files, source_dir);

    Ok(ScanResult {
        images,
        sp_images,
        dimensions,
        warnings,
    })
}

/// All image files under `dir`, depth first, sorted by name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut images = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && !is_hidden(entry.path()) && is_image(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn is_image(path: &Path) -> bool {
    IMAGE_EXTENSIONS.contains(&extension(path).as_str())
}

/// `root/images/a/b.png` → `images/a/b.png`.
pub fn relative_key(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// PC-side name for an SP file: `images/banner-sp.jpg` → `images/banner.jpg`.
///
/// `None` when the stem does not end in `-sp` (or is nothing but `-sp`).
pub fn pc_name(rel_path: &str) -> Option<String> {
    let (dir, file) = match rel_path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, rel_path),
    };
    let (stem, ext) = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file, None),
    };
    let base = stem.strip_suffix(SP_SUFFIX).filter(|b| !b.is_empty())?;
    let file = match ext {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_string(),
    };
    Some(match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    })
}

/// Collect the PC-side names of every `-sp` image.
pub fn find_sp_images<S: AsRef<str>>(images: &[S]) -> SpImageSet {
    images
        .iter()
        .filter_map(|path| pc_name(path.as_ref()))
        .collect()
}

/// Measure every image; unreadable ones become warnings.
pub fn measure_dimensions(
    backend: &impl ImageBackend,
    files: &[PathBuf],
    root: &Path,
) -> (DimensionTable, Vec<Warning>) {
    let mut table = DimensionTable::new();
    let mut warnings = Vec::new();

    for path in files {
        let key = relative_key(path, root);
        let ext = extension(path);
        let measured = if ext == "svg" {
            svg_dimensions_from_file(path)
        } else if MEASURABLE_EXTENSIONS.contains(&ext.as_str()) {
            get_dimensions(backend, path).map_err(|e| e.to_string())
        } else {
            continue;
        };
        match measured {
            Ok(dims) => table.insert(key, dims),
            Err(reason) => warnings.push(Warning::UnreadableImage { path: key, reason }),
        }
    }

    (table, warnings)
}

fn svg_dimensions_from_file(path: &Path) -> Result<Dimensions, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    svg_dimensions(&content).ok_or_else(|| "no width/height or viewBox on <svg>".to_string())
}

/// Read the intrinsic size of an SVG: `width`/`height` in pixels, else the
/// `viewBox` extent.
pub fn svg_dimensions(svg: &str) -> Option<Dimensions> {
    let attrs_text = SVG_TAG_RE.captures(svg)?.get(1)?.as_str();
    let attrs = crate::html::parse_attributes(attrs_text);
    let value = |name: &str| attrs.iter().find(|a| a.is(name)).and_then(|a| a.value);
    let length = |name: &str| {
        value(name)
            .and_then(|v| SVG_LENGTH_RE.captures(v))
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(|n| n.round() as u32)
            .filter(|&n| n > 0)
    };

    if let (Some(width), Some(height)) = (length("width"), length("height")) {
        return Some(Dimensions { width, height });
    }

    let view_box: Vec<f64> = value("viewBox")?
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    match view_box.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some(Dimensions {
            width: w.round() as u32,
            height: h.round() as u32,
        }),
        _ => None,
    }
}

/// Load a persisted dimension table (`{"path": {"width": n, "height": n}}`).
pub fn load_dimensions(path: &Path) -> Result<DimensionTable, ScanError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist a dimension table as pretty JSON.
pub fn save_dimensions(path: &Path, table: &DimensionTable) -> Result<(), ScanError> {
    let json = serde_json::to_string_pretty(table)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn pc_name_strips_sp_suffix() {
        assert_eq!(pc_name("images/banner-sp.jpg").as_deref(), Some("images/banner.jpg"));
        assert_eq!(pc_name("banner-sp.PNG").as_deref(), Some("banner.PNG"));
        assert_eq!(pc_name("images/a/b-sp.webp").as_deref(), Some("images/a/b.webp"));
        assert_eq!(pc_name("images/hero.jpg"), None);
        assert_eq!(pc_name("images/-sp.jpg"), None);
        assert_eq!(pc_name("images/crisp.jpg"), None);
    }

    #[test]
    fn hero_banner_example_sp_set() {
        let set = find_sp_images(&["hero.jpg", "banner.jpg", "banner-sp.jpg"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("banner.jpg"));
    }

    #[test]
    fn list_images_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(list_images(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn list_images_recurses_and_filters() {
        let tmp = TempDir::new().unwrap();
        let images = tmp.path().join("images");
        touch(&images, "b.jpg");
        touch(&images, "a.png");
        touch(&images, "notes.txt");
        touch(&images, ".hidden.png");
        touch(&images, "nested/deep/c.svg");

        let keys: Vec<String> = list_images(&images)
            .unwrap()
            .iter()
            .map(|p| relative_key(p, tmp.path()))
            .collect();
        assert_eq!(keys, vec!["images/a.png", "images/b.jpg", "images/nested/deep/c.svg"]);
    }

    #[test]
    fn scan_builds_set_and_table() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "images/hero.jpg");
        touch(tmp.path(), "images/banner.jpg");
        touch(tmp.path(), "images/banner-sp.jpg");

        let backend = MockBackend::with_dimensions(&[
            ("hero.jpg", 1200, 800),
            ("banner.jpg", 1600, 600),
            ("banner-sp.jpg", 750, 1000),
        ]);
        let result = scan(&backend, tmp.path(), "images").unwrap();

        assert_eq!(result.images.len(), 3);
        assert_eq!(result.sp_images.iter().collect::<Vec<_>>(), vec!["images/banner.jpg"]);
        assert_eq!(
            result.dimensions.lookup("images/banner-sp.jpg"),
            Some(Dimensions { width: 750, height: 1000 })
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unreadable_images_become_warnings() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "images/broken.png");
        touch(tmp.path(), "images/anim.gif");

        let result = scan(&MockBackend::new(), tmp.path(), "images").unwrap();
        assert!(result.dimensions.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            &result.warnings[0],
            Warning::UnreadableImage { path, .. } if path == "images/broken.png"
        ));
    }

    #[test]
    fn svg_dimensions_from_attributes_or_viewbox() {
        assert_eq!(
            svg_dimensions(r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="120px" height="40"></svg>"#),
            Some(Dimensions { width: 120, height: 40 })
        );
        assert_eq!(
            svg_dimensions(r#"<svg width="100%" viewBox="0 0 64.4 32"><path/></svg>"#),
            Some(Dimensions { width: 64, height: 32 })
        );
        assert_eq!(svg_dimensions("<svg></svg>"), None);
        assert_eq!(svg_dimensions("not svg"), None);
    }

    #[test]
    fn svg_measured_during_scan() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images/logo.svg");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"<svg viewBox="0 0 200 50"></svg>"#).unwrap();

        let result = scan(&MockBackend::new(), tmp.path(), "images").unwrap();
        assert_eq!(
            result.dimensions.lookup("images/logo.svg"),
            Some(Dimensions { width: 200, height: 50 })
        );
    }

    #[test]
    fn dimension_table_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dimensions.json");
        let mut table = DimensionTable::new();
        table.insert("images/a.png", Dimensions { width: 1, height: 2 });

        save_dimensions(&path, &table).unwrap();
        assert_eq!(load_dimensions(&path).unwrap(), table);
    }

    #[test]
    fn load_dimensions_rejects_bad_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dimensions.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_dimensions(&path), Err(ScanError::Json(_))));
    }
}
