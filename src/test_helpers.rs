//! Shared test utilities for the lp-build test suite.
//!
//! Provides synthetic image writers and a throwaway project laid out the way
//! `lp-build` expects it.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fixture = setup_project();
//! let project = Project::load(fixture.root(), &Overrides::default()).unwrap();
//! ```
//!
//! The fixture project:
//!
//! ```text
//! <tmp>/
//! ├── .env                 # SITE_TITLE, BASE_PATH=/lp, GA id, FAQPage
//! └── src/
//!     ├── index.html       # hero, banner (has SP variant), svg logo, one FAQ
//!     ├── style.css
//!     ├── script.js
//!     └── images/
//!         ├── hero.jpg         48x32
//!         ├── banner.jpg       64x24
//!         ├── banner-sp.jpg    32x32
//!         ├── logo.svg         120x40
//!         └── favicon.png      64x64
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let writer = std::io::BufWriter::new(fs::File::create(path).unwrap());
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid RGBA PNG with the given dimensions.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([200, (x % 256) as u8, (y % 256) as u8, 255])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Fixture project
// =========================================================================

pub const FIXTURE_PAGE: &str = r##"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<title>Draft</title>
<link rel="stylesheet" href="style.css">
</head>
<body>
<img src="images/hero.jpg" alt="Hero">
<img src="images/banner.jpg" alt="Banner">
<img src="images/logo.svg" alt="Logo">
<details>
  <summary>Is entry free?</summary>
  <p>Yes, entry is free.</p>
</details>
<a href="#apply" data-conversion="apply">Apply</a>
<script src="script.js"></script>
</body>
</html>
"##;

pub const FIXTURE_ENV: &str = "\
SITE_TITLE=Spring Sale
SITE_DESCRIPTION=Seasonal offers
SITE_URL=https://example.com/lp/
BASE_PATH=/lp
GA_MEASUREMENT_ID=G-TEST123
STRUCTURED_DATA_TYPE=FAQPage
";

pub const FIXTURE_SVG: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="40"><rect width="120" height="40"/></svg>"#;

/// A project in a temp directory. Dropped with the directory.
pub struct FixtureProject {
    tmp: TempDir,
}

impl FixtureProject {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }
}

/// Create the fixture project shown in the module docs.
pub fn setup_project() -> FixtureProject {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let images = root.join("src/images");
    fs::create_dir_all(&images).unwrap();

    fs::write(root.join(".env"), FIXTURE_ENV).unwrap();
    fs::write(root.join("src/index.html"), FIXTURE_PAGE).unwrap();
    fs::write(
        root.join("src/style.css"),
        "body {\n  margin: 0;\n  color: #333333;\n}\n",
    )
    .unwrap();
    fs::write(root.join("src/script.js"), "console.log('ready');\n").unwrap();

    write_test_jpeg(&images.join("hero.jpg"), 48, 32);
    write_test_jpeg(&images.join("banner.jpg"), 64, 24);
    write_test_jpeg(&images.join("banner-sp.jpg"), 32, 32);
    write_test_png(&images.join("favicon.png"), 64, 64);
    fs::write(images.join("logo.svg"), FIXTURE_SVG).unwrap();

    FixtureProject { tmp }
}
