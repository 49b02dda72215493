//! Favicon set.
//!
//! One square source image (`images/favicon.png`) is resized into the icon set
//! below; [`favicon_tags`] renders the matching `<link>` tags. The image stage
//! and this generator share [`FAVICONS`], so the tags never point at a file
//! that was not written.

use super::join_lines;
use crate::html::with_prefix;
use maud::html;

/// One generated icon file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaviconSpec {
    pub file_name: &'static str,
    /// Edge length in pixels.
    pub size: u32,
    pub rel: &'static str,
}

pub const FAVICONS: &[FaviconSpec] = &[
    FaviconSpec {
        file_name: "favicon-16x16.png",
        size: 16,
        rel: "icon",
    },
    FaviconSpec {
        file_name: "favicon-32x32.png",
        size: 32,
        rel: "icon",
    },
    FaviconSpec {
        file_name: "apple-touch-icon.png",
        size: 180,
        rel: "apple-touch-icon",
    },
    FaviconSpec {
        file_name: "android-chrome-192x192.png",
        size: 192,
        rel: "icon",
    },
    FaviconSpec {
        file_name: "android-chrome-512x512.png",
        size: 512,
        rel: "icon",
    },
];

/// Render `<link>` tags for every icon in [`FAVICONS`], hrefs under `prefix`.
pub fn favicon_tags(prefix: Option<&str>) -> String {
    join_lines(FAVICONS.iter().map(|icon| {
        let sizes = format!("{0}x{0}", icon.size);
        let href = with_prefix(prefix, icon.file_name);
        if icon.rel == "icon" {
            html! { link rel=(icon.rel) type="image/png" sizes=(sizes) href=(href); }
        } else {
            html! { link rel=(icon.rel) sizes=(sizes) href=(href); }
        }
    }))
}
