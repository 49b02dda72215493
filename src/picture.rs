//! Image tag rewriter.
//!
//! Walks every `<img>` with a quoted `src` in document order and:
//!
//! 1. fills in missing `width`/`height` from the [`DimensionTable`]
//!    (only when at least one of them is missing)
//! 2. adds `loading="lazy"` to every image except the first, unless the
//!    author already set `loading`
//! 3. prefixes relative `src` values with the base path
//! 4. wraps PNG/JPEG images in a `<picture>` offering AVIF and WebP, plus
//!    scoped SP sources (`max-width: 767px`) when a `-sp` sibling exists
//!
//! Pre-existing `<picture>` blocks are set aside before the pass and put back
//! afterwards, so hand-written markup comes out byte-for-byte unchanged.
//! Everything outside a rewritten `<img>` tag is untouched.

use crate::html::{parse_attributes, with_prefix};
use crate::types::{DimensionTable, SpImageSet, Warning};
use maud::{Markup, PreEscaped, html};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PICTURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<picture\b.*?</picture\s*>").unwrap());

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<img\b([^>]*)>").unwrap());

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{0}LPBPICTURE([0-9]+)\u{0}").unwrap());

/// Viewport query for SP sources. PC is 768px and up.
pub const SP_MEDIA: &str = "(max-width: 767px)";

/// Inputs the rewriter consults. Nothing here is mutated.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub dimensions: &'a DimensionTable,
    pub sp_images: &'a SpImageSet,
    /// Normalized base path (`/lp`), see [`SiteParams::path_prefix`](crate::site::SiteParams::path_prefix).
    pub prefix: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteResult {
    pub html: String,
    /// Diagnostics from the pass. Nothing currently produces one.
    pub warnings: Vec<Warning>,
    /// `<img>` tags processed (outside pre-existing `<picture>` blocks).
    pub images: usize,
    /// How many of those were wrapped in a generated `<picture>`.
    pub pictures: usize,
}

/// Rewrite every eligible `<img>` in `html`.
pub fn rewrite_images(html: &str, ctx: &RewriteContext<'_>) -> RewriteResult {
    let mut protected: Vec<String> = Vec::new();
    let shielded = PICTURE_RE.replace_all(html, |caps: &Captures| {
        protected.push(caps[0].to_string());
        format!("\u{0}LPBPICTURE{}\u{0}", protected.len() - 1)
    });

    let mut images = 0;
    let mut pictures = 0;
    let rewritten = IMG_RE.replace_all(&shielded, |caps: &Captures| {
        match rewrite_img(&caps[0], &caps[1], images + 1, ctx) {
            Some(tag) => {
                images += 1;
                if tag.is_picture {
                    pictures += 1;
                }
                tag.html
            }
            None => caps[0].to_string(),
        }
    });

    let html = if protected.is_empty() {
        rewritten.into_owned()
    } else {
        PLACEHOLDER_RE
            .replace_all(&rewritten, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| protected.get(idx))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    };

    RewriteResult {
        html,
        warnings: Vec::new(),
        images,
        pictures,
    }
}

struct RewrittenTag {
    html: String,
    is_picture: bool,
}

/// Rewrite one tag. `None` when the tag has no quoted, non-empty `src`.
fn rewrite_img(
    tag: &str,
    attr_text: &str,
    occurrence: usize,
    ctx: &RewriteContext<'_>,
) -> Option<RewrittenTag> {
    let attrs = parse_attributes(attr_text);
    let src_attr = attrs
        .iter()
        .find(|a| a.is("src") && a.quote.is_some() && a.value.is_some_and(|v| !v.is_empty()))?;
    let src = src_attr.value?;
    let src_span = src_attr.value_span.clone()?;

    let has = |name: &str| attrs.iter().any(|a| a.is(name));
    let (has_width, has_height) = (has("width"), has("height"));
    let lookup_path = src.strip_prefix('/').unwrap_or(src);

    let mut additions = Vec::new();
    if !(has_width && has_height)
        && let Some(dims) = ctx.dimensions.lookup(lookup_path)
    {
        if !has_width {
            additions.push(format!(r#"width="{}""#, dims.width));
        }
        if !has_height {
            additions.push(format!(r#"height="{}""#, dims.height));
        }
    }
    if occurrence > 1 && !has("loading") {
        additions.push(r#"loading="lazy""#.to_string());
    }

    let served = served_path(src, ctx.prefix);
    let variant = picture_variant(src);

    if additions.is_empty() && served == src && variant.is_none() {
        return Some(RewrittenTag {
            html: tag.to_string(),
            is_picture: false,
        });
    }

    let img = rebuild_img(attr_text, src_span, &served, &additions);
    let Some((base, ext)) = variant else {
        return Some(RewrittenTag {
            html: img,
            is_picture: false,
        });
    };

    let served_base = served_path(base, ctx.prefix);
    let sources = if ctx.sp_images.contains(lookup_path) {
        sp_sources(&served_base, ext)
    } else {
        pc_sources(&served_base)
    };

    Some(RewrittenTag {
        html: format!("<picture>{}{img}</picture>", sources.into_string()),
        is_picture: true,
    })
}

/// Absolute paths, full URLs and data URIs are served as written.
fn is_absolute(src: &str) -> bool {
    src.starts_with('/')
        || src.starts_with("http:")
        || src.starts_with("https:")
        || src.starts_with("data:")
}

fn served_path(path: &str, prefix: Option<&str>) -> String {
    if is_absolute(path) {
        path.to_string()
    } else {
        with_prefix(prefix, path)
    }
}

/// `(base, ext)` for PNG/JPEG sources, e.g. `images/hero.JPG` → `("images/hero", "JPG")`.
fn picture_variant(src: &str) -> Option<(&str, &str)> {
    if src.starts_with("data:") || src.contains(['?', '#']) {
        return None;
    }
    let (base, ext) = src.rsplit_once('.')?;
    if base.is_empty() || base.ends_with('/') || ext.contains('/') {
        return None;
    }
    matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg").then_some((base, ext))
}

fn mime_for(ext: &str) -> &'static str {
    if ext.eq_ignore_ascii_case("png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

fn srcset(value: &str) -> PreEscaped<String> {
    // The value comes from already-escaped attribute text.
    PreEscaped(value.replace('"', "&quot;"))
}

fn pc_sources(served_base: &str) -> Markup {
    html! {
        source type="image/avif" srcset=(srcset(&format!("{served_base}.avif")));
        source type="image/webp" srcset=(srcset(&format!("{served_base}.webp")));
    }
}

fn sp_sources(served_base: &str, ext: &str) -> Markup {
    html! {
        source media=(SP_MEDIA) type="image/avif" srcset=(srcset(&format!("{served_base}-sp.avif")));
        source media=(SP_MEDIA) type="image/webp" srcset=(srcset(&format!("{served_base}-sp.webp")));
        source media=(SP_MEDIA) type=(mime_for(ext)) srcset=(srcset(&format!("{served_base}-sp.{ext}")));
        (pc_sources(served_base))
    }
}

/// Re-emit the `<img>` with `src` replaced and `additions` appended,
/// keeping the author's attribute text and self-closing slash.
fn rebuild_img(
    attr_text: &str,
    src_span: std::ops::Range<usize>,
    served: &str,
    additions: &[String],
) -> String {
    let mut attrs = String::with_capacity(attr_text.len() + served.len() + 48);
    attrs.push_str(&attr_text[..src_span.start]);
    attrs.push_str(served);
    attrs.push_str(&attr_text[src_span.end..]);

    if additions.is_empty() {
        return format!("<img{attrs}>");
    }

    let trimmed = attrs.trim_end();
    let (body, self_closing) = match trimmed.strip_suffix('/') {
        Some(body) => (body.trim_end(), true),
        None => (trimmed, false),
    };
    let slash = if self_closing { " /" } else { "" };
    format!("<img{body} {}{slash}>", additions.join(" "))
}
