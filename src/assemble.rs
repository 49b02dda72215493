//! Document assembler.
//!
//! Turns the source page into the page that gets minified:
//!
//! 1. replace the first `<title>` when `SITE_TITLE` is set
//! 2. inject head fragments before the first literal `</head>`, in order
//!    meta/OGP, analytics, favicon, structured data (structured data runs
//!    last because FAQ extraction reads the page as assembled so far)
//! 3. run the image tag rewriter over the whole document
//! 4. point stylesheet/script references at the minified, prefixed files

use crate::html::{escape_attr, with_prefix};
use crate::picture::{RewriteContext, rewrite_images};
use crate::site::SiteParams;
use crate::tags::{analytics, favicon, meta, structured_data};
use crate::types::{DimensionTable, Fragment, FragmentKind, Fragments, SpImageSet, Warning};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>.*?</title\s*>").unwrap());

const HEAD_CLOSE: &str = "</head>";

/// Everything the assembler reads. Built once per build.
#[derive(Debug, Clone, Copy)]
pub struct AssembleContext<'a> {
    pub params: &'a SiteParams,
    pub dimensions: &'a DimensionTable,
    pub sp_images: &'a SpImageSet,
    /// Whether the favicon set is being generated.
    pub favicon: bool,
    /// Source stylesheet name as referenced by the page (`style.css`).
    pub css_name: &'a str,
    /// Source script name as referenced by the page (`script.js`).
    pub js_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub html: String,
    /// Non-empty fragments that were generated, in injection order.
    pub fragments: Fragments,
    pub warnings: Vec<Warning>,
    /// `<img>` tags the rewriter processed.
    pub images: usize,
    /// Of those, how many became `<picture>` blocks.
    pub pictures: usize,
}

/// Assemble the page.
pub fn assemble(source: &str, ctx: &AssembleContext<'_>) -> Assembled {
    let params = ctx.params;
    let prefix = params.path_prefix();
    let mut warnings = Vec::new();

    let mut html = match params.title.as_deref() {
        Some(title) => replace_title(source, title),
        None => source.to_string(),
    };

    let mut fragments: Fragments = [
        Fragment::new(FragmentKind::Meta, meta::meta_tags(params)),
        Fragment::new(
            FragmentKind::Analytics,
            analytics::analytics_tags(&params.analytics),
        ),
        Fragment::new(
            FragmentKind::Favicon,
            if ctx.favicon {
                favicon::favicon_tags(prefix)
            } else {
                String::new()
            },
        ),
    ]
    .into_iter()
    .filter(|f| !f.is_empty())
    .collect();

    let head_found = html.contains(HEAD_CLOSE);
    if head_found {
        for fragment in &fragments {
            inject_before_head_close(&mut html, &fragment.html);
        }
    }

    let (ld_json, schema_warnings) = structured_data::structured_data(params, &html);
    warnings.extend(schema_warnings);
    let ld_json = Fragment::new(FragmentKind::StructuredData, ld_json);
    if !ld_json.is_empty() {
        if head_found {
            inject_before_head_close(&mut html, &ld_json.html);
        }
        fragments.push(ld_json);
    }

    if !head_found && !fragments.is_empty() {
        warnings.push(Warning::MissingHeadMarker);
    }

    let rewritten = rewrite_images(
        &html,
        &RewriteContext {
            dimensions: ctx.dimensions,
            sp_images: ctx.sp_images,
            prefix,
        },
    );
    warnings.extend(rewritten.warnings);

    let html = rewrite_asset_refs(&rewritten.html, ctx.css_name, ctx.js_name, prefix);

    Assembled {
        html,
        fragments,
        warnings,
        images: rewritten.images,
        pictures: rewritten.pictures,
    }
}

fn replace_title(html: &str, title: &str) -> String {
    let replacement = format!("<title>{}</title>", escape_attr(title));
    TITLE_RE.replace(html, NoExpand(&replacement)).into_owned()
}

/// Insert `fragment` and a newline in front of the first `</head>`.
fn inject_before_head_close(html: &mut String, fragment: &str) {
    if let Some(pos) = html.find(HEAD_CLOSE) {
        html.insert_str(pos, &format!("{fragment}\n"));
    }
}

/// `style.css` → `style.min.css`, `js/app.js` → `js/app.min.js`.
pub fn minified_name(name: &str) -> String {
    let file_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[file_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = file_start + dot;
            format!("{}.min{}", &name[..dot], &name[dot..])
        }
        _ => format!("{name}.min"),
    }
}

/// Point `href="style.css"` / `src="script.js"` (either quote style) at the
/// minified output files under the base path.
pub fn rewrite_asset_refs(html: &str, css_name: &str, js_name: &str, prefix: Option<&str>) -> String {
    let mut out = html.to_string();
    for (attr, name) in [("href", css_name), ("src", js_name)] {
        let target = with_prefix(prefix, &minified_name(name));
        for quote in ['"', '\''] {
            let from = format!("{attr}={quote}{name}{quote}");
            let to = format!("{attr}={quote}{target}{quote}");
            out = out.replace(&from, &to);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::EnvMap;
    use crate::types::Dimensions;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<title>Draft</title>
<link rel="stylesheet" href="style.css">
</head>
<body>
<img src="images/hero.jpg" alt="Hero">
<details><summary>Free shipping?</summary><p>Always.</p></details>
<img src="images/banner.jpg" alt="Banner">
<script src="script.js"></script>
</body>
</html>
"#;

    fn params(pairs: &[(&str, &str)]) -> SiteParams {
        let env: EnvMap = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SiteParams::from_env(&env).0
    }

    fn run(source: &str, params: &SiteParams, favicon: bool) -> Assembled {
        let mut dimensions = DimensionTable::new();
        dimensions.insert("images/hero.jpg", Dimensions { width: 1200, height: 800 });
        let sp_images: SpImageSet = ["images/banner.jpg"].into_iter().collect();
        assemble(
            source,
            &AssembleContext {
                params,
                dimensions: &dimensions,
                sp_images: &sp_images,
                favicon,
                css_name: "style.css",
                js_name: "script.js",
            },
        )
    }

    #[test]
    fn empty_config_only_rewrites_images() {
        let source = "<html><head><title>X</title></head><body><p>a &amp; b</p><img src=\"x.gif\" width=\"1\" height=\"1\"></body></html>";
        let out = run(source, &SiteParams::default(), false);
        assert_eq!(out.html, source);
        assert!(out.fragments.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn title_is_replaced_and_escaped() {
        let out = run(PAGE, &params(&[("SITE_TITLE", "Sale <50%> & more")]), false);
        assert!(out.html.contains("<title>Sale &lt;50%&gt; &amp; more</title>"));
        assert!(!out.html.contains("Draft"));
    }

    #[test]
    fn title_with_dollar_signs_is_literal() {
        let out = run(PAGE, &params(&[("SITE_TITLE", "$1 deals")]), false);
        assert!(out.html.contains("<title>$1 deals</title>"));
    }

    #[test]
    fn fragments_land_before_head_close_in_order() {
        let params = params(&[
            ("SITE_DESCRIPTION", "Desc"),
            ("GA_MEASUREMENT_ID", "G-1"),
            ("STRUCTURED_DATA_TYPE", "FAQPage"),
        ]);
        let out = run(PAGE, &params, true);
        let head_end = out.html.find("</head>").unwrap();
        let positions: Vec<usize> = [
            r#"name="description""#,
            "googletagmanager",
            "favicon-16x16.png",
            "application/ld+json",
        ]
        .iter()
        .map(|needle| out.html.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(positions.iter().all(|&p| p < head_end));
        let kinds: Vec<FragmentKind> = out.fragments.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FragmentKind::Meta,
                FragmentKind::Analytics,
                FragmentKind::Favicon,
                FragmentKind::StructuredData
            ]
        );
        assert!(out.html.contains(r#""name":"Free shipping?""#));
    }

    #[test]
    fn images_and_assets_are_rewritten_under_base_path() {
        let out = run(PAGE, &params(&[("BASE_PATH", "/spring/")]), false);
        assert!(out.html.contains(r#"href="/spring/style.min.css""#));
        assert!(out.html.contains(r#"<script src="/spring/script.min.js">"#));
        assert!(out.html.contains(r#"<img src="/spring/images/hero.jpg" alt="Hero" width="1200" height="800">"#));
        assert_eq!(out.images, 2);
        assert_eq!(out.pictures, 2);
        assert!(out.html.contains(r#"loading="lazy""#));
    }

    #[test]
    fn asset_refs_without_prefix() {
        let out = rewrite_asset_refs(
            "<link href='style.css'><script src=\"script.js\"></script>",
            "style.css",
            "script.js",
            None,
        );
        assert_eq!(
            out,
            "<link href='style.min.css'><script src=\"script.min.js\"></script>"
        );
    }

    #[test]
    fn missing_head_close_is_a_warning() {
        let out = run(
            "<title>x</title><body></body>",
            &params(&[("SITE_DESCRIPTION", "d")]),
            false,
        );
        assert_eq!(out.warnings, vec![Warning::MissingHeadMarker]);
        assert!(!out.html.contains("description"));
    }

    #[test]
    fn schema_warnings_are_collected() {
        let out = run(PAGE, &params(&[("STRUCTURED_DATA_TYPE", "Recipe,Organization")]), false);
        assert_eq!(out.warnings.len(), 2);
        assert!(!out.html.contains("ld+json"));
    }

    #[test]
    fn minified_names() {
        assert_eq!(minified_name("style.css"), "style.min.css");
        assert_eq!(minified_name("js/app.js"), "js/app.min.js");
        assert_eq!(minified_name("v1.2/bundle"), "v1.2/bundle.min");
    }
}
