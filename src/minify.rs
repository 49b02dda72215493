//! HTML, CSS and JavaScript minification.
//!
//! | Input | Crate |
//! |---|---|
//! | HTML (incl. inline `<style>`/`<script>`) | `minify-html` |
//! | CSS | `lightningcss` |
//! | JavaScript | `oxc` (parse, compress, mangle, codegen) |
//!
//! Each minifier returns an error instead of passing broken input through;
//! the pipeline turns that into a failed stage.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("CSS error: {0}")]
    Css(String),
    #[error("JavaScript parse error: {0}")]
    Js(String),
    #[error("minified HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Minify a full HTML document.
///
/// Closing tags and the `<html>`/`<head>` opening tags are kept so the
/// document stays well-formed for crawlers reading the OGP tags.
pub fn minify_html(html: &str) -> Result<String, MinifyError> {
    let cfg = minify_html::Cfg {
        keep_closing_tags: true,
        keep_html_and_head_opening_tags: true,
        keep_comments: false,
        minify_css: true,
        minify_js: true,
        remove_bangs: true,
        remove_processing_instructions: true,
        ..minify_html::Cfg::new()
    };
    Ok(String::from_utf8(minify_html::minify(html.as_bytes(), &cfg))?)
}

/// Minify a stylesheet.
pub fn minify_css(source: &str) -> Result<String, MinifyError> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| MinifyError::Css(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| MinifyError::Css(e.to_string()))?;
    Ok(result.code)
}

/// Minify a classic (non-module) script.
///
/// Parsed as a script, not a module: the compressor keeps unreferenced
/// top-level declarations of a script and the mangler leaves top-level names
/// alone. Markup may call them from `onclick` handlers.
pub fn minify_js(source: &str) -> Result<String, MinifyError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(MinifyError::Js(messages.join("; ")));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_drops_comments_and_whitespace() {
        let html = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Hi</title>\n  </head>\n  <body>\n    <!-- note -->\n    <p>  Hello  </p>\n  </body>\n</html>\n";
        let out = minify_html(html).unwrap();
        assert!(!out.contains("note"));
        assert!(out.contains("<title>Hi</title>"));
        assert!(out.contains("<head>"));
        assert!(out.len() < html.len());
    }

    #[test]
    fn html_keeps_picture_markup() {
        let html = r#"<body><picture><source srcset="a.avif" type="image/avif"><img src="a.jpg" alt="x" width="10" height="5"></picture></body>"#;
        let out = minify_html(html).unwrap();
        assert!(out.contains("<picture>"));
        assert!(out.contains("a.avif"));
        assert!(out.contains("</picture>"));
    }

    #[test]
    fn css_is_compacted() {
        let css = "body {\n  color: #ff0000;\n  margin: 0px;\n}\n\n/* comment */\n.a { padding: 0 }\n";
        let out = minify_css(css).unwrap();
        assert!(!out.contains('\n'));
        assert!(!out.contains("comment"));
        assert!(out.contains("body{"));
        assert!(out.len() < css.len());
    }

    #[test]
    fn js_keeps_top_level_names() {
        let js = "function trackClick(label) {\n  var message = 'clicked: ' + label;\n  console.log(message);\n}\n";
        let out = minify_js(js).unwrap();
        assert!(out.contains("trackClick"));
        assert!(!out.contains("message"));
        assert!(out.len() < js.len());
    }

    #[test]
    fn js_keeps_unreferenced_top_level_declarations() {
        let js = "function openModal() { document.body.classList.add('open'); }\nvar campaignId = 'spring';\nconst labels = ['a', 'b'];\n";
        let out = minify_js(js).unwrap();
        assert!(out.contains("function openModal("), "{out}");
        assert!(out.contains("campaignId"), "{out}");
        assert!(out.contains("labels"), "{out}");
    }

    #[test]
    fn js_syntax_error_is_reported() {
        let err = minify_js("function (").unwrap_err();
        assert!(matches!(err, MinifyError::Js(_)));
    }

    #[test]
    fn empty_inputs_are_fine() {
        assert_eq!(minify_js("").unwrap(), "");
        assert_eq!(minify_css("").unwrap(), "");
    }
}
