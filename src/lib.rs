//! # lp-build
//!
//! A build pipeline for single-page static landing sites. One HTML page, one
//! stylesheet, one script and an image directory go in; a deployable `dist/`
//! comes out.
//!
//! # Architecture: HTML Transformation Core + Stages
//!
//! The heart of the crate is a sequence of text-level rewrites applied to the
//! one HTML document:
//!
//! ```text
//! .env ──► SiteParams ──► tag generators ──► fragments
//!                                              │
//! index.html ──► title ──► inject before </head> ──► <img> → <picture> ──► asset refs ──► minify
//!                                              ▲
//! images/ ──► scan ──► dimension table + SP set
//! ```
//!
//! Around it sit the build stages, run in order by [`pipeline::build`]. Each
//! stage is independently fallible: a broken stylesheet fails the CSS stage
//! and nothing else.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared data: dimension table, SP-image set, fragments, warnings |
//! | [`site`] | `.env` loading into typed, all-optional [`site::SiteParams`] |
//! | [`config`] | `lp.toml` loading, merging over stock defaults, validation |
//! | [`html`] | Attribute escaping and the `<img>` attribute tokenizer |
//! | [`tags`] | Head fragment generators: meta/OGP, analytics, favicon, JSON-LD; conversion script |
//! | [`picture`] | `<img>` rewriter: dimensions, lazy loading, base path, `<picture>` |
//! | [`assemble`] | Document assembler driving the generators and the rewriter |
//! | [`scan`] | Image tree walk, SP-variant detection, dimension measurement |
//! | [`imaging`] | Pure-Rust image backend: identify, AVIF/WebP conversion, square icons |
//! | [`process`] | Image and favicon stages |
//! | [`minify`] | HTML, CSS and JS minification |
//! | [`pipeline`] | Whole-build orchestration and per-stage reporting |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Restricted Text Rewriting, Not a DOM
//!
//! Pages are hand-written, so everything outside a rewritten `<img>` tag must
//! come out byte-identical. Re-serializing a parsed tree would normalize
//! whitespace, quoting and attribute order across the whole document. Instead
//! the rewriter matches `<img>` and `<picture>` with regexes and tokenizes the
//! attributes of each matched tag.
//!
//! ## Campaign Parameters vs Build Settings
//!
//! Everything that differs per campaign (title, OGP image, tracking IDs,
//! structured data) lives in the flat `.env` file so marketing can edit it
//! without touching build settings. `lp.toml` only controls how the build
//! runs.
//!
//! ## Pure-Rust Imaging
//!
//! AVIF (rav1e) and WebP encoding go through the `image` crate, so the binary
//! has no system dependencies.

pub mod assemble;
pub mod config;
pub mod html;
pub mod imaging;
pub mod minify;
pub mod output;
pub mod picture;
pub mod pipeline;
pub mod process;
pub mod scan;
pub mod site;
pub mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
