//! Head fragment generators.
//!
//! Each generator is a pure function of [`SiteParams`](crate::site::SiteParams)
//! (structured data also reads the assembled page) and returns an HTML string.
//! An empty string means "not enough configuration"; the assembler skips it.
//!
//! | Generator | Output |
//! |-----------|--------|
//! | [`meta::meta_tags`] | description, canonical, Open Graph, Twitter Card |
//! | [`analytics::analytics_tags`] | provider bootstrap snippets |
//! | [`favicon::favicon_tags`] | `<link>` tags for the generated icon set |
//! | [`structured_data::structured_data`] | JSON-LD `<script>` blocks |
//! | [`conversion::conversion_script`] | click/scroll/time tracking JS (goes into the script bundle, not `<head>`) |

pub mod analytics;
pub mod conversion;
pub mod favicon;
pub mod meta;
pub mod structured_data;

use maud::Markup;

/// Join rendered tags one per line.
pub(crate) fn join_lines(tags: impl IntoIterator<Item = Markup>) -> String {
    tags.into_iter()
        .map(Markup::into_string)
        .collect::<Vec<_>>()
        .join("\n")
}
