//! Meta, Open Graph and Twitter Card tags.

use super::join_lines;
use crate::html::escape_attr;
use crate::site::SiteParams;
use maud::{Markup, PreEscaped, html};

fn named(name: &str, value: &str) -> Markup {
    html! { meta name=(name) content=(PreEscaped(escape_attr(value))); }
}

fn property(property: &str, value: &str) -> Markup {
    html! { meta property=(property) content=(PreEscaped(escape_attr(value))); }
}

/// Render the meta/OGP/Twitter fragment.
///
/// `og:type`, `og:locale` and `twitter:card` fall back to defaults whenever
/// any campaign value is set. A completely unconfigured page gets nothing.
pub fn meta_tags(params: &SiteParams) -> String {
    if *params == SiteParams::default() {
        return String::new();
    }

    let title = params.title.as_deref();
    let description = params.description.as_deref();
    let url = params.url.as_deref();
    let image = params.og.image_url.as_deref();

    let mut tags = Vec::new();

    if let Some(description) = description {
        tags.push(named("description", description));
    }
    if let Some(url) = url {
        tags.push(html! { link rel="canonical" href=(PreEscaped(escape_attr(url))); });
    }

    tags.push(property("og:type", params.og_type()));
    if let Some(title) = title {
        tags.push(property("og:title", title));
    }
    if let Some(description) = description {
        tags.push(property("og:description", description));
    }
    if let Some(url) = url {
        tags.push(property("og:url", url));
    }
    if let Some(image) = image {
        tags.push(property("og:image", image));
        tags.push(property("og:image:width", &params.og_image_width().to_string()));
        tags.push(property("og:image:height", &params.og_image_height().to_string()));
    }
    if let Some(site_name) = params.og.site_name.as_deref() {
        tags.push(property("og:site_name", site_name));
    }
    tags.push(property("og:locale", params.og_locale()));

    tags.push(named("twitter:card", params.twitter_card()));
    if let Some(site) = params.twitter.site.as_deref() {
        tags.push(named("twitter:site", site));
    }
    if let Some(title) = title {
        tags.push(named("twitter:title", title));
    }
    if let Some(description) = description {
        tags.push(named("twitter:description", description));
    }
    if let Some(image) = image {
        tags.push(named("twitter:image", image));
    }

    join_lines(tags)
}
