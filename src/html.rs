//! Small HTML text helpers.
//!
//! The build only ever rewrites a restricted, known-shape document, so these
//! helpers work on text: attribute escaping, a tokenizer for the attribute
//! list of a single tag, and tag stripping for extracted snippets.

use std::borrow::Cow;
use std::ops::Range;

/// Escape a value for use inside a double-quoted attribute or text node.
///
/// Escapes `&`, `<`, `>`, `"` and `'`. Borrows when nothing needs escaping.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode the handful of entities [`escape_attr`] produces, plus `&apos;` and `&nbsp;`.
pub fn unescape_basic(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&apos;", "'")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&"),
    )
}

/// Join a served path onto the base-path prefix (`/lp` + `x.png` → `/lp/x.png`).
pub fn with_prefix(prefix: Option<&str>, path: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}/{path}"),
        None => path.to_string(),
    }
}

/// Render `s` as a JavaScript string literal safe to embed in a `<script>` block.
pub fn js_string(s: &str) -> String {
    // A JSON string is a valid JS string literal; only `</` needs breaking up.
    serde_json::Value::from(s).to_string().replace("</", "<\\/")
}

/// Remove tags and collapse runs of whitespace into single spaces.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    /// Raw (still escaped) value; `None` for boolean attributes.
    pub value: Option<&'a str>,
    /// Quote character around the value, if any.
    pub quote: Option<char>,
    /// Byte range of the value within the tokenized text.
    pub value_span: Option<Range<usize>>,
}

impl Attribute<'_> {
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Tokenize the attribute text of a start tag (everything between the tag
/// name and the closing `>`).
///
/// Handles `name`, `name=value`, `name="value"` and `name='value'`. A stray
/// `/` (self-closing syntax) is skipped.
pub fn parse_attributes(text: &str) -> Vec<Attribute<'_>> {
    let bytes = text.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = &text[name_start..i];
        if name.is_empty() {
            // lone '=' or '>' in malformed markup
            i += 1;
            continue;
        }

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'=' {
            attrs.push(Attribute {
                name,
                value: None,
                quote: None,
                value_span: None,
            });
            continue;
        }

        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        if j < bytes.len() && (bytes[j] == b'"' || bytes[j] == b'\'') {
            let quote = bytes[j];
            let start = j + 1;
            let end = text[start..]
                .find(quote as char)
                .map_or(text.len(), |off| start + off);
            attrs.push(Attribute {
                name,
                value: Some(&text[start..end]),
                quote: Some(quote as char),
                value_span: Some(start..end),
            });
            i = (end + 1).min(text.len());
        } else {
            let start = j;
            let mut end = j;
            while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'>' {
                end += 1;
            }
            attrs.push(Attribute {
                name,
                value: Some(&text[start..end]),
                quote: None,
                value_span: Some(start..end),
            });
            i = end;
        }
    }

    attrs
}
