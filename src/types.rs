//! Shared types used across the build stages.
//!
//! The scan stage produces the [`DimensionTable`] and [`SpImageSet`]; the
//! assembler and the image tag rewriter only read them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Mapping from image path to pixel dimensions.
///
/// Keys are whatever the producer recorded (`images/hero.jpg`,
/// `src/images/hero.jpg`, ...). Lookups are tolerant of prefix differences:
/// a key matches when it *ends with* the requested relative path.
///
/// Serialized as a plain JSON object: `{"images/hero.jpg": {"width": 1200, "height": 800}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionTable(BTreeMap<String, Dimensions>);

impl DimensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, dimensions: Dimensions) {
        self.0.insert(path.into(), dimensions);
    }

    /// Find the dimensions recorded for `rel_path`.
    ///
    /// Among all keys ending with `rel_path` the shortest key wins; keys of
    /// equal length resolve in lexicographic order. An exact key therefore
    /// always beats a longer prefixed one.
    pub fn lookup(&self, rel_path: &str) -> Option<Dimensions> {
        if rel_path.is_empty() {
            return None;
        }
        self.0
            .iter()
            .filter(|(key, _)| key.ends_with(rel_path))
            .min_by_key(|(key, _)| key.len())
            .map(|(_, dims)| *dims)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Dimensions)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Dimensions)> for DimensionTable {
    fn from_iter<I: IntoIterator<Item = (String, Dimensions)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Relative paths (PC-side names) of images that have a `-sp` sibling.
///
/// `images/banner-sp.jpg` on disk is recorded as `images/banner.jpg`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpImageSet(BTreeSet<String>);

impl SpImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pc_path: impl Into<String>) {
        self.0.insert(pc_path.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for SpImageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Which generator produced a head fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Meta,
    Analytics,
    Favicon,
    StructuredData,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FragmentKind::Meta => "meta/ogp",
            FragmentKind::Analytics => "analytics",
            FragmentKind::Favicon => "favicon",
            FragmentKind::StructuredData => "structured data",
        };
        f.write_str(name)
    }
}

/// A self-contained HTML fragment destined for `<head>` injection.
///
/// An empty `html` means the generator had insufficient configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub html: String,
}

impl Fragment {
    pub fn new(kind: FragmentKind, html: impl Into<String>) -> Self {
        Self {
            kind,
            html: html.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty()
    }
}

/// Head fragments in injection order.
pub type Fragments = Vec<Fragment>;

/// Non-fatal diagnostic produced while assembling the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// `STRUCTURED_DATA_TYPE` named a type we do not know.
    UnknownSchemaType(String),
    /// A known structured-data type whose required fields are missing.
    SchemaSkipped { schema: String, reason: String },
    /// The document has no literal `</head>`; fragments were not injected.
    MissingHeadMarker,
    /// An image could not be measured during scanning.
    UnreadableImage { path: String, reason: String },
    /// An env file line that is not `KEY=VALUE`; it was skipped.
    EnvSyntax { line: usize, content: String },
    /// An env value that does not parse; the key is treated as absent.
    InvalidEnvValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownSchemaType(name) => {
                write!(f, "unknown structured data type '{name}', skipped")
            }
            Warning::SchemaSkipped { schema, reason } => {
                write!(f, "structured data {schema} skipped: {reason}")
            }
            Warning::MissingHeadMarker => {
                f.write_str("no </head> in document, head fragments not injected")
            }
            Warning::UnreadableImage { path, reason } => {
                write!(f, "could not read dimensions of {path}: {reason}")
            }
            Warning::EnvSyntax { line, content } => {
                write!(f, "env line {line} ignored, expected KEY=VALUE: '{content}'")
            }
            Warning::InvalidEnvValue {
                key,
                value,
                expected,
            } => write!(f, "{key}='{value}' ignored, expected {expected}"),
        }
    }
}
