//! Campaign parameters: `.env` loading and typed site parameters.
//!
//! Site and campaign values (title, tracking IDs, structured data fields, base
//! path) live in a flat `KEY=VALUE` file next to the project:
//!
//! ```text
//! SITE_TITLE="Spring Sale 2026"
//! SITE_URL=https://example.com/spring/
//! GA_MEASUREMENT_ID=G-XXXXXXX
//! STRUCTURED_DATA_TYPE=Event,FAQPage
//! BASE_PATH=/spring
//! ```
//!
//! The file is read once into an [`EnvMap`] and converted into
//! [`SiteParams`], where every value is optional. Blank values count as
//! absent. Generators never look keys up by name; they read typed fields and
//! the named fallback methods (`event_name()`, `organization_url()`, ...).
//!
//! A missing file is not an error: it yields an empty map and therefore an
//! empty [`SiteParams`]. Lines that are not `KEY=VALUE` and values that do not
//! parse (`OG_IMAGE_WIDTH=wide`) are dropped with a [`Warning`]; only an
//! unreadable file is an error.

use crate::types::Warning;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Flat string-keyed configuration as read from the env file.
pub type EnvMap = BTreeMap<String, String>;

/// Load an env file. Returns an empty map if the file does not exist.
pub fn load_env_file(path: &Path) -> Result<(EnvMap, Vec<Warning>), SiteError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse_env(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((EnvMap::new(), Vec::new())),
        Err(e) => Err(e.into()),
    }
}

/// Parse `KEY=VALUE` lines.
///
/// - `#` starts a comment line; blank lines are ignored
/// - an optional leading `export ` is accepted
/// - values may be double-quoted (with `\n`, `\"`, `\\` escapes), single-quoted
///   (literal), or bare (a ` #` starts a trailing comment)
/// - later keys override earlier ones
/// - any other line is skipped with [`Warning::EnvSyntax`]
pub fn parse_env(content: &str) -> (EnvMap, Vec<Warning>) {
    let mut map = EnvMap::new();
    let mut warnings = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                map.insert(key.trim().to_string(), parse_env_value(value.trim()));
            }
            _ => warnings.push(Warning::EnvSyntax {
                line: idx + 1,
                content: raw.to_string(),
            }),
        }
    }
    (map, warnings)
}

fn parse_env_value(value: &str) -> String {
    if let Some(inner) = value.strip_prefix('"').and_then(|v| v.rfind('"').map(|end| &v[..end])) {
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        }
        return out;
    }
    if let Some(inner) = value
        .strip_prefix('\'')
        .and_then(|v| v.rfind('\'').map(|end| &v[..end]))
    {
        return inner.to_string();
    }
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end().to_string(),
        None => value.to_string(),
    }
}

/// Open Graph settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OgParams {
    pub image_url: Option<String>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub og_type: Option<String>,
    pub site_name: Option<String>,
    pub locale: Option<String>,
}

/// Twitter Card settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwitterParams {
    pub card: Option<String>,
    pub site: Option<String>,
}

/// Tracking provider identifiers. Each provider is enabled by its own keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsParams {
    pub ga_measurement_id: Option<String>,
    pub google_ads_id: Option<String>,
    pub google_ads_conversion_label: Option<String>,
    pub meta_pixel_id: Option<String>,
    pub line_tag_id: Option<String>,
    pub yahoo_retargeting_id: Option<String>,
    pub yahoo_conversion_id: Option<String>,
    pub yahoo_conversion_label: Option<String>,
    pub clarity_project_id: Option<String>,
}

impl AnalyticsParams {
    /// True when at least one provider would emit a snippet.
    pub fn any_provider(&self) -> bool {
        self.ga_measurement_id.is_some()
            || self.meta_pixel_id.is_some()
            || self.line_tag_id.is_some()
            || self.yahoo_retargeting_id.is_some()
            || self.yahoo_conversion().is_some()
            || self.clarity_project_id.is_some()
    }

    /// Google Ads `send_to` target, when both the account and label are set.
    pub fn google_ads_send_to(&self) -> Option<String> {
        match (&self.google_ads_id, &self.google_ads_conversion_label) {
            (Some(id), Some(label)) => Some(format!("{id}/{label}")),
            _ => None,
        }
    }

    /// Yahoo conversion id and label, when both are set.
    pub fn yahoo_conversion(&self) -> Option<(&str, &str)> {
        match (&self.yahoo_conversion_id, &self.yahoo_conversion_label) {
            (Some(id), Some(label)) => Some((id.as_str(), label.as_str())),
            _ => None,
        }
    }
}

/// Optional behavior tracking appended to the conversion script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingParams {
    pub scroll_depth: bool,
    /// Seconds after load at which a time-on-page event fires; sorted, unique.
    pub time_on_page: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub online_url: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessParams {
    pub name: Option<String>,
    /// schema.org subtype such as `Restaurant`; defaults to `LocalBusiness`.
    pub business_type: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub opening_hours: Vec<String>,
    pub price_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationParams {
    pub name: Option<String>,
    pub url: Option<String>,
    pub logo: Option<String>,
    pub same_as: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredDataParams {
    /// Requested schema types, trimmed, in configured order.
    pub types: Vec<String>,
    pub event: EventParams,
    pub product: ProductParams,
    pub business: BusinessParams,
    pub organization: OrganizationParams,
}

/// Typed site parameters. Every value is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Sub-directory the page is deployed under (`/campaign`).
    pub base_path: Option<String>,
    pub og: OgParams,
    pub twitter: TwitterParams,
    pub analytics: AnalyticsParams,
    pub tracking: TrackingParams,
    pub structured_data: StructuredDataParams,
}

pub const DEFAULT_OG_IMAGE_WIDTH: u32 = 1200;
pub const DEFAULT_OG_IMAGE_HEIGHT: u32 = 630;
pub const DEFAULT_OG_TYPE: &str = "website";
pub const DEFAULT_OG_LOCALE: &str = "ja_JP";
pub const DEFAULT_TWITTER_CARD: &str = "summary_large_image";
pub const DEFAULT_CURRENCY: &str = "JPY";
pub const DEFAULT_COUNTRY: &str = "JP";

impl SiteParams {
    /// Build typed parameters from a flat map.
    ///
    /// A malformed number or boolean is treated as absent and reported as a
    /// [`Warning::InvalidEnvValue`].
    pub fn from_env(env: &EnvMap) -> (Self, Vec<Warning>) {
        let mut warnings = Vec::new();
        let get = |key: &str| -> Option<String> {
            env.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let params = Self {
            title: get("SITE_TITLE"),
            description: get("SITE_DESCRIPTION"),
            url: get("SITE_URL"),
            base_path: get("BASE_PATH"),
            og: OgParams {
                image_url: get("OG_IMAGE_URL"),
                image_width: parse_u32(env, "OG_IMAGE_WIDTH", &mut warnings),
                image_height: parse_u32(env, "OG_IMAGE_HEIGHT", &mut warnings),
                og_type: get("OG_TYPE"),
                site_name: get("OG_SITE_NAME"),
                locale: get("OG_LOCALE"),
            },
            twitter: TwitterParams {
                card: get("TWITTER_CARD"),
                site: get("TWITTER_SITE"),
            },
            analytics: AnalyticsParams {
                ga_measurement_id: get("GA_MEASUREMENT_ID"),
                google_ads_id: get("GOOGLE_ADS_ID"),
                google_ads_conversion_label: get("GOOGLE_ADS_CONVERSION_LABEL"),
                meta_pixel_id: get("META_PIXEL_ID"),
                line_tag_id: get("LINE_TAG_ID"),
                yahoo_retargeting_id: get("YAHOO_RETARGETING_ID"),
                yahoo_conversion_id: get("YAHOO_CONVERSION_ID"),
                yahoo_conversion_label: get("YAHOO_CONVERSION_LABEL"),
                clarity_project_id: get("CLARITY_PROJECT_ID"),
            },
            tracking: TrackingParams {
                scroll_depth: parse_bool(env, "SCROLL_DEPTH_TRACKING", &mut warnings).unwrap_or(false),
                time_on_page: parse_seconds(env, "TIME_ON_PAGE_THRESHOLDS", &mut warnings),
            },
            structured_data: StructuredDataParams {
                types: split_list(get("STRUCTURED_DATA_TYPE")),
                event: EventParams {
                    name: get("EVENT_NAME"),
                    description: get("EVENT_DESCRIPTION"),
                    start_date: get("EVENT_START_DATE"),
                    end_date: get("EVENT_END_DATE"),
                    location_name: get("EVENT_LOCATION_NAME"),
                    location_address: get("EVENT_LOCATION_ADDRESS"),
                    online_url: get("EVENT_ONLINE_URL"),
                    price: get("EVENT_PRICE"),
                    currency: get("EVENT_CURRENCY"),
                },
                product: ProductParams {
                    name: get("PRODUCT_NAME"),
                    description: get("PRODUCT_DESCRIPTION"),
                    brand: get("PRODUCT_BRAND"),
                    sku: get("PRODUCT_SKU"),
                    price: get("PRODUCT_PRICE"),
                    currency: get("PRODUCT_CURRENCY"),
                },
                business: BusinessParams {
                    name: get("BUSINESS_NAME"),
                    business_type: get("BUSINESS_TYPE"),
                    phone: get("BUSINESS_PHONE"),
                    street: get("BUSINESS_STREET"),
                    city: get("BUSINESS_CITY"),
                    region: get("BUSINESS_REGION"),
                    postal_code: get("BUSINESS_POSTAL_CODE"),
                    country: get("BUSINESS_COUNTRY"),
                    opening_hours: split_list(get("BUSINESS_OPENING_HOURS")),
                    price_range: get("BUSINESS_PRICE_RANGE"),
                },
                organization: OrganizationParams {
                    name: get("ORG_NAME"),
                    url: get("ORG_URL"),
                    logo: get("ORG_LOGO"),
                    same_as: split_list(get("ORG_SAME_AS")),
                },
            },
        };
        (params, warnings)
    }

    /// Normalized base path: trailing slash stripped, `None` when empty or `/`.
    pub fn path_prefix(&self) -> Option<&str> {
        self.base_path
            .as_deref()
            .map(|p| p.trim_end_matches('/'))
            .filter(|p| !p.is_empty())
    }

    pub fn og_image_width(&self) -> u32 {
        self.og.image_width.unwrap_or(DEFAULT_OG_IMAGE_WIDTH)
    }

    pub fn og_image_height(&self) -> u32 {
        self.og.image_height.unwrap_or(DEFAULT_OG_IMAGE_HEIGHT)
    }

    pub fn og_type(&self) -> &str {
        self.og.og_type.as_deref().unwrap_or(DEFAULT_OG_TYPE)
    }

    pub fn og_locale(&self) -> &str {
        self.og.locale.as_deref().unwrap_or(DEFAULT_OG_LOCALE)
    }

    pub fn twitter_card(&self) -> &str {
        self.twitter.card.as_deref().unwrap_or(DEFAULT_TWITTER_CARD)
    }

    /// `EVENT_NAME`, else `SITE_TITLE`.
    pub fn event_name(&self) -> Option<&str> {
        self.structured_data
            .event
            .name
            .as_deref()
            .or(self.title.as_deref())
    }

    /// `EVENT_DESCRIPTION`, else `SITE_DESCRIPTION`.
    pub fn event_description(&self) -> Option<&str> {
        self.structured_data
            .event
            .description
            .as_deref()
            .or(self.description.as_deref())
    }

    /// `PRODUCT_NAME`, else `SITE_TITLE`.
    pub fn product_name(&self) -> Option<&str> {
        self.structured_data
            .product
            .name
            .as_deref()
            .or(self.title.as_deref())
    }

    /// `PRODUCT_DESCRIPTION`, else `SITE_DESCRIPTION`.
    pub fn product_description(&self) -> Option<&str> {
        self.structured_data
            .product
            .description
            .as_deref()
            .or(self.description.as_deref())
    }

    /// `BUSINESS_NAME`, else `SITE_TITLE`.
    pub fn business_name(&self) -> Option<&str> {
        self.structured_data
            .business
            .name
            .as_deref()
            .or(self.title.as_deref())
    }

    /// `ORG_NAME`, else `OG_SITE_NAME`.
    pub fn organization_name(&self) -> Option<&str> {
        self.structured_data
            .organization
            .name
            .as_deref()
            .or(self.og.site_name.as_deref())
    }

    /// `ORG_URL`, else `SITE_URL`.
    pub fn organization_url(&self) -> Option<&str> {
        self.structured_data
            .organization
            .url
            .as_deref()
            .or(self.url.as_deref())
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn raw_value<'a>(env: &'a EnvMap, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn invalid(key: &str, value: &str, expected: &'static str) -> Warning {
    Warning::InvalidEnvValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse_u32(env: &EnvMap, key: &str, warnings: &mut Vec<Warning>) -> Option<u32> {
    let v = raw_value(env, key)?;
    match v.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            warnings.push(invalid(key, v, "a positive integer"));
            None
        }
    }
}

fn parse_bool(env: &EnvMap, key: &str, warnings: &mut Vec<Warning>) -> Option<bool> {
    let v = raw_value(env, key)?;
    match v.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warnings.push(invalid(key, v, "true or false"));
            None
        }
    }
}

/// Whole seconds, sorted and deduplicated. Entries that are not numbers are
/// dropped; the rest are kept.
fn parse_seconds(env: &EnvMap, key: &str, warnings: &mut Vec<Warning>) -> Vec<u32> {
    let Some(v) = raw_value(env, key) else {
        return Vec::new();
    };
    let mut seconds = Vec::new();
    for part in v.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match part.parse::<u32>() {
            Ok(n) => seconds.push(n),
            Err(_) => warnings.push(invalid(key, part, "comma-separated whole seconds")),
        }
    }
    seconds.sort_unstable();
    seconds.dedup();
    seconds
}

/// Returns a documented `.env` template listing every recognized key.
///
/// Used by the `gen-env` CLI command.
pub fn stock_env_template() -> &'static str {
    r#"# lp-build campaign parameters
# =============================
# Every key is optional. A generator whose keys are missing emits nothing.

# --- Page ------------------------------------------------------------------
# SITE_TITLE="Spring Sale"
# SITE_DESCRIPTION="Everything 30% off until April."
# SITE_URL=https://example.com/spring/
# Sub-directory the page is served from (images, css, js, favicons)
# BASE_PATH=/spring

# --- Open Graph / Twitter --------------------------------------------------
# OG_IMAGE_URL=https://example.com/spring/images/ogp.png
# OG_IMAGE_WIDTH=1200
# OG_IMAGE_HEIGHT=630
# OG_TYPE=website
# OG_SITE_NAME="Example Store"
# OG_LOCALE=ja_JP
# TWITTER_CARD=summary_large_image
# TWITTER_SITE=@example

# --- Analytics -------------------------------------------------------------
# GA_MEASUREMENT_ID=G-XXXXXXXXXX
# GOOGLE_ADS_ID=AW-XXXXXXXXX
# GOOGLE_ADS_CONVERSION_LABEL=AbCdEfGh
# META_PIXEL_ID=000000000000000
# LINE_TAG_ID=00000000-0000-0000-0000-000000000000
# YAHOO_RETARGETING_ID=XXXXXXXXXX
# YAHOO_CONVERSION_ID=0000000000
# YAHOO_CONVERSION_LABEL=XXXXXXXXXX
# CLARITY_PROJECT_ID=xxxxxxxxxx

# --- Behavior tracking (requires GA_MEASUREMENT_ID) ------------------------
# SCROLL_DEPTH_TRACKING=true
# TIME_ON_PAGE_THRESHOLDS=30,60,120

# --- Structured data -------------------------------------------------------
# Comma-separated: Event, Product, LocalBusiness, Organization, FAQPage
# STRUCTURED_DATA_TYPE=Organization,FAQPage
# EVENT_NAME= / EVENT_DESCRIPTION= / EVENT_START_DATE=2026-04-01T10:00+09:00
# EVENT_END_DATE= / EVENT_LOCATION_NAME= / EVENT_LOCATION_ADDRESS=
# EVENT_ONLINE_URL= / EVENT_PRICE= / EVENT_CURRENCY=JPY
# PRODUCT_NAME= / PRODUCT_DESCRIPTION= / PRODUCT_BRAND= / PRODUCT_SKU=
# PRODUCT_PRICE= / PRODUCT_CURRENCY=JPY
# BUSINESS_NAME= / BUSINESS_TYPE=LocalBusiness / BUSINESS_PHONE=
# BUSINESS_STREET= / BUSINESS_CITY= / BUSINESS_REGION= / BUSINESS_POSTAL_CODE=
# BUSINESS_COUNTRY=JP / BUSINESS_OPENING_HOURS="Mo-Fr 09:00-18:00"
# BUSINESS_PRICE_RANGE=
# ORG_NAME= / ORG_URL= / ORG_LOGO= / ORG_SAME_AS=https://x.com/example,https://instagram.com/example
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // =========================================================================
    // Env file parsing
    // =========================================================================

    #[test]
    fn parse_env_basic_forms() {
        let map = parse_env(
            r#"
# comment
SITE_TITLE="Spring \"Sale\""
export GA_MEASUREMENT_ID=G-123 # trailing comment
SITE_DESCRIPTION='literal \n kept'
EMPTY=
"#,
        )
        .0;
        assert_eq!(map["SITE_TITLE"], r#"Spring "Sale""#);
        assert_eq!(map["GA_MEASUREMENT_ID"], "G-123");
        assert_eq!(map["SITE_DESCRIPTION"], r"literal \n kept");
        assert_eq!(map["EMPTY"], "");
    }

    #[test]
    fn parse_env_later_keys_win() {
        let (map, _) = parse_env("A=1\nA=2\n");
        assert_eq!(map["A"], "2");
    }

    #[test]
    fn parse_env_skips_line_without_equals() {
        let (map, warnings) = parse_env("SITE_TITLE=ok\njust words\n=orphan\nGA_MEASUREMENT_ID=G-1\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map["GA_MEASUREMENT_ID"], "G-1");
        assert_eq!(
            warnings,
            vec![
                Warning::EnvSyntax {
                    line: 2,
                    content: "just words".into(),
                },
                Warning::EnvSyntax {
                    line: 3,
                    content: "=orphan".into(),
                },
            ]
        );
    }

    #[test]
    fn missing_env_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let (map, warnings) = load_env_file(&tmp.path().join(".env")).unwrap();
        assert!(warnings.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn load_env_file_reads_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        fs::write(&path, "SITE_TITLE=Hello\n").unwrap();
        let (map, _) = load_env_file(&path).unwrap();
        assert_eq!(map["SITE_TITLE"], "Hello");
    }

    // =========================================================================
    // Typed parameters
    // =========================================================================

    #[test]
    fn empty_env_gives_empty_params() {
        let params = SiteParams::from_env(&EnvMap::new()).0;
        assert_eq!(params, SiteParams::default());
        assert_eq!(params.og_image_width(), 1200);
        assert_eq!(params.og_image_height(), 630);
        assert_eq!(params.og_locale(), "ja_JP");
        assert_eq!(params.twitter_card(), "summary_large_image");
    }

    #[test]
    fn blank_values_are_absent() {
        let params = SiteParams::from_env(&env(&[("SITE_TITLE", "   ")])).0;
        assert_eq!(params.title, None);
    }

    #[test]
    fn path_prefix_normalization() {
        let with = |v: &str| SiteParams::from_env(&env(&[("BASE_PATH", v)])).0;
        assert_eq!(with("/lp/").path_prefix(), Some("/lp"));
        assert_eq!(with("/lp").path_prefix(), Some("/lp"));
        assert_eq!(with("/").path_prefix(), None);
        assert_eq!(SiteParams::default().path_prefix(), None);
    }

    #[test]
    fn structured_data_types_are_trimmed_list() {
        let params = SiteParams::from_env(&env(&[(
            "STRUCTURED_DATA_TYPE",
            " Event , ,faqpage ",
        )])).0;
        assert_eq!(params.structured_data.types, vec!["Event", "faqpage"]);
    }

    #[test]
    fn time_on_page_sorted_and_deduplicated() {
        let params =
            SiteParams::from_env(&env(&[("TIME_ON_PAGE_THRESHOLDS", "60, 30,60,120")])).0;
        assert_eq!(params.tracking.time_on_page, vec![30, 60, 120]);
    }

    #[test]
    fn invalid_values_are_dropped_with_warnings() {
        let (params, warnings) = SiteParams::from_env(&env(&[
            ("SITE_TITLE", "T"),
            ("OG_IMAGE_WIDTH", "1200px"),
            ("SCROLL_DEPTH_TRACKING", "maybe"),
            ("TIME_ON_PAGE_THRESHOLDS", "30s"),
        ]));
        assert_eq!(params.title.as_deref(), Some("T"));
        assert_eq!(params.og.image_width, None);
        assert_eq!(params.og_image_width(), 1200);
        assert!(!params.tracking.scroll_depth);
        assert!(params.tracking.time_on_page.is_empty());
        assert_eq!(warnings.len(), 3);
        assert_eq!(
            warnings[0],
            Warning::InvalidEnvValue {
                key: "OG_IMAGE_WIDTH".into(),
                value: "1200px".into(),
                expected: "a positive integer",
            }
        );
    }

    #[test]
    fn invalid_threshold_entries_do_not_drop_valid_ones() {
        let (params, warnings) =
            SiteParams::from_env(&env(&[("TIME_ON_PAGE_THRESHOLDS", "30,x,60")]));
        assert_eq!(params.tracking.time_on_page, vec![30, 60]);
        assert!(matches!(&warnings[..], [Warning::InvalidEnvValue { value, .. }] if value == "x"));
    }

    #[test]
    fn valid_env_has_no_warnings() {
        let (_, warnings) = SiteParams::from_env(&env(&[
            ("OG_IMAGE_WIDTH", "800"),
            ("SCROLL_DEPTH_TRACKING", "no"),
        ]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn scroll_depth_flag_forms() {
        for v in ["true", "1", "YES", "on"] {
            let p = SiteParams::from_env(&env(&[("SCROLL_DEPTH_TRACKING", v)])).0;
            assert!(p.tracking.scroll_depth, "{v} should enable");
        }
        let p = SiteParams::from_env(&env(&[("SCROLL_DEPTH_TRACKING", "off")])).0;
        assert!(!p.tracking.scroll_depth);
    }

    #[test]
    fn fallback_chains() {
        let params = SiteParams::from_env(&env(&[
            ("SITE_TITLE", "Site"),
            ("SITE_URL", "https://example.com"),
            ("OG_SITE_NAME", "Brand"),
            ("PRODUCT_NAME", "Widget"),
        ])).0;
        assert_eq!(params.event_name(), Some("Site"));
        assert_eq!(params.product_name(), Some("Widget"));
        assert_eq!(params.business_name(), Some("Site"));
        assert_eq!(params.organization_name(), Some("Brand"));
        assert_eq!(params.organization_url(), Some("https://example.com"));
    }

    #[test]
    fn ads_and_yahoo_conversion_need_both_keys() {
        let params = SiteParams::from_env(&env(&[
            ("GOOGLE_ADS_ID", "AW-1"),
            ("YAHOO_CONVERSION_ID", "123"),
        ])).0;
        assert_eq!(params.analytics.google_ads_send_to(), None);
        assert_eq!(params.analytics.yahoo_conversion(), None);
        assert!(!params.analytics.any_provider());

        let params = SiteParams::from_env(&env(&[
            ("GOOGLE_ADS_ID", "AW-1"),
            ("GOOGLE_ADS_CONVERSION_LABEL", "abc"),
        ])).0;
        assert_eq!(
            params.analytics.google_ads_send_to().as_deref(),
            Some("AW-1/abc")
        );
    }

    #[test]
    fn stock_env_template_parses() {
        let (map, warnings) = parse_env(stock_env_template());
        assert!(map.is_empty(), "template keys are all commented out");
        assert!(warnings.is_empty());
    }
}
