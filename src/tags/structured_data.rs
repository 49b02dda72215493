//! JSON-LD structured data.
//!
//! `STRUCTURED_DATA_TYPE` lists schema.org types (case-insensitive). Each is
//! resolved on its own: an unknown name or a type whose required fields are
//! missing is skipped with a [`Warning`], and the rest still render.
//!
//! FAQPage reads the page instead of the configuration: every
//! `<details><summary>Q</summary><p>A</p>` block becomes one question.

use crate::html::{strip_tags, unescape_basic};
use crate::site::SiteParams;
use crate::types::Warning;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DETAILS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<details\b[^>]*>(.*?)</details>").unwrap());

/// Matched against the inside of one `<details>` block only.
static FAQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\A\s*<summary\b[^>]*>(.*?)</summary>\s*<p\b[^>]*>(.*?)</p>").unwrap()
});

const SCHEMA_CONTEXT: &str = "https://schema.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Event,
    Product,
    LocalBusiness,
    Organization,
    FaqPage,
}

impl SchemaType {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::Event => "Event",
            SchemaType::Product => "Product",
            SchemaType::LocalBusiness => "LocalBusiness",
            SchemaType::Organization => "Organization",
            SchemaType::FaqPage => "FAQPage",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event" => Ok(SchemaType::Event),
            "product" => Ok(SchemaType::Product),
            "localbusiness" => Ok(SchemaType::LocalBusiness),
            "organization" => Ok(SchemaType::Organization),
            "faqpage" => Ok(SchemaType::FaqPage),
            _ => Err(()),
        }
    }
}

/// One question/answer pair found in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Extract FAQ pairs from `<details>` blocks whose `<summary>` is directly
/// followed by a single `<p>`. Richer answers (lists, several paragraphs)
/// are not recognized.
pub fn extract_faq(html: &str) -> Vec<FaqEntry> {
    DETAILS_RE
        .captures_iter(html)
        .filter_map(|block| FAQ_RE.captures(block.get(1)?.as_str()))
        .filter_map(|caps| {
            let question = unescape_basic(&strip_tags(&caps[1])).into_owned();
            let answer = unescape_basic(&strip_tags(&caps[2])).into_owned();
            (!question.is_empty() && !answer.is_empty()).then_some(FaqEntry { question, answer })
        })
        .collect()
}

/// Render one `<script type="application/ld+json">` per resolvable type, in
/// configured order, plus a warning for each skipped type.
pub fn structured_data(params: &SiteParams, html: &str) -> (String, Vec<Warning>) {
    let mut scripts = Vec::new();
    let mut warnings = Vec::new();

    for name in &params.structured_data.types {
        let Ok(schema) = name.parse::<SchemaType>() else {
            warnings.push(Warning::UnknownSchemaType(name.clone()));
            continue;
        };
        match build_schema(schema, params, html) {
            Ok(value) => scripts.push(ld_json_script(&value)),
            Err(reason) => warnings.push(Warning::SchemaSkipped {
                schema: schema.to_string(),
                reason: reason.to_string(),
            }),
        }
    }

    (scripts.join("\n"), warnings)
}

fn ld_json_script(value: &Value) -> String {
    let payload = value.to_string().replace("</", "<\\/");
    format!(r#"<script type="application/ld+json">{payload}</script>"#)
}

fn build_schema(schema: SchemaType, params: &SiteParams, html: &str) -> Result<Value, &'static str> {
    match schema {
        SchemaType::Event => event(params),
        SchemaType::Product => product(params),
        SchemaType::LocalBusiness => local_business(params),
        SchemaType::Organization => organization(params),
        SchemaType::FaqPage => faq_page(html),
    }
}

/// Start an object with `@context` and `@type`.
fn object(schema_type: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("@context".into(), SCHEMA_CONTEXT.into());
    map.insert("@type".into(), schema_type.into());
    map
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.into(), value.into());
    }
}

fn offer(price: &str, currency: Option<&str>, url: Option<&str>) -> Value {
    let mut offer = Map::new();
    offer.insert("@type".into(), "Offer".into());
    offer.insert("price".into(), price.into());
    offer.insert(
        "priceCurrency".into(),
        currency.unwrap_or(crate::site::DEFAULT_CURRENCY).into(),
    );
    put(&mut offer, "url", url);
    Value::Object(offer)
}

fn event(params: &SiteParams) -> Result<Value, &'static str> {
    let event = &params.structured_data.event;
    let name = params
        .event_name()
        .ok_or("EVENT_NAME or SITE_TITLE is required")?;
    let start = event
        .start_date
        .as_deref()
        .ok_or("EVENT_START_DATE is required")?;

    let mut map = object("Event");
    map.insert("name".into(), name.into());
    map.insert("startDate".into(), start.into());
    put(&mut map, "endDate", event.end_date.as_deref());
    put(&mut map, "description", params.event_description());
    put(&mut map, "image", params.og.image_url.as_deref());
    put(&mut map, "url", params.url.as_deref());

    let mut locations = Vec::new();
    if event.location_name.is_some() || event.location_address.is_some() {
        let mut place = Map::new();
        place.insert("@type".into(), "Place".into());
        put(&mut place, "name", event.location_name.as_deref());
        put(&mut place, "address", event.location_address.as_deref());
        locations.push(Value::Object(place));
    }
    if let Some(online) = event.online_url.as_deref() {
        locations.push(json!({ "@type": "VirtualLocation", "url": online }));
    }
    let mode = match (locations.len(), event.online_url.is_some()) {
        (2, _) => Some("MixedEventAttendanceMode"),
        (1, true) => Some("OnlineEventAttendanceMode"),
        (1, false) => Some("OfflineEventAttendanceMode"),
        _ => None,
    };
    if let Some(mode) = mode {
        map.insert(
            "eventAttendanceMode".into(),
            format!("{SCHEMA_CONTEXT}/{mode}").into(),
        );
    }
    match locations.len() {
        0 => {}
        1 => {
            map.insert("location".into(), locations.remove(0));
        }
        _ => {
            map.insert("location".into(), Value::Array(locations));
        }
    }

    if let Some(price) = event.price.as_deref() {
        map.insert(
            "offers".into(),
            offer(price, event.currency.as_deref(), params.url.as_deref()),
        );
    }
    Ok(Value::Object(map))
}

fn product(params: &SiteParams) -> Result<Value, &'static str> {
    let product = &params.structured_data.product;
    let name = params
        .product_name()
        .ok_or("PRODUCT_NAME or SITE_TITLE is required")?;

    let mut map = object("Product");
    map.insert("name".into(), name.into());
    put(&mut map, "description", params.product_description());
    put(&mut map, "image", params.og.image_url.as_deref());
    put(&mut map, "sku", product.sku.as_deref());
    if let Some(brand) = product.brand.as_deref() {
        map.insert("brand".into(), json!({ "@type": "Brand", "name": brand }));
    }
    if let Some(price) = product.price.as_deref() {
        map.insert(
            "offers".into(),
            offer(price, product.currency.as_deref(), params.url.as_deref()),
        );
    }
    Ok(Value::Object(map))
}

fn local_business(params: &SiteParams) -> Result<Value, &'static str> {
    let business = &params.structured_data.business;
    let name = params
        .business_name()
        .ok_or("BUSINESS_NAME or SITE_TITLE is required")?;

    let mut map = object(business.business_type.as_deref().unwrap_or("LocalBusiness"));
    map.insert("name".into(), name.into());
    put(&mut map, "description", params.description.as_deref());
    put(&mut map, "url", params.url.as_deref());
    put(&mut map, "image", params.og.image_url.as_deref());
    put(&mut map, "telephone", business.phone.as_deref());
    put(&mut map, "priceRange", business.price_range.as_deref());
    if !business.opening_hours.is_empty() {
        map.insert("openingHours".into(), business.opening_hours.clone().into());
    }

    if let (Some(street), Some(city)) = (business.street.as_deref(), business.city.as_deref()) {
        let mut address = Map::new();
        address.insert("@type".into(), "PostalAddress".into());
        address.insert("streetAddress".into(), street.into());
        address.insert("addressLocality".into(), city.into());
        put(&mut address, "addressRegion", business.region.as_deref());
        put(&mut address, "postalCode", business.postal_code.as_deref());
        address.insert(
            "addressCountry".into(),
            business
                .country
                .as_deref()
                .unwrap_or(crate::site::DEFAULT_COUNTRY)
                .into(),
        );
        map.insert("address".into(), Value::Object(address));
    }
    Ok(Value::Object(map))
}

fn organization(params: &SiteParams) -> Result<Value, &'static str> {
    let org = &params.structured_data.organization;
    let name = params
        .organization_name()
        .ok_or("ORG_NAME or OG_SITE_NAME is required")?;
    let url = params
        .organization_url()
        .ok_or("ORG_URL or SITE_URL is required")?;

    let mut map = object("Organization");
    map.insert("name".into(), name.into());
    map.insert("url".into(), url.into());
    put(&mut map, "logo", org.logo.as_deref());
    if !org.same_as.is_empty() {
        map.insert("sameAs".into(), org.same_as.clone().into());
    }
    Ok(Value::Object(map))
}

fn faq_page(html: &str) -> Result<Value, &'static str> {
    let entries = extract_faq(html);
    if entries.is_empty() {
        return Err("no <details><summary>/<p> pairs found in the page");
    }
    let questions: Vec<Value> = entries
        .into_iter()
        .map(|entry| {
            json!({
                "@type": "Question",
                "name": entry.question,
                "acceptedAnswer": { "@type": "Answer", "text": entry.answer },
            })
        })
        .collect();

    let mut map = object("FAQPage");
    map.insert("mainEntity".into(), Value::Array(questions));
    Ok(Value::Object(map))
}
