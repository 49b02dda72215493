//! Tracking provider bootstrap snippets.
//!
//! Five providers, each enabled by its own identifier and rendered in a fixed
//! order: Google tag (GA4, plus Google Ads when configured), Meta Pixel, LINE
//! Tag, Yahoo! retargeting, Microsoft Clarity. Identifiers are interpolated as
//! JS string literals, never raw.

use crate::html::{escape_attr, js_string};
use crate::site::AnalyticsParams;

/// Render every configured provider's snippet, blank-line separated.
pub fn analytics_tags(analytics: &AnalyticsParams) -> String {
    let blocks: Vec<String> = [
        analytics.ga_measurement_id.as_deref().map(|id| {
            google_tag(id, analytics.google_ads_id.as_deref())
        }),
        analytics.meta_pixel_id.as_deref().map(meta_pixel),
        analytics.line_tag_id.as_deref().map(line_tag),
        analytics.yahoo_retargeting_id.as_deref().map(yahoo_retargeting),
        analytics.clarity_project_id.as_deref().map(clarity),
    ]
    .into_iter()
    .flatten()
    .collect();

    blocks.join("\n")
}

fn google_tag(measurement_id: &str, ads_id: Option<&str>) -> String {
    let ads_config = ads_id
        .map(|ads| format!("\ngtag('config', {});", js_string(ads)))
        .unwrap_or_default();
    format!(
        r#"<script async src="https://www.googletagmanager.com/gtag/js?id={src_id}"></script>
<script>
window.dataLayer = window.dataLayer || [];
function gtag(){{dataLayer.push(arguments);}}
gtag('js', new Date());
gtag('config', {id});{ads_config}
</script>"#,
        src_id = escape_attr(measurement_id),
        id = js_string(measurement_id),
    )
}

fn meta_pixel(pixel_id: &str) -> String {
    // The usual <noscript><img> beacon is left out: the image rewriter would
    // count it as the page's first image.
    format!(
        r#"<script>
!function(f,b,e,v,n,t,s){{if(f.fbq)return;n=f.fbq=function(){{n.callMethod?
n.callMethod.apply(n,arguments):n.queue.push(arguments)}};
if(!f._fbq)f._fbq=n;n.push=n;n.loaded=!0;n.version='2.0';
n.queue=[];t=b.createElement(e);t.async=!0;
t.src=v;s=b.getElementsByTagName(e)[0];
s.parentNode.insertBefore(t,s)}}(window, document,'script',
'https://connect.facebook.net/en_US/fbevents.js');
fbq('init', {id});
fbq('track', 'PageView');
</script>"#,
        id = js_string(pixel_id),
    )
}

fn line_tag(tag_id: &str) -> String {
    format!(
        r#"<script>
(function(g,d,o){{
g._ltq=g._ltq||[];g._lt=g._lt||function(){{g._ltq.push(arguments)}};
var h=location.protocol==='https:'?'https://d.line-scdn.net':'http://d.line-cdn.net';
var s=d.createElement('script');s.async=1;
s.src=o||h+'/n/line_tag/public/release/v1/lt.js';
var t=d.getElementsByTagName('script')[0];t.parentNode.insertBefore(s,t);
}})(window, document);
_lt('init', {{customerType: 'lap', tagId: {id}}});
_lt('send', 'pv', [{id}]);
</script>"#,
        id = js_string(tag_id),
    )
}

fn yahoo_retargeting(retargeting_id: &str) -> String {
    let config = serde_json::json!({
        "type": "yjad_retargeting",
        "config": {
            "yahoo_retargeting_id": retargeting_id,
            "yahoo_sstag_custom_params": {},
        },
    });
    format!(
        r#"<script async src="https://s.yimg.jp/images/listing/tool/cv/ytag.js"></script>
<script>
window.yjDataLayer = window.yjDataLayer || [];
function ytag() {{ yjDataLayer.push(arguments); }}
ytag({config});
</script>"#,
        config = config.to_string().replace("</", "<\\/"),
    )
}

fn clarity(project_id: &str) -> String {
    format!(
        r#"<script>
(function(c,l,a,r,i,t,y){{
c[a]=c[a]||function(){{(c[a].q=c[a].q||[]).push(arguments)}};
t=l.createElement(r);t.async=1;t.src="https://www.clarity.ms/tag/"+i;
y=l.getElementsByTagName(r)[0];y.parentNode.insertBefore(t,y);
}})(window, document, "clarity", "script", {id});
</script>"#,
        id = js_string(project_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_providers() -> AnalyticsParams {
        AnalyticsParams {
            ga_measurement_id: Some("G-TEST".into()),
            google_ads_id: Some("AW-111".into()),
            google_ads_conversion_label: Some("lbl".into()),
            meta_pixel_id: Some("999".into()),
            line_tag_id: Some("line-uuid".into()),
            yahoo_retargeting_id: Some("YRT".into()),
            yahoo_conversion_id: None,
            yahoo_conversion_label: None,
            clarity_project_id: Some("clar".into()),
        }
    }

    #[test]
    fn no_identifiers_no_output() {
        assert_eq!(analytics_tags(&AnalyticsParams::default()), "");
    }

    #[test]
    fn providers_render_in_fixed_order() {
        let out = analytics_tags(&all_providers());
        let positions: Vec<usize> = [
            "googletagmanager.com",
            "fbevents.js",
            "line_tag",
            "yjad_retargeting",
            "clarity.ms",
        ]
        .iter()
        .map(|needle| out.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn google_ads_adds_second_config() {
        let out = analytics_tags(&all_providers());
        assert!(out.contains(r#"gtag('config', "G-TEST");"#));
        assert!(out.contains(r#"gtag('config', "AW-111");"#));
        assert!(out.contains("gtag/js?id=G-TEST"));
    }

    #[test]
    fn single_provider_suppresses_others() {
        let analytics = AnalyticsParams {
            clarity_project_id: Some("abc".into()),
            ..Default::default()
        };
        let out = analytics_tags(&analytics);
        assert!(out.contains(r#""script", "abc");"#));
        assert!(!out.contains("gtag"));
        assert!(!out.contains("fbq"));
        assert!(!out.contains("_lt("));
        assert!(!out.contains("ytag"));
    }

    #[test]
    fn ads_without_ga_renders_nothing() {
        let analytics = AnalyticsParams {
            google_ads_id: Some("AW-1".into()),
            ..Default::default()
        };
        assert_eq!(analytics_tags(&analytics), "");
    }

    #[test]
    fn hostile_identifier_cannot_break_out() {
        let analytics = AnalyticsParams {
            meta_pixel_id: Some("1');alert(1);</script><script>('".into()),
            ..Default::default()
        };
        let out = analytics_tags(&analytics);
        assert_eq!(out.matches("</script>").count(), 1);
        assert!(!out.contains("fbq('init', '1')"));
    }

    #[test]
    fn yahoo_config_is_json() {
        let out = analytics_tags(&AnalyticsParams {
            yahoo_retargeting_id: Some("ABC".into()),
            ..Default::default()
        });
        assert!(out.contains(r#""yahoo_retargeting_id":"ABC""#));
        assert!(out.contains("ytag.js"));
    }
}
