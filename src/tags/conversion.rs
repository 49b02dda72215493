//! Conversion tracking script.
//!
//! Produces one self-invoking script appended to the JS bundle. Clicking any
//! element with a `data-conversion` attribute reports the attribute value and
//! the element text to every configured provider. Each provider call is
//! guarded with `typeof fn === 'function'` so a blocked tracker never throws.
//!
//! When GA is configured two optional behaviors are added:
//! - scroll depth: fires once each at 25/50/75/90 percent
//! - time on page: fires once at each configured second, polled every second

use crate::html::js_string;
use crate::site::SiteParams;

const SCROLL_MARKS: [u32; 4] = [25, 50, 75, 90];

/// Build the conversion script, or an empty string when nothing is configured.
pub fn conversion_script(params: &SiteParams) -> String {
    let analytics = &params.analytics;
    if !analytics.any_provider() {
        return String::new();
    }

    let mut branches = Vec::new();
    if analytics.ga_measurement_id.is_some() {
        let ads = analytics
            .google_ads_send_to()
            .map(|send_to| {
                format!(
                    "\n        gtag('event', 'conversion', {{ send_to: {} }});",
                    js_string(&send_to)
                )
            })
            .unwrap_or_default();
        branches.push(format!(
            "      if (typeof gtag === 'function') {{
        gtag('event', name, {{ event_category: 'conversion', event_label: label }});{ads}
      }}"
        ));
    }
    if analytics.meta_pixel_id.is_some() {
        branches.push(
            "      if (typeof fbq === 'function') {
        fbq('trackCustom', name, { label: label });
      }"
            .to_string(),
        );
    }
    if let Some(tag_id) = analytics.line_tag_id.as_deref() {
        branches.push(format!(
            "      if (typeof _lt === 'function') {{
        _lt('send', 'cv', {{ type: name }}, [{}]);
      }}",
            js_string(tag_id)
        ));
    }
    if let Some((id, label)) = analytics.yahoo_conversion() {
        branches.push(format!(
            "      if (typeof ytag === 'function') {{
        ytag({{ type: 'yss_conversion', config: {{ yahoo_conversion_id: {}, yahoo_conversion_label: {}, yahoo_conversion_value: '0' }} }});
      }}",
            js_string(id),
            js_string(label)
        ));
    }
    if analytics.clarity_project_id.is_some() {
        branches.push(
            "      if (typeof clarity === 'function') {
        clarity('event', name);
      }"
            .to_string(),
        );
    }

    let mut sections = Vec::new();
    if !branches.is_empty() {
        sections.push(format!(
            "  document.querySelectorAll('[data-conversion]').forEach(function (el) {{
    el.addEventListener('click', function () {{
      var name = el.getAttribute('data-conversion') || 'conversion';
      var label = (el.textContent || '').trim();
{}
    }});
  }});",
            branches.join("\n")
        ));
    }

    let ga = analytics.ga_measurement_id.is_some();
    if ga && params.tracking.scroll_depth {
        sections.push(scroll_depth());
    }
    if ga && !params.tracking.time_on_page.is_empty() {
        sections.push(time_on_page(&params.tracking.time_on_page));
    }

    if sections.is_empty() {
        return String::new();
    }
    format!(
        "(function () {{\n  'use strict';\n{}\n}})();\n",
        sections.join("\n")
    )
}

fn number_list(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn scroll_depth() -> String {
    format!(
        "  var scrollMarks = [{}];
  var scrollFired = {{}};
  window.addEventListener('scroll', function () {{
    var doc = document.documentElement;
    var max = doc.scrollHeight - window.innerHeight;
    if (max <= 0) return;
    var pct = ((window.scrollY || doc.scrollTop) / max) * 100;
    scrollMarks.forEach(function (mark) {{
      if (pct >= mark && !scrollFired[mark]) {{
        scrollFired[mark] = true;
        if (typeof gtag === 'function') {{
          gtag('event', 'scroll_depth', {{ percent_scrolled: mark }});
        }}
      }}
    }});
  }}, {{ passive: true }});",
        number_list(&SCROLL_MARKS)
    )
}

fn time_on_page(seconds: &[u32]) -> String {
    format!(
        "  var timeMarks = [{}];
  var timeFired = {{}};
  var startedAt = Date.now();
  var timer = setInterval(function () {{
    var elapsed = (Date.now() - startedAt) / 1000;
    timeMarks.forEach(function (mark) {{
      if (elapsed >= mark && !timeFired[mark]) {{
        timeFired[mark] = true;
        if (typeof gtag === 'function') {{
          gtag('event', 'time_on_page', {{ seconds: mark }});
        }}
      }}
    }});
    if (timeMarks.every(function (mark) {{ return timeFired[mark]; }})) {{
      clearInterval(timer);
    }}
  }}, 1000);",
        number_list(seconds)
    )
}
