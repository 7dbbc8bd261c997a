//! Server-side rendering of the status page.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::models::{StatusClass, StatusRecord};

pub const REFRESH_SECS: u32 = 60;

// The `.html` suffix turns on HTML auto-escaping for every interpolation.
const TEMPLATE_NAME: &str = "status.html";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="refresh" content="{{ refresh }}">
    <title>Keep-Warm Status</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif; background-color: #f0f2f5; color: #333; margin: 0; padding: 2em; }
        .container { max-width: 800px; margin: 0 auto; background-color: #fff; padding: 2em; border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,0.1); }
        h1 { color: #1a1a1a; border-bottom: 2px solid #eee; padding-bottom: 0.5em; }
        .status-list { list-style: none; padding: 0; }
        .status-item { display: flex; justify-content: space-between; align-items: center; padding: 1em; border-bottom: 1px solid #eee; }
        .status-item:last-child { border-bottom: none; }
        .url { word-break: break-all; margin-right: 1em; }
        .status { font-weight: bold; padding: 0.3em 0.8em; border-radius: 12px; font-size: 0.9em; white-space: nowrap; }
        .status-ok { color: #28a745; background-color: #e9f5ec; }
        .status-error { color: #dc3545; background-color: #fbebed; }
        .status-pending { color: #6c757d; background-color: #f0f2f5; }
        .timestamp { font-size: 0.8em; color: #6c757d; }
        footer { margin-top: 2em; text-align: center; color: #888; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Keep-Warm Status</h1>
        <ul class="status-list">
        {%- for entry in statuses %}
            <li class="status-item">
                <div>
                    <div class="url"><a href="{{ entry.url }}" target="_blank" rel="noopener">{{ entry.url }}</a></div>
                    <div class="timestamp">Last check: {{ entry.timestamp }}</div>
                </div>
                <span class="status {{ entry.badge }}">{{ entry.status }}</span>
            </li>
        {%- endfor %}
        </ul>
    </div>
    <footer>Page automatically refreshes every {{ refresh }} seconds.</footer>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct Row<'a> {
    url: &'a str,
    status: &'a str,
    timestamp: &'a str,
    badge: &'static str,
}

fn badge_class(class: StatusClass) -> &'static str {
    match class {
        StatusClass::Ok => "status-ok",
        StatusClass::Error => "status-error",
        StatusClass::Pending => "status-pending",
    }
}

/// Renders a store snapshot into the auto-refreshing status page.
pub fn render(statuses: &[(String, StatusRecord)]) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;

    let rows: Vec<Row<'_>> = statuses
        .iter()
        .map(|(url, record)| Row {
            url,
            status: &record.status,
            timestamp: &record.timestamp,
            badge: badge_class(StatusClass::of(&record.status)),
        })
        .collect();

    env.get_template(TEMPLATE_NAME)?
        .render(context! { statuses => rows, refresh => REFRESH_SECS })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, status: &str, timestamp: &str) -> (String, StatusRecord) {
        (
            url.to_string(),
            StatusRecord {
                status: status.into(),
                timestamp: timestamp.into(),
            },
        )
    }

    /// The HTML escaper may entity-encode `/`; browsers show it as a slash.
    fn visible(html: &str) -> String {
        html.replace("&#x2f;", "/")
    }

    #[test]
    fn renders_ok_badge_for_200() {
        let html = visible(&render(&[entry("http://a", "Status: 200", "T")]).unwrap());
        assert!(html.contains(r#"<a href="http://a""#));
        assert!(html.contains(r#"<span class="status status-ok">Status: 200</span>"#));
        assert!(html.contains("Last check: T"));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="60">"#));
    }

    #[test]
    fn renders_error_and_pending_badges() {
        let html = visible(
            &render(&[
                entry("http://down", "Error: Timeout", "T"),
                entry("http://asleep", "Status: 503", "T"),
                entry("http://new", "Pending...", "-"),
            ])
            .unwrap(),
        );
        assert_eq!(html.matches("status status-error").count(), 2);
        assert!(html.contains(r#"<span class="status status-pending">Pending...</span>"#));
        assert!(html.find("http://down") < html.find("http://new"));
    }

    #[test]
    fn escapes_markup_in_urls() {
        let html = render(&[entry("http://x/?q=<script>&a=\"b\"", "Status: 200", "T")]).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;&amp;a=&quot;b&quot;"));
    }

    #[test]
    fn empty_snapshot_renders_page() {
        let html = render(&[]).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("status-item\""));
    }
}
