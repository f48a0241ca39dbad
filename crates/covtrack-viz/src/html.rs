//! Self-contained HTML page for a [`Dashboard`].
//!
//! Plotly.js is loaded from its CDN; every figure is embedded as JSON and drawn
//! on load. All user-visible text goes through [`escape`].

use std::fmt::Write;

use covtrack_core::Metric;

use crate::dashboard::{Dashboard, Panel};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

const NOT_AVAILABLE: &str = "Data not available";

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0 auto;max-width:1200px;padding:1rem 2rem;color:#1f2937}\
h1{text-align:center}\
.notice{background:#fef3c7;border-left:4px solid #d97706;padding:.5rem 1rem;margin:.5rem 0}\
.warning{background:#fee2e2;border-left:4px solid #dc2626;padding:.5rem 1rem;margin:.5rem 0}\
.cards{display:flex;flex-wrap:wrap;gap:1rem;margin:1rem 0}\
.card{flex:1 1 180px;border-radius:8px;padding:1rem;background:#f3f4f6}\
.card-label{font-size:.8rem;text-transform:uppercase;color:#6b7280}\
.card-value{font-size:1.6rem;font-weight:600}\
.chart{width:100%;min-height:450px}";

/// Render `dashboard` as one HTML document.
pub fn render_html(dashboard: &Dashboard) -> String {
    let mut out = String::with_capacity(64 * 1024);
    let title = escape(&dashboard.title);

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<script src=\"{PLOTLY_CDN}\"></script>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );
    let _ = writeln!(
        out,
        "<p class=\"origin\">Data source: {}</p>",
        escape(&dashboard.origin.to_string())
    );
    for notice in &dashboard.notices {
        let _ = writeln!(out, "<div class=\"notice\">{}</div>", escape(notice));
    }

    out.push_str("<h2>Dataset Overview</h2>\n<div class=\"cards\">\n");
    let overview = &dashboard.overview;
    push_card(&mut out, "Countries/Regions", &format_count(overview.locations as f64));
    let span = overview
        .date_range
        .map(|(start, end)| format!("{start} to {end}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    push_card(&mut out, "Date Range", &span);
    push_card(&mut out, "Total Records", &format_count(overview.records as f64));
    out.push_str("</div>\n");

    out.push_str("<h2>Global Overview</h2>\n<div class=\"cards\">\n");
    for (metric, value) in dashboard.totals.iter() {
        let text = value
            .map(format_count)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        push_card(&mut out, metric.label(), &text);
    }
    let rate = dashboard
        .totals
        .death_rate()
        .map(|rate| format!("{rate:.2}%"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    push_card(&mut out, Metric::DeathRate.label(), &rate);
    out.push_str("</div>\n");

    let mut chart_id = 0usize;
    let mut scripts = String::new();
    for section in &dashboard.sections {
        let _ = writeln!(out, "<section>\n<h2>{}</h2>", escape(&section.title));
        if let Some(description) = &section.description {
            let _ = writeln!(out, "<p>{}</p>", escape(description));
        }
        for panel in &section.panels {
            match panel {
                Panel::Chart(figure) => {
                    let id = format!("chart-{chart_id}");
                    chart_id += 1;
                    let _ = writeln!(out, "<div class=\"chart\" id=\"{id}\"></div>");
                    let _ = writeln!(
                        scripts,
                        "(function(){{var f={};Plotly.newPlot(\"{id}\",f.data,f.layout,{{responsive:true}});}})();",
                        script_json(&figure.to_json())
                    );
                }
                Panel::Warning(message) => {
                    let _ = writeln!(out, "<div class=\"warning\">{}</div>", escape(message));
                }
            }
        }
        if !section.points.is_empty() {
            out.push_str("<ol>\n");
            for point in &section.points {
                let _ = writeln!(out, "<li>{}</li>", escape(point));
            }
            out.push_str("</ol>\n");
        }
        out.push_str("</section>\n");
    }

    if !scripts.is_empty() {
        let _ = write!(out, "<script>\n{scripts}</script>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// Escape text for HTML element and attribute content.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Whole number with thousands separators, e.g. `1234567.4` -> `1,234,567`.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn push_card(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "<div class=\"card\"><div class=\"card-label\">{}</div><div class=\"card-value\">{}</div></div>",
        escape(label),
        escape(value)
    );
}

/// JSON inside `<script>` must not close the element early.
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
