use crate::error::AppError;
use crate::format::Trend;
use crate::view::{DashboardView, KpiCard};

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f5f6f8; color: #222; }
main { max-width: 1200px; margin: 0 auto; padding: 24px; }
header { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 16px; }
form { display: flex; gap: 12px; }
label { font-size: 0.85rem; color: #555; }
select { display: block; padding: 4px 8px; min-width: 120px; }
h2 { font-size: 1.1rem; margin: 32px 0 12px; }
.grid { display: grid; gap: 16px; }
.kpis { grid-template-columns: repeat(4, 1fr); }
.pair { grid-template-columns: repeat(2, 1fr); }
.card { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); min-height: 120px; }
.card-title { font-size: 0.85rem; color: #666; }
.card-value { font-size: 1.8rem; font-weight: 600; margin: 8px 0; }
.trend-positive { color: #1a7f37; }
.trend-negative { color: #cf222e; }
.trend-neutral { color: #888; }
.stars { color: #f5a623; font-size: 1.2rem; }
.empty { background: #fff8c5; border: 1px solid #d4a72c; border-radius: 8px; padding: 12px 16px; margin-top: 16px; }
.error { background: #ffebe9; border: 1px solid #cf222e; border-radius: 8px; padding: 16px; margin-top: 24px; }
svg { width: 100%; height: auto; }
svg text { font-size: 11px; fill: #444; }
"#;

/// Escapes text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        escape(title)
    )
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

/// A selector that re-submits the form as soon as it changes.
fn select(name: &str, label: &str, options: Vec<String>) -> String {
    format!(
        r#"<label>{label}<select name="{name}" onchange="this.form.submit()">{}</select></label>"#,
        options.concat()
    )
}

fn filter_form(view: &DashboardView) -> String {
    let selection = view.selection;

    let mut years = vec![option("all", "All Years", selection.year.is_none())];
    years.extend(view.options.years.iter().map(|year| {
        option(&year.to_string(), &year.to_string(), selection.year == Some(*year))
    }));

    let mut months = vec![option("all", "All Months", selection.month.is_none())];
    months.extend(view.options.months.iter().map(|month| {
        option(
            &month.value.to_string(),
            &month.label,
            selection.month == Some(month.value),
        )
    }));

    let mut statuses = vec![option("all", "All Statuses", selection.status.is_none())];
    statuses.extend(view.options.statuses.iter().map(|status| {
        option(status.as_str(), status.as_str(), selection.status == Some(*status))
    }));

    format!(
        r#"<form method="get" action="/">{}{}{}<noscript><button type="submit">Apply</button></noscript></form>"#,
        select("year", "Year", years),
        select("month", "Month", months),
        select("status", "Status", statuses),
    )
}

fn trend_html(trend: &Trend) -> String {
    format!(
        r#"<span class="{}">{}</span>"#,
        trend.class,
        escape(&trend.text)
    )
}

fn kpi_card(card: &KpiCard, comparison: Option<&str>) -> String {
    let trend = match (&card.trend, comparison) {
        (Some(trend), Some(period)) => format!(
            r#"<div class="card-trend">{} vs {}</div>"#,
            trend_html(trend),
            escape(period)
        ),
        (Some(trend), None) => format!(r#"<div class="card-trend">{}</div>"#, trend_html(trend)),
        (None, _) => String::new(),
    };
    format!(
        r#"<div class="card"><div class="card-title">{}</div><div class="card-value">{}</div>{trend}</div>"#,
        escape(card.title),
        escape(&card.value)
    )
}

fn chart_card(svg: String) -> String {
    format!(r#"<div class="card">{svg}</div>"#)
}

/// Renders the full dashboard page.
pub fn render_page(view: &DashboardView) -> String {
    let comparison = view.comparison_period.as_deref();
    let mut body = String::new();

    body.push_str(&format!(
        r#"<header><div><h1>{}</h1><div class="card-title">Showing {}</div></div>{}</header>"#,
        escape(&view.title),
        escape(&view.period),
        filter_form(view)
    ));

    if let Some(message) = &view.empty_message {
        body.push_str(&format!(r#"<div class="empty">{}</div>"#, escape(message)));
    }

    body.push_str("<h2>Key Performance Indicators</h2><section class=\"grid kpis\">");
    for card in &view.kpis {
        body.push_str(&kpi_card(card, comparison));
    }
    body.push_str("</section>");

    body.push_str("<h2>Performance Analytics</h2><section class=\"grid pair\">");
    body.push_str(&chart_card(view.revenue_trend.to_svg()));
    body.push_str(&chart_card(view.categories.to_svg()));
    body.push_str(&chart_card(view.states.to_svg()));
    body.push_str(&chart_card(view.satisfaction.to_svg()));
    body.push_str("</section>");

    body.push_str("<h2>Customer Experience Metrics</h2><section class=\"grid pair\">");
    body.push_str(&kpi_card(&view.delivery, comparison));
    body.push_str(&format!(
        r#"<div class="card"><div class="card-title">{}</div><div class="card-value">{} <span class="stars">{}</span></div><div class="card-title">{}</div></div>"#,
        escape(view.review.title),
        escape(&view.review.value),
        view.review.stars,
        escape(&view.review.subtitle)
    ));
    body.push_str("</section>");

    document(&view.title, &body)
}

/// Renders the page shown instead of the dashboard when a request fails.
pub fn render_error_page(title: &str, error: &AppError) -> String {
    let body = format!(
        r#"<header><h1>{}</h1></header><div class="error"><strong>The dashboard could not be rendered.</strong><p>{}</p><p><a href="/">Back to the default view</a></p></div>"#,
        escape(title),
        escape(&error.user_message())
    );
    document(title, &body)
}
