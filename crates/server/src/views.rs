//! Server-rendered HTML pages.
//!
//! Pages are built as strings with `std::fmt::Write`; all dynamic text
//! passes through [`escape`] on the way in. No template engine, no client
//! JS beyond what the browser gives us for free.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use url::form_urlencoded;

use kiosk_client::newsapi::{Article, Source};
use kiosk_core::catalog;

use crate::news::Strategy;

/// HTML-escape untrusted text.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

/// Relative publication time: "Just now", "5m ago", "3h ago", "2d ago",
/// then a plain date once it is a week old.
pub fn time_ago(published_at: Option<DateTime<Utc>>) -> String {
    let Some(dt) = published_at else {
        return "Unknown time".to_string();
    };
    let diff = Utc::now().signed_duration_since(dt);
    if diff.num_minutes() < 1 {
        "Just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 7 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%b %-d, %Y").to_string()
    }
}

/// Card blurb: capped at 160 characters with an ellipsis, or a stock line
/// when the article has no description.
pub fn short_description(description: Option<&str>) -> String {
    match description {
        Some(d) if !d.trim().is_empty() => {
            if d.chars().count() > 160 {
                let truncated: String = d.chars().take(157).collect();
                format!("{truncated}\u{2026}")
            } else {
                d.to_string()
            }
        }
        _ => "No description available.".to_string(),
    }
}

/// Byline: the author when present, otherwise the source name.
pub fn display_author(article: &Article) -> &str {
    match article.author.as_deref() {
        Some(a) if !a.trim().is_empty() => a,
        _ => &article.source_name,
    }
}

/// Whether the article has a usable image. The upstream substitutes a
/// `removed.png` placeholder for taken-down articles.
pub fn has_image(article: &Article) -> bool {
    article
        .image_url
        .as_deref()
        .is_some_and(|u| !u.trim().is_empty() && !u.to_lowercase().contains("removed.png"))
}

/// Pagination state for a result listing.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_results: u32,
}

impl Pagination {
    pub fn total_pages(&self) -> u32 {
        if self.total_results == 0 { 1 } else { self.total_results.div_ceil(self.page_size) }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }
}

/// Build a path plus query string, skipping empty values.
pub fn href(path: &str, params: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if !value.is_empty() {
            serializer.append_pair(key, value);
            any = true;
        }
    }
    if any { format!("{path}?{}", serializer.finish()) } else { path.to_string() }
}

/// Detail-page link carrying the article fields through the query string.
pub fn article_href(article: &Article) -> String {
    let published = article.published_at.map(|dt| dt.to_rfc3339()).unwrap_or_default();
    href(
        "/article",
        &[
            ("url", &article.url),
            ("title", &article.title),
            ("description", article.description.as_deref().unwrap_or_default()),
            ("image", article.image_url.as_deref().unwrap_or_default()),
            ("author", article.author.as_deref().unwrap_or_default()),
            ("source", &article.source_name),
            ("publishedAt", &published),
        ],
    )
}

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;margin:0;background:#f6f6f4;color:#1a1a1a}
nav{background:#1a1a2e;padding:0.8rem 1.5rem}
nav a{color:#eee;margin-right:1.2rem;text-decoration:none;font-weight:600}
main{max-width:72rem;margin:0 auto;padding:1.5rem}
.cards{display:grid;grid-template-columns:repeat(auto-fill,minmax(18rem,1fr));gap:1rem}
.card{background:#fff;border-radius:6px;padding:1rem;box-shadow:0 1px 3px rgba(0,0,0,.12)}
.card img{width:100%;height:10rem;object-fit:cover;border-radius:4px}
.card h3{margin:.5rem 0 .3rem;font-size:1.05rem}
.meta{color:#666;font-size:.85rem}
.filters a{margin-right:.8rem;text-decoration:none;color:#1a1a2e}
.filters a.active{font-weight:700;border-bottom:2px solid #1a1a2e}
.notice{background:#fff8e1;border:1px solid #e6c200;border-radius:4px;padding:.6rem 1rem;margin:1rem 0}
.error{background:#fdecea;border:1px solid #c0392b;border-radius:4px;padding:.6rem 1rem;margin:1rem 0}
.pager{margin:1.5rem 0}
.pager a{margin-right:1rem}
form.search input,form.search select{padding:.4rem;margin-right:.5rem}
table{border-collapse:collapse;width:100%}
td,th{text-align:left;padding:.4rem .6rem;border-bottom:1px solid #ddd}
"#;

/// Shared page shell: nav bar, main column, footer.
fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{} - Kiosk</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Headlines</a><a href="/search">Search</a><a href="/sources">Sources</a></nav>
<main>
{body}
</main>
</body>
</html>"#,
        escape(title)
    )
}

fn article_card(article: &Article) -> String {
    let mut card = String::from("<article class=\"card\">");
    if has_image(article)
        && let Some(image) = article.image_url.as_deref()
    {
        let _ = write!(card, r#"<img src="{}" alt="">"#, escape(image));
    }
    let _ = write!(
        card,
        r#"<h3><a href="{}">{}</a></h3><p class="meta">{} &middot; {}</p><p>{}</p>"#,
        escape(&article_href(article)),
        escape(&article.title),
        escape(display_author(article)),
        escape(&time_ago(article.published_at)),
        escape(&short_description(article.description.as_deref())),
    );
    card.push_str("</article>");
    card
}

fn card_grid(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "<p>No articles found.</p>".to_string();
    }
    let mut grid = String::from("<section class=\"cards\">");
    for article in articles {
        grid.push_str(&article_card(article));
    }
    grid.push_str("</section>");
    grid
}

fn pager(pagination: &Pagination, path: &str, base_params: &[(&str, &str)]) -> String {
    let mut out = String::from("<div class=\"pager\">");
    if pagination.has_previous() {
        let prev = (pagination.current_page - 1).to_string();
        let mut params = base_params.to_vec();
        params.push(("page", &prev));
        let _ = write!(out, r#"<a href="{}">&laquo; Previous</a>"#, escape(&href(path, &params)));
    }
    let _ = write!(out, "<span>Page {} of {}</span>", pagination.current_page, pagination.total_pages());
    if pagination.has_next() {
        let next = (pagination.current_page + 1).to_string();
        let mut params = base_params.to_vec();
        params.push(("page", &next));
        let _ = write!(out, r#" <a href="{}">Next &raquo;</a>"#, escape(&href(path, &params)));
    }
    out.push_str("</div>");
    out
}

fn error_banner(message: Option<&str>) -> String {
    match message {
        Some(m) => format!(r#"<div class="error">{}</div>"#, escape(m)),
        None => String::new(),
    }
}

/// Everything the headlines page needs.
pub struct HeadlinesView<'a> {
    pub articles: &'a [Article],
    pub pagination: Pagination,
    pub country: &'a str,
    pub category: &'a str,
    /// Explicit source filter, when the listing bypasses the fallback.
    pub sources: &'a str,
    pub strategy: Strategy,
    pub from_cache: bool,
    pub error: Option<&'a str>,
}

pub fn headlines_page(view: &HeadlinesView<'_>) -> String {
    let country_name = catalog::country_display_name(view.country);
    let mut body = String::new();

    let _ = write!(body, "<h1>Top headlines &ndash; {}</h1>", escape(&country_name));
    body.push_str(&error_banner(view.error));

    // category tabs
    body.push_str("<p class=\"filters\">");
    for category in catalog::CATEGORIES {
        let active = if *category == view.category { " class=\"active\"" } else { "" };
        let link = href("/", &[("category", category), ("country", view.country)]);
        let _ = write!(
            body,
            r#"<a{active} href="{}"><i class="fa {}"></i> {}</a>"#,
            escape(&link),
            catalog::category_icon(category),
            escape(category),
        );
    }
    body.push_str("</p>");

    // country picker
    body.push_str("<p class=\"filters\">");
    for (code, name) in catalog::COUNTRIES {
        let active = if *code == view.country { " class=\"active\"" } else { "" };
        let link = href("/", &[("category", view.category), ("country", code)]);
        let _ = write!(body, r#"<a{active} href="{}">{}</a>"#, escape(&link), escape(name));
    }
    body.push_str("</p>");

    match view.strategy {
        Strategy::TopHeadlines => {}
        Strategy::Sources => {
            let _ = write!(
                body,
                r#"<div class="notice">Headlines from curated {} outlets.</div>"#,
                escape(&country_name)
            );
        }
        Strategy::Search => {
            let _ = write!(
                body,
                r#"<div class="notice">Direct headlines were unavailable; showing recent coverage about {}.</div>"#,
                escape(&country_name)
            );
        }
        Strategy::Failed => {
            body.push_str(r#"<div class="error">Could not load headlines right now. Please try again shortly.</div>"#);
        }
    }

    body.push_str(&card_grid(view.articles));
    body.push_str(&pager(
        &view.pagination,
        "/",
        &[("category", view.category), ("country", view.country), ("sources", view.sources)],
    ));

    if view.from_cache {
        body.push_str(r#"<p class="meta">Served from cache.</p>"#);
    }

    layout(&format!("{country_name} headlines"), &body)
}

/// Everything the search page needs.
pub struct SearchView<'a> {
    pub query: &'a str,
    pub sort_by: &'a str,
    pub language: &'a str,
    pub source: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub articles: &'a [Article],
    pub pagination: Pagination,
    pub sources: &'a [Source],
    pub from_cache: bool,
    pub error: Option<&'a str>,
}

pub fn search_page(view: &SearchView<'_>) -> String {
    let mut body = String::from("<h1>Search news</h1>");
    body.push_str(&error_banner(view.error));

    let _ = write!(
        body,
        r#"<form class="search" method="get" action="/search">
<input type="text" name="q" value="{}" placeholder="Keywords" required>
<select name="sortBy">"#,
        escape(view.query)
    );
    for (value, label) in catalog::SORT_OPTIONS {
        let selected = if *value == view.sort_by { " selected" } else { "" };
        let _ = write!(body, r#"<option value="{value}"{selected}>{}</option>"#, escape(label));
    }
    body.push_str("</select><select name=\"language\">");
    for (code, name) in catalog::LANGUAGES {
        let selected = if *code == view.language { " selected" } else { "" };
        let _ = write!(body, r#"<option value="{code}"{selected}>{}</option>"#, escape(name));
    }
    body.push_str("</select><select name=\"source\"><option value=\"\">All sources</option>");
    for source in view.sources {
        let selected = if source.id == view.source { " selected" } else { "" };
        let _ = write!(
            body,
            r#"<option value="{}"{selected}>{}</option>"#,
            escape(&source.id),
            escape(&source.name)
        );
    }
    let _ = write!(
        body,
        r#"</select>
<input type="date" name="from" value="{}">
<input type="date" name="to" value="{}">
<button type="submit">Search</button>
</form>"#,
        escape(view.from),
        escape(view.to)
    );

    if !view.query.trim().is_empty() {
        let _ = write!(
            body,
            "<p class=\"meta\">{} results for &quot;{}&quot;</p>",
            view.pagination.total_results,
            escape(view.query)
        );
        body.push_str(&card_grid(view.articles));
        body.push_str(&pager(
            &view.pagination,
            "/search",
            &[
                ("q", view.query),
                ("sortBy", view.sort_by),
                ("language", view.language),
                ("source", view.source),
                ("from", view.from),
                ("to", view.to),
            ],
        ));
        if view.from_cache {
            body.push_str(r#"<p class="meta">Served from cache.</p>"#);
        }
    }

    layout("Search", &body)
}

pub fn detail_page(article: &Article, related: &[Article]) -> String {
    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>", escape(&article.title));
    let _ = write!(
        body,
        r#"<p class="meta">{} &middot; {} &middot; {}</p>"#,
        escape(display_author(article)),
        escape(&article.source_name),
        escape(&time_ago(article.published_at)),
    );
    if has_image(article)
        && let Some(image) = article.image_url.as_deref()
    {
        let _ = write!(body, r#"<p><img src="{}" alt="" style="max-width:100%"></p>"#, escape(image));
    }
    if let Some(description) = article.description.as_deref() {
        let _ = write!(body, "<p>{}</p>", escape(description));
    }
    let _ = write!(
        body,
        r#"<p><a href="{}" rel="noopener noreferrer">Read the full story at {}</a></p>"#,
        escape(&article.url),
        escape(&article.source_name),
    );

    if !related.is_empty() {
        body.push_str("<h2>Related articles</h2>");
        body.push_str(&card_grid(related));
    }

    layout(&article.title, &body)
}

/// Filters currently applied to the sources listing.
pub struct SourceFilterView<'a> {
    pub category: &'a str,
    pub language: &'a str,
    pub country: &'a str,
}

pub fn sources_page(sources: &[Source], filter: &SourceFilterView<'_>, error: Option<&str>) -> String {
    let mut body = String::from("<h1>News sources</h1>");
    body.push_str(&error_banner(error));

    let _ = write!(
        body,
        r#"<form class="search" method="get" action="/sources">
<select name="category"><option value="">All categories</option>"#
    );
    for category in catalog::CATEGORIES {
        let selected = if *category == filter.category { " selected" } else { "" };
        let _ = write!(body, r#"<option value="{category}"{selected}>{}</option>"#, escape(category));
    }
    body.push_str("</select><select name=\"language\"><option value=\"\">All languages</option>");
    for (code, name) in catalog::LANGUAGES {
        let selected = if *code == filter.language { " selected" } else { "" };
        let _ = write!(body, r#"<option value="{code}"{selected}>{}</option>"#, escape(name));
    }
    body.push_str("</select><select name=\"country\"><option value=\"\">All countries</option>");
    for (code, name) in catalog::COUNTRIES {
        let selected = if *code == filter.country { " selected" } else { "" };
        let _ = write!(body, r#"<option value="{code}"{selected}>{}</option>"#, escape(name));
    }
    body.push_str("</select><button type=\"submit\">Filter</button></form>");

    if sources.is_empty() {
        body.push_str("<p>No sources matched the filters.</p>");
    } else {
        body.push_str("<table><tr><th>Name</th><th>Category</th><th>Language</th><th>Country</th><th></th></tr>");
        for source in sources {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&source.name),
                escape(source.category.as_deref().unwrap_or("-")),
                escape(source.language.as_deref().unwrap_or("-")),
                escape(source.country.as_deref().unwrap_or("-")),
                source
                    .url
                    .as_deref()
                    .map(|u| format!(r#"<a href="{}">Visit</a>"#, escape(u)))
                    .unwrap_or_default(),
            );
        }
        body.push_str("</table>");
    }

    layout("Sources", &body)
}

pub fn error_page(status: u16, title: &str, message: &str) -> String {
    let body = format!(
        r#"<h1>{status} &ndash; {}</h1><p>{}</p><p><a href="/">Back to headlines</a></p>"#,
        escape(title),
        escape(message)
    );
    layout(title, &body)
}
