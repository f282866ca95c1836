//! Page content extraction from HTML.

use anyhow::{Context, Result};
use focus_ai::page::RawPageContent;
use focus_ai::PageContent;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rendered text of an element, skipping script and style content
fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            if !hidden {
                parts.push(&**text);
            }
        }
    }
    normalize_whitespace(&parts.join(" "))
}

fn first_text(doc: &Html, css: &str) -> String {
    selector(css)
        .and_then(|sel| doc.select(&sel).next().map(visible_text))
        .unwrap_or_default()
}

/// Build the normalized content of a page
///
/// Missing elements become empty strings; the body text is capped by
/// [`PageContent`] itself.
#[must_use]
pub fn extract_page_content(html: &str, url: &str, study_topic: &str) -> PageContent {
    let doc = Html::parse_document(html);

    let headings = selector("h1, h2, h3")
        .map(|sel| {
            doc.select(&sel)
                .map(visible_text)
                .filter(|h| !h.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let meta_description = selector(r#"meta[name="description"]"#)
        .and_then(|sel| {
            doc.select(&sel)
                .find_map(|el| el.value().attr("content"))
                .map(normalize_whitespace)
        })
        .unwrap_or_default();

    let content = PageContent::from(RawPageContent {
        title: first_text(&doc, "title"),
        url: url.to_string(),
        headings,
        meta_description,
        main_content: first_text(&doc, "body"),
        study_topic: study_topic.to_string(),
    });

    log::debug!(
        "Extracted '{}' from {} ({} chars of body text)",
        content.title(),
        url,
        content.main_content().chars().count()
    );
    content
}

/// Download a page's HTML for offline analysis
///
/// # Errors
///
/// Returns an error if the request fails or the server answers with an error status
pub async fn fetch_html(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("focus/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(20))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Server rejected request for {url}"))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {url}"))
}
