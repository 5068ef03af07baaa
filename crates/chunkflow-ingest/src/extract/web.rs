//! Web-page main-content extraction
//!
//! Markup varies too widely across sources for a single selector, so a
//! strict priority cascade is applied and the first selector with non-empty
//! content wins — matches are never combined. Worst case degrades to the
//! full document text; this extractor never fails.

use scraper::{Html, Selector};

use chunkflow_core::Chunk;

use crate::types::WebMeta;

/// Content selectors in strict priority order
const CONTENT_SELECTORS: [&str; 10] = [
    "main",
    "article",
    "#main",
    "#main-content",
    "#content",
    ".main",
    ".main-content",
    ".content",
    ".content-body",
    ".news-article",
];

/// Extract the best main-content text of an HTML document as one chunk
pub fn extract_web_page(html: &str) -> Chunk<WebMeta> {
    let document = Html::parse_document(html);

    let title = first_selector_text(&document, "title")
        .unwrap_or_else(|| "N/A".to_string());

    for selector in CONTENT_SELECTORS {
        if let Some(text) = first_selector_text(&document, selector) {
            tracing::debug!("Web page content matched selector '{}'", selector);
            return Chunk::new(text, WebMeta { title });
        }
    }

    // Fallback: full document visible text.
    let text = collect_text(document.root_element().text());
    Chunk::new(text, WebMeta { title })
}

/// Text of the first element matching the selector, if non-empty
fn first_selector_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    for element in document.select(&selector) {
        let text = collect_text(element.text());
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

/// Join text nodes with single spaces, dropping blank runs
fn collect_text<'a>(nodes: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for node in nodes {
        let trimmed = node.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}
