//! Readable-text extraction from raw HTML.
//!
//! Non-content subtrees are detached first, then the first candidate region
//! (`article`, `main`, `body`) with any text at all wins, whitespace included.
//! Only the winner has its whitespace runs collapsed to single spaces.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use crate::error::{AppError, Result};

/// Page text plus the URL it came from, ready for summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub source_url: String,
}

static STRIPPED_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style, nav, footer, header, iframe, noscript, svg, canvas")
        .expect("Failed to parse stripped-element selector")
});

// Ordered by priority.
static CANDIDATE_SELECTORS: Lazy<[Selector; 3]> = Lazy::new(|| {
    ["article", "main", "body"]
        .map(|s| Selector::parse(s).expect("Failed to parse candidate selector"))
});

pub fn extract(html: &str, source_url: &str) -> Result<ExtractedContent> {
    let mut document = Html::parse_document(html);
    strip_non_content(&mut document);

    let raw = CANDIDATE_SELECTORS
        .iter()
        .map(|selector| region_text(&document, selector))
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let text = collapse_whitespace(&raw);
    if text.is_empty() {
        return Err(AppError::NoContent);
    }

    Ok(ExtractedContent {
        text,
        source_url: source_url.to_string(),
    })
}

fn strip_non_content(document: &mut Html) {
    let ids: Vec<_> = document.select(&STRIPPED_SELECTOR).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Raw text of every element matching `selector`, in document order.
fn region_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .flat_map(|el| el.text())
        .collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
