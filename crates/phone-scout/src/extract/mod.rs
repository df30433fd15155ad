//! Per-source field extraction from raw HTML.
//!
//! Extraction is synchronous because `scraper::Html` is `!Send`; documents are
//! parsed and dropped inside each call so collectors can stay `Send`. Every
//! lookup returns `Option`, and a missing node only blanks its own field.

pub mod amazon;
pub mod flipkart;

pub use amazon::AmazonExtractor;
pub use flipkart::FlipkartExtractor;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::types::{Candidate, EnrichmentBundle, Source};

/// Most candidates read from one search page.
pub const MAX_CANDIDATES: usize = 3;

/// Search-page and detail-page parsing for one retailer.
pub trait Extractor: Send + Sync {
    /// Retailer this extractor understands.
    fn source(&self) -> Source;

    /// Up to [`MAX_CANDIDATES`] listings, in document order.
    fn extract_candidates(&self, document: &str) -> Vec<Candidate>;

    /// Specification data from a detail page. Never fails; absent regions
    /// come back empty.
    fn extract_detail(&self, document: &str) -> EnrichmentBundle;
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Element text with whitespace runs collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first non-empty element under `scope` matching `css`.
pub(crate) fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let sel = selector(css)?;
    scope
        .select(&sel)
        .map(element_text)
        .find(|t| !t.is_empty())
}

/// Non-empty texts of every element under `scope` matching `css`.
pub(crate) fn all_texts(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    let Some(sel) = selector(css) else {
        return Vec::new();
    };
    scope
        .select(&sel)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Attribute `attr` of the first element under `scope` matching `css` that has it.
pub(crate) fn first_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    let sel = selector(css)?;
    scope
        .select(&sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Matches of `css` under `scope`, skipping any element nested inside an
/// earlier match, capped at `limit`.
pub(crate) fn outermost<'a>(scope: ElementRef<'a>, css: &str, limit: usize) -> Vec<ElementRef<'a>> {
    let Some(sel) = selector(css) else {
        return Vec::new();
    };
    let mut kept: Vec<ElementRef<'a>> = Vec::new();
    for el in scope.select(&sel) {
        if kept.len() >= limit {
            break;
        }
        let nested = el
            .ancestors()
            .any(|a| kept.iter().any(|k| k.id() == a.id()));
        if !nested {
            kept.push(el);
        }
    }
    kept
}

/// Resolve a possibly relative link against the source base URL.
pub(crate) fn resolve_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}
