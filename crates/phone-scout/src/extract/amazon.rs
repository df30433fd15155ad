//! Amazon India search-result and product-page extraction.

use std::collections::{BTreeMap, BTreeSet};

use scraper::Html;
use url::Url;

use super::{
    all_texts, first_attr, first_text, outermost, resolve_url, Extractor, MAX_CANDIDATES,
};
use crate::types::{Candidate, EnrichmentBundle, ScoutResult, Source};

const RESULT: &str = r#"div[data-component-type="s-search-result"]"#;
const TITLE: &str = "h2.a-size-mini, h2";
const PRICE: &str = "span.a-price-whole";
const PRICE_OFFSCREEN: &str = "span.a-price span.a-offscreen";
const RATING: &str = "span.a-icon-alt";
const REVIEWS: &str = "span.a-size-base.s-underline-text";
const LINK: &str = "a.a-link-normal.s-no-outline";
const LINK_FALLBACK: &str = "h2 a";

const FEATURES: &str = "#feature-bullets span.a-list-item";
const COLOR_IMAGES: &str = "img[alt]";
const SELECTIONS: &str = "span.selection";
const SPEC_ROWS: &str = "#productDetails_techSpec_section_1 tr";

/// Extractor for `amazon.in` markup.
#[derive(Debug, Clone)]
pub struct AmazonExtractor {
    base: Url,
}

impl AmazonExtractor {
    /// `base_url` resolves the relative listing links on search pages.
    pub fn new(base_url: &str) -> ScoutResult<Self> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl Extractor for AmazonExtractor {
    fn source(&self) -> Source {
        Source::Amazon
    }

    fn extract_candidates(&self, document: &str) -> Vec<Candidate> {
        let doc = Html::parse_document(document);
        let root = doc.root_element();

        outermost(root, RESULT, MAX_CANDIDATES)
            .into_iter()
            .map(|product| {
                // The h2 inside the title block sometimes nests a span; first_text
                // collapses both to one line.
                let title = first_text(product, TITLE);
                let price_text =
                    first_text(product, PRICE).or_else(|| first_text(product, PRICE_OFFSCREEN));
                let detail_url = first_attr(product, LINK, "href")
                    .or_else(|| first_attr(product, LINK_FALLBACK, "href"))
                    .and_then(|href| resolve_url(&self.base, &href));

                Candidate {
                    title,
                    price_text,
                    rating_text: first_text(product, RATING),
                    review_text: first_text(product, REVIEWS),
                    detail_url,
                }
            })
            .collect()
    }

    fn extract_detail(&self, document: &str) -> EnrichmentBundle {
        let doc = Html::parse_document(document);
        let root = doc.root_element();

        let features = all_texts(root, FEATURES);

        let colors: BTreeSet<String> = super::selector(COLOR_IMAGES)
            .map(|sel| {
                root.select(&sel)
                    .filter_map(|img| img.value().attr("alt"))
                    .map(str::trim)
                    .filter(|alt| alt.to_lowercase().contains("colour"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let storage_options: BTreeSet<String> = all_texts(root, SELECTIONS)
            .into_iter()
            .filter(|t| is_storage_label(t))
            .collect();

        let specs = spec_table(&doc);
        let processor = specs.get("Processor").cloned();
        let os_version = specs
            .get("OS")
            .or_else(|| specs.get("Operating System"))
            .cloned();

        EnrichmentBundle {
            features,
            colors,
            storage_options,
            processor,
            os_version,
            specs,
        }
    }
}

/// Technical specification rows as `th -> td`. Rows missing either cell are
/// skipped.
fn spec_table(doc: &Html) -> BTreeMap<String, String> {
    let root = doc.root_element();
    let Some(rows) = super::selector(SPEC_ROWS) else {
        return BTreeMap::new();
    };
    root.select(&rows)
        .filter_map(|row| {
            let key = first_text(row, "th")?;
            let value = first_text(row, "td")?;
            Some((key, value))
        })
        .collect()
}

fn is_storage_label(text: &str) -> bool {
    let upper = text.to_uppercase();
    upper.contains("GB") || upper.contains("TB")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
    <html><body>
      <div data-component-type="s-search-result">
        <h2 class="a-size-mini"><span>Samsung Galaxy S24 Ultra 5G AI Smartphone (Titanium Gray, 12GB, 256GB)</span></h2>
        <a class="a-link-normal s-no-outline" href="/Samsung-Galaxy-Ultra/dp/B0CS5XW6TN?ref=sr_1_1">img</a>
        <span class="a-price"><span class="a-offscreen">₹1,29,999</span><span class="a-price-whole">1,29,999.</span></span>
        <span class="a-icon-alt">4.5 out of 5 stars</span>
        <span class="a-size-base s-underline-text">1,234</span>
      </div>
      <div data-component-type="s-search-result">
        <h2 class="a-size-mini"><span>Samsung Galaxy S24 FE</span></h2>
      </div>
      <div data-component-type="s-search-result"><h2>Third</h2></div>
      <div data-component-type="s-search-result"><h2>Fourth</h2></div>
    </body></html>
    "#;

    const DETAIL_PAGE: &str = r#"
    <html><body>
      <div id="feature-bullets"><ul>
        <li><span class="a-list-item"> Galaxy AI is here </span></li>
        <li><span class="a-list-item">200MP camera</span></li>
        <li><span class="a-list-item">   </span></li>
      </ul></div>
      <img alt="Titanium Gray colour">
      <img alt="Titanium Black Colour">
      <img alt="Product photo">
      <span class="selection">256 GB</span>
      <span class="selection">Titanium Gray</span>
      <span class="selection">1 TB</span>
      <table id="productDetails_techSpec_section_1">
        <tr><th>OS</th><td>Android 14</td></tr>
        <tr><th>Processor</th><td>Snapdragon 8 Gen 3</td></tr>
        <tr><th>Orphan header</th></tr>
      </table>
    </body></html>
    "#;

    fn extractor() -> AmazonExtractor {
        AmazonExtractor::new("https://www.amazon.in").unwrap()
    }

    #[test]
    fn test_extract_candidates_full_listing() {
        let candidates = extractor().extract_candidates(SEARCH_PAGE);
        assert_eq!(candidates.len(), MAX_CANDIDATES);

        let first = &candidates[0];
        assert_eq!(
            first.title.as_deref(),
            Some("Samsung Galaxy S24 Ultra 5G AI Smartphone (Titanium Gray, 12GB, 256GB)")
        );
        assert_eq!(first.price_text.as_deref(), Some("1,29,999."));
        assert_eq!(first.rating_text.as_deref(), Some("4.5 out of 5 stars"));
        assert_eq!(first.review_text.as_deref(), Some("1,234"));
        assert_eq!(
            first.detail_url.as_deref(),
            Some("https://www.amazon.in/Samsung-Galaxy-Ultra/dp/B0CS5XW6TN?ref=sr_1_1")
        );
    }

    #[test]
    fn test_missing_subfields_do_not_drop_candidate() {
        let candidates = extractor().extract_candidates(SEARCH_PAGE);
        let second = &candidates[1];
        assert_eq!(second.title.as_deref(), Some("Samsung Galaxy S24 FE"));
        assert_eq!(second.price_text, None);
        assert_eq!(second.rating_text, None);
        assert_eq!(second.review_text, None);
        assert_eq!(second.detail_url, None);
        assert_eq!(candidates[2].title.as_deref(), Some("Third"));
    }

    #[test]
    fn test_offscreen_price_fallback() {
        let html = r#"<div data-component-type="s-search-result">
            <h2>Samsung Galaxy S23</h2>
            <span class="a-price"><span class="a-offscreen">₹54,999</span></span>
        </div>"#;
        let candidates = extractor().extract_candidates(html);
        assert_eq!(candidates[0].price_text.as_deref(), Some("₹54,999"));
    }

    #[test]
    fn test_no_results() {
        assert!(extractor().extract_candidates("<html><body>Captcha</body></html>").is_empty());
        assert!(extractor().extract_candidates("").is_empty());
    }

    #[test]
    fn test_extract_detail() {
        let bundle = extractor().extract_detail(DETAIL_PAGE);
        assert_eq!(bundle.features, vec!["Galaxy AI is here", "200MP camera"]);
        assert_eq!(bundle.colors.len(), 2);
        assert!(bundle.colors.contains("Titanium Gray colour"));
        assert_eq!(
            bundle.storage_options.iter().cloned().collect::<Vec<_>>(),
            vec!["1 TB", "256 GB"]
        );
        assert_eq!(bundle.processor.as_deref(), Some("Snapdragon 8 Gen 3"));
        assert_eq!(bundle.os_version.as_deref(), Some("Android 14"));
        assert_eq!(bundle.specs.len(), 2);
    }

    #[test]
    fn test_extract_detail_empty_page() {
        let bundle = extractor().extract_detail("<html><body></body></html>");
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let ex = extractor();
        assert_eq!(ex.extract_candidates(SEARCH_PAGE), ex.extract_candidates(SEARCH_PAGE));
        assert_eq!(ex.extract_detail(DETAIL_PAGE), ex.extract_detail(DETAIL_PAGE));
    }
}
