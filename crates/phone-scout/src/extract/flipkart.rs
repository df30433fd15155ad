//! Flipkart search-result and product-page extraction.
//!
//! Flipkart ships obfuscated class names that rotate between layouts, so each
//! region lists the known variants as a selector group.

use std::collections::{BTreeMap, BTreeSet};

use scraper::Html;
use url::Url;

use super::{
    all_texts, element_text, first_attr, first_text, outermost, resolve_url, Extractor,
    MAX_CANDIDATES,
};
use crate::types::{Candidate, EnrichmentBundle, ScoutResult, Source};

const RESULT: &str = "div._2kHMtA, div._13oc-S";
const TITLE: &str = "a.IRpwTa";
const TITLE_GRID: &str = "div._4rR01T";
const PRICE: &str = "div._30jeq3";
const RATING: &str = "div._3LWZlK";
const REVIEWS: &str = "span._2_R_DZ";
const LINK: &str = "a[href]";

const HIGHLIGHTS: &str = "div._2418kt li";
const SPEC_ROWS: &str = "table._14cfVK tr";
const SPEC_KEY: &str = "td._1hKmbr";
const SPEC_VALUE: &str = "li._21lJbe";
const VARIANTS: &str = "li._3V2wfe a";

/// Extractor for `flipkart.com` markup.
#[derive(Debug, Clone)]
pub struct FlipkartExtractor {
    base: Url,
}

impl FlipkartExtractor {
    pub fn new(base_url: &str) -> ScoutResult<Self> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl Extractor for FlipkartExtractor {
    fn source(&self) -> Source {
        Source::Flipkart
    }

    fn extract_candidates(&self, document: &str) -> Vec<Candidate> {
        let doc = Html::parse_document(document);

        outermost(doc.root_element(), RESULT, MAX_CANDIDATES)
            .into_iter()
            .map(|product| Candidate {
                title: first_text(product, TITLE).or_else(|| first_text(product, TITLE_GRID)),
                price_text: first_text(product, PRICE),
                rating_text: first_text(product, RATING),
                review_text: first_text(product, REVIEWS),
                detail_url: first_attr(product, LINK, "href")
                    .and_then(|href| resolve_url(&self.base, &href)),
            })
            .collect()
    }

    fn extract_detail(&self, document: &str) -> EnrichmentBundle {
        let doc = Html::parse_document(document);
        let root = doc.root_element();

        let features = all_texts(root, HIGHLIGHTS);

        let mut colors = BTreeSet::new();
        let mut storage_options = BTreeSet::new();
        for variant in all_texts(root, VARIANTS) {
            let upper = variant.to_uppercase();
            if upper.contains("GB") || upper.contains("TB") {
                storage_options.insert(variant);
            } else {
                colors.insert(variant);
            }
        }

        let specs = spec_table(&doc);
        let processor = specs
            .get("Processor Type")
            .or_else(|| specs.get("Processor Brand"))
            .cloned();
        let os_version = specs.get("Operating System").cloned();

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

/// Specification rows as `key -> value`; multi-item values are joined with ", ".
fn spec_table(doc: &Html) -> BTreeMap<String, String> {
    let (Some(rows), Some(values)) = (super::selector(SPEC_ROWS), super::selector(SPEC_VALUE))
    else {
        return BTreeMap::new();
    };
    doc.root_element()
        .select(&rows)
        .filter_map(|row| {
            let key = first_text(row, SPEC_KEY)?;
            let value = row
                .select(&values)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            (!value.is_empty()).then_some((key, value))
        })
        .collect()
}
