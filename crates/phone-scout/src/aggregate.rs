//! Cross-source merge into one canonical record per catalog model.
//!
//! The model name is the join key. Price and enrichment come from the
//! primary source when it has a value, otherwise from the other source.
//! Ratings and review counts stay per source.

use std::collections::{HashMap, HashSet};

use crate::types::{CanonicalRecord, EnrichmentBundle, Source, SourceRecord};

/// Popularity of a model: sum over sources of `review_count × rating`.
pub fn popularity_score<'a>(records: impl IntoIterator<Item = &'a SourceRecord>) -> f64 {
    records
        .into_iter()
        .map(|r| r.review_count as f64 * r.rating.max(0.0))
        .sum()
}

/// Joins per-source record sets with a fixed source precedence.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    primary: Source,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Source::Amazon)
    }
}

impl Aggregator {
    pub fn new(primary: Source) -> Self {
        Self { primary }
    }

    pub fn primary(&self) -> Source {
        self.primary
    }

    fn secondary(&self) -> Source {
        match self.primary {
            Source::Amazon => Source::Flipkart,
            Source::Flipkart => Source::Amazon,
        }
    }

    /// Merge Amazon and Flipkart records into canonical rows, in catalog order.
    ///
    /// Each slice is treated as that source's output. Models with no record
    /// at either source produce no row, records for models outside the
    /// catalog are ignored, and within a slice the first record per model wins.
    pub fn merge(
        &self,
        amazon: &[SourceRecord],
        flipkart: &[SourceRecord],
        catalog: &[String],
    ) -> Vec<CanonicalRecord> {
        let amazon = index_by_model(amazon);
        let flipkart = index_by_model(flipkart);
        let mut seen = HashSet::new();

        catalog
            .iter()
            .filter(|model| seen.insert(model.as_str()))
            .filter_map(|model| {
                let a = amazon.get(model.as_str()).copied();
                let f = flipkart.get(model.as_str()).copied();
                self.merge_one(model, a, f)
            })
            .collect()
    }

    fn merge_one(
        &self,
        model: &str,
        amazon: Option<&SourceRecord>,
        flipkart: Option<&SourceRecord>,
    ) -> Option<CanonicalRecord> {
        if amazon.is_none() && flipkart.is_none() {
            return None;
        }

        let pick = |source: Source| match source {
            Source::Amazon => amazon,
            Source::Flipkart => flipkart,
        };
        // Precedence order: primary first.
        let ordered: Vec<&SourceRecord> = [pick(self.primary), pick(self.secondary())]
            .into_iter()
            .flatten()
            .collect();
        let bundles: Vec<&EnrichmentBundle> = ordered.iter().map(|r| &r.enrichment).collect();

        Some(CanonicalRecord {
            model_name: model.to_string(),
            price_inr: ordered.iter().find_map(|r| r.price_inr),
            rating_amazon: amazon.map(|r| r.rating),
            review_count_amazon: amazon.map(|r| r.review_count),
            rating_flipkart: flipkart.map(|r| r.rating),
            review_count_flipkart: flipkart.map(|r| r.review_count),
            url_amazon: amazon.and_then(|r| r.url.clone()),
            url_flipkart: flipkart.and_then(|r| r.url.clone()),
            features: first_non_empty(&bundles, |b| &b.features),
            colors: first_non_empty(&bundles, |b| &b.colors),
            storage_options: first_non_empty(&bundles, |b| &b.storage_options),
            processor: first_text(&bundles, |b| &b.processor),
            os_version: first_text(&bundles, |b| &b.os_version),
            specs: first_non_empty(&bundles, |b| &b.specs),
            popularity_score: popularity_score(ordered.iter().copied()),
            best_pick: None,
        })
    }
}

fn index_by_model(records: &[SourceRecord]) -> HashMap<&str, &SourceRecord> {
    let mut index = HashMap::new();
    for record in records {
        index.entry(record.model_name.as_str()).or_insert(record);
    }
    index
}

/// Collections that can report emptiness.
trait IsEmpty {
    fn is_empty_value(&self) -> bool;
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> IsEmpty for std::collections::BTreeSet<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> IsEmpty for std::collections::BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

fn first_non_empty<T, F>(bundles: &[&EnrichmentBundle], field: F) -> T
where
    T: IsEmpty + Clone + Default,
    F: Fn(&EnrichmentBundle) -> &T,
{
    bundles
        .iter()
        .map(|b| field(b))
        .find(|v| !v.is_empty_value())
        .cloned()
        .unwrap_or_default()
}

fn first_text<F>(bundles: &[&EnrichmentBundle], field: F) -> Option<String>
where
    F: Fn(&EnrichmentBundle) -> &Option<String>,
{
    bundles
        .iter()
        .filter_map(|b| field(b).as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
