//! Core data types for listings, per-source records, and merged records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Retail source a listing was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Amazon,
    Flipkart,
}

impl Source {
    /// All known sources, in a stable order.
    pub const ALL: [Source; 2] = [Source::Amazon, Source::Flipkart];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Amazon => "amazon",
            Source::Flipkart => "flipkart",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(Source::Amazon),
            "flipkart" => Ok(Source::Flipkart),
            other => Err(ScoutError::InvalidInput(format!("unknown source: {other}"))),
        }
    }
}

/// An unconfirmed listing pulled from a search-results page.
///
/// Every field is raw text straight from the markup; any of them may be
/// missing when the corresponding region is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: Option<String>,
    pub price_text: Option<String>,
    pub rating_text: Option<String>,
    pub review_text: Option<String>,
    /// Absolute URL of the listing's detail page.
    pub detail_url: Option<String>,
}

/// Specification data pulled from a detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentBundle {
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub colors: BTreeSet<String>,
    #[serde(default)]
    pub storage_options: BTreeSet<String>,
    #[serde(default)]
    pub processor: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

impl EnrichmentBundle {
    /// True when the detail page contributed nothing.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
            && self.colors.is_empty()
            && self.storage_options.is_empty()
            && self.processor.is_none()
            && self.os_version.is_none()
            && self.specs.is_empty()
    }
}

/// One confirmed listing for one catalog model at one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub model_name: String,
    /// Listing title exactly as found.
    pub title: String,
    /// Whole rupees.
    pub price_inr: Option<u64>,
    pub rating: f64,
    pub review_count: u64,
    pub url: Option<String>,
    pub source: Source,
    pub last_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub enrichment: EnrichmentBundle,
}

/// The merged, cross-source view of one catalog model.
///
/// Column names are stable; consumers read this as one row per model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub model_name: String,
    pub price_inr: Option<u64>,
    pub rating_amazon: Option<f64>,
    pub review_count_amazon: Option<u64>,
    pub rating_flipkart: Option<f64>,
    pub review_count_flipkart: Option<u64>,
    pub url_amazon: Option<String>,
    pub url_flipkart: Option<String>,
    pub features: Vec<String>,
    pub colors: BTreeSet<String>,
    pub storage_options: BTreeSet<String>,
    pub processor: Option<String>,
    pub os_version: Option<String>,
    pub specs: BTreeMap<String, String>,
    pub popularity_score: f64,
    /// Editorial flag attached downstream; never computed by the merge.
    /// Serialized under the column name the dashboard reads.
    #[serde(rename = "best_2025_flag")]
    pub best_pick: Option<String>,
}

impl CanonicalRecord {
    /// Attach an externally decided "best pick" label.
    pub fn with_best_pick(mut self, label: impl Into<String>) -> Self {
        self.best_pick = Some(label.into());
        self
    }

    /// Rating reported by `source`, if that source had a record.
    pub fn rating(&self, source: Source) -> Option<f64> {
        match source {
            Source::Amazon => self.rating_amazon,
            Source::Flipkart => self.rating_flipkart,
        }
    }

    /// Review count reported by `source`, if that source had a record.
    pub fn review_count(&self, source: Source) -> Option<u64> {
        match source {
            Source::Amazon => self.review_count_amazon,
            Source::Flipkart => self.review_count_flipkart,
        }
    }
}

/// Errors outside the collection path: configuration, files, serialization.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience result type.
pub type ScoutResult<T> = Result<T, ScoutError>;
