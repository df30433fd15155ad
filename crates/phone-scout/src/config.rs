//! Run configuration: catalog, timing, and per-source endpoints.
//!
//! Everything is optional in the JSON file; missing keys fall back to the
//! built-in Galaxy S catalog and the Amazon India / Flipkart endpoints.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::matcher::DEFAULT_BRAND_PREFIX;
use crate::types::{ScoutError, ScoutResult, Source};

/// Catalog used when no configuration file supplies one.
pub const DEFAULT_CATALOG: &[&str] = &[
    "Samsung Galaxy S25 Ultra",
    "Samsung Galaxy S25+",
    "Samsung Galaxy S25",
    "Samsung Galaxy S25 Edge",
    "Samsung Galaxy S25 FE",
    "Samsung Galaxy S24 Ultra",
    "Samsung Galaxy S24+",
    "Samsung Galaxy S24",
    "Samsung Galaxy S24 FE",
    "Samsung Galaxy S23 Ultra",
    "Samsung Galaxy S23+",
    "Samsung Galaxy S23",
    "Samsung Galaxy S23 FE",
];

/// Longest timeout or delay accepted, in seconds.
pub const MAX_TIMING_SECS: f64 = 3600.0;

/// Request deadline and politeness window, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub timeout_secs: f64,
    pub delay_min_secs: f64,
    pub delay_max_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15.0,
            delay_min_secs: 3.0,
            delay_max_secs: 5.0,
        }
    }
}

impl TimingConfig {
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }

    /// Pacing window as a `(min, max)` pair of durations.
    pub fn delay_window(&self) -> (Duration, Duration) {
        (secs(self.delay_min_secs), secs(self.delay_max_secs))
    }
}

/// Seconds to a duration, clamped to `[0, MAX_TIMING_SECS]`. NaN becomes zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.clamp(0.0, MAX_TIMING_SECS)).unwrap_or(Duration::ZERO)
}

/// How to search one retailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    pub source: Source,
    pub base_url: String,
    /// Path of the search endpoint, e.g. `/s`.
    pub search_path: String,
    /// Query parameter carrying the search term, e.g. `k`.
    pub query_param: String,
    /// Models whose name lacks this marker are not searched at this source.
    #[serde(default)]
    pub required_marker: Option<String>,
}

impl SourceProfile {
    pub fn amazon() -> Self {
        Self {
            source: Source::Amazon,
            base_url: "https://www.amazon.in".to_string(),
            search_path: "/s".to_string(),
            query_param: "k".to_string(),
            required_marker: Some("S".to_string()),
        }
    }

    pub fn flipkart() -> Self {
        Self {
            source: Source::Flipkart,
            base_url: "https://www.flipkart.com".to_string(),
            search_path: "/search".to_string(),
            query_param: "q".to_string(),
            required_marker: None,
        }
    }

    /// Default profile for `source`.
    pub fn for_source(source: Source) -> Self {
        match source {
            Source::Amazon => Self::amazon(),
            Source::Flipkart => Self::flipkart(),
        }
    }

    /// Absolute search endpoint, without the query string.
    pub fn search_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.search_path.trim_start_matches('/')
        )
    }

    /// Whether `model_name` carries this source's required marker.
    pub fn is_eligible(&self, model_name: &str) -> bool {
        match &self.required_marker {
            Some(marker) => model_name
                .to_uppercase()
                .contains(marker.to_uppercase().as_str()),
            None => true,
        }
    }
}

/// Full configuration for one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub catalog: Vec<String>,
    pub timing: TimingConfig,
    pub brand_prefix: String,
    /// Source whose values win when both sources supply one.
    pub primary_source: Source,
    pub amazon: SourceProfile,
    pub flipkart: SourceProfile,
    pub output_dir: PathBuf,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
            timing: TimingConfig::default(),
            brand_prefix: DEFAULT_BRAND_PREFIX.to_string(),
            primary_source: Source::Amazon,
            amazon: SourceProfile::amazon(),
            flipkart: SourceProfile::flipkart(),
            output_dir: PathBuf::from("data"),
        }
    }
}

impl ScoutConfig {
    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> ScoutResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from JSON text.
    pub fn from_json(raw: &str) -> ScoutResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the collectors cannot run with.
    pub fn validate(&self) -> ScoutResult<()> {
        let t = &self.timing;
        if !(t.timeout_secs.is_finite() && t.timeout_secs > 0.0) {
            return Err(ScoutError::Config(format!(
                "timeout_secs must be positive, got {}",
                t.timeout_secs
            )));
        }
        for (name, value) in [
            ("timeout_secs", t.timeout_secs),
            ("delay_max_secs", t.delay_max_secs),
        ] {
            if value > MAX_TIMING_SECS {
                return Err(ScoutError::Config(format!(
                    "{name} must be at most {MAX_TIMING_SECS}, got {value}"
                )));
            }
        }
        if !(t.delay_min_secs.is_finite() && t.delay_min_secs >= 0.0) {
            return Err(ScoutError::Config(format!(
                "delay_min_secs must be non-negative, got {}",
                t.delay_min_secs
            )));
        }
        if !t.delay_max_secs.is_finite() || t.delay_min_secs > t.delay_max_secs {
            return Err(ScoutError::Config(format!(
                "delay window is inverted: {} > {}",
                t.delay_min_secs, t.delay_max_secs
            )));
        }
        if self.catalog.iter().all(|m| m.trim().is_empty()) {
            return Err(ScoutError::Config("catalog is empty".to_string()));
        }
        for profile in [&self.amazon, &self.flipkart] {
            url::Url::parse(&profile.base_url)?;
        }
        if self.amazon.source != Source::Amazon || self.flipkart.source != Source::Flipkart {
            return Err(ScoutError::Config(
                "source profiles are attached to the wrong source".to_string(),
            ));
        }
        Ok(())
    }

    /// Profile configured for `source`.
    pub fn profile(&self, source: Source) -> &SourceProfile {
        match source {
            Source::Amazon => &self.amazon,
            Source::Flipkart => &self.flipkart,
        }
    }

    /// Per-source artifact path, e.g. `data/raw/amazon_data.json`.
    pub fn raw_output_path(&self, source: Source) -> PathBuf {
        self.output_dir
            .join("raw")
            .join(format!("{}_data.json", source.as_str()))
    }

    /// Combined artifact path.
    pub fn combined_output_path(&self) -> PathBuf {
        self.output_dir.join("combined_phone_data.json")
    }

    /// Combined artifact as a flat table for the dashboard.
    pub fn combined_csv_path(&self) -> PathBuf {
        self.combined_output_path().with_extension("csv")
    }
}
