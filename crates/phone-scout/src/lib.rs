//! phone-scout: paced collection of phone listings from two retailers,
//! normalized into per-source records and merged into one row per model.

pub mod aggregate;
pub mod clean;
pub mod collector;
pub mod config;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod matcher;
pub mod pacing;
pub mod pipeline;
pub mod types;

pub use aggregate::{popularity_score, Aggregator};
pub use clean::{clean_price, clean_rating, clean_review_count};
pub use collector::{CollectionReport, ModelOutcome, SourceCollector};
pub use config::{ScoutConfig, SourceProfile, TimingConfig};
pub use extract::{AmazonExtractor, Extractor, FlipkartExtractor};
pub use fetch::{FetchClient, FetchFailure, FetchFailureReason};
pub use matcher::ModelMatcher;
pub use pacing::{NoDelay, Pacer, RandomDelay};
pub use pipeline::{run_collectors, run_pipeline, PipelineOutput};
pub use types::*;
