//! End-to-end run: both collectors concurrently, then the merge.

use crate::aggregate::Aggregator;
use crate::collector::{CollectionReport, SourceCollector};
use crate::config::ScoutConfig;
use crate::types::{CanonicalRecord, ScoutResult, Source};

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub amazon: CollectionReport,
    pub flipkart: CollectionReport,
    pub combined: Vec<CanonicalRecord>,
}

impl PipelineOutput {
    pub fn report(&self, source: Source) -> &CollectionReport {
        match source {
            Source::Amazon => &self.amazon,
            Source::Flipkart => &self.flipkart,
        }
    }
}

/// Run both collectors from `config` and merge their records.
pub async fn run_pipeline(config: &ScoutConfig) -> ScoutResult<PipelineOutput> {
    config.validate()?;
    let amazon = SourceCollector::from_config(config, Source::Amazon)?;
    let flipkart = SourceCollector::from_config(config, Source::Flipkart)?;
    Ok(run_collectors(&amazon, &flipkart, config).await)
}

/// Run two prepared collectors concurrently and merge.
///
/// Each collector keeps its own pacing; the merge starts only after both
/// have finished.
pub async fn run_collectors(
    amazon: &SourceCollector,
    flipkart: &SourceCollector,
    config: &ScoutConfig,
) -> PipelineOutput {
    let (amazon, flipkart) = tokio::join!(
        amazon.collect(&config.catalog),
        flipkart.collect(&config.catalog)
    );

    let combined = Aggregator::new(config.primary_source).merge(
        &amazon.records,
        &flipkart.records,
        &config.catalog,
    );
    tracing::info!(
        "Merged {} canonical records ({} amazon, {} flipkart)",
        combined.len(),
        amazon.records.len(),
        flipkart.records.len()
    );

    PipelineOutput {
        amazon,
        flipkart,
        combined,
    }
}
