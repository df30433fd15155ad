//! Per-source collection: search, pick the first matching candidate, enrich it
//! from the detail page, and emit at most one record per catalog model.
//!
//! Failures never leave this module. A failed search or an unmatched model
//! becomes an absent record plus a counter in the [`CollectionReport`]; a
//! failed detail fetch keeps the record with an empty enrichment bundle.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clean::{clean_price, clean_rating, clean_review_count};
use crate::config::{ScoutConfig, SourceProfile};
use crate::extract::{AmazonExtractor, Extractor, FlipkartExtractor};
use crate::fetch::{FetchClient, FetchFailure};
use crate::matcher::ModelMatcher;
use crate::pacing::{Pacer, RandomDelay};
use crate::types::{Candidate, EnrichmentBundle, ScoutResult, Source, SourceRecord};

/// What happened to one catalog model at one source.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    /// The model lacks the source's required marker and was not searched.
    Skipped,
    /// A candidate matched. `detail_failure` is set when enrichment was lost.
    Matched {
        record: Box<SourceRecord>,
        detail_failure: Option<FetchFailure>,
    },
    /// The search page had no candidate whose title matched.
    NoMatch,
    /// The search request itself failed.
    SearchFailed(FetchFailure),
}

impl ModelOutcome {
    pub fn record(&self) -> Option<&SourceRecord> {
        match self {
            ModelOutcome::Matched { record, .. } => Some(record.as_ref()),
            _ => None,
        }
    }
}

/// Records and counters from one pass over the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub source: Source,
    pub records: Vec<SourceRecord>,
    pub searched: usize,
    pub skipped: usize,
    pub matched: usize,
    pub no_match: usize,
    pub search_failures: usize,
    pub detail_failures: usize,
    pub requests: usize,
}

impl CollectionReport {
    fn new(source: Source) -> Self {
        Self {
            source,
            records: Vec::new(),
            searched: 0,
            skipped: 0,
            matched: 0,
            no_match: 0,
            search_failures: 0,
            detail_failures: 0,
            requests: 0,
        }
    }
}

/// Request counter for one run; pacing applies before every request but the first.
#[derive(Debug, Default)]
struct Schedule {
    issued: usize,
}

/// Collector for one retailer.
///
/// Holds its own fetch client and pacing policy, so two collectors can run
/// concurrently without sharing anything.
pub struct SourceCollector {
    profile: SourceProfile,
    client: FetchClient,
    extractor: Box<dyn Extractor>,
    matcher: ModelMatcher,
    pacer: Arc<dyn Pacer>,
}

impl SourceCollector {
    pub fn new(
        profile: SourceProfile,
        client: FetchClient,
        extractor: Box<dyn Extractor>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            profile,
            client,
            extractor,
            matcher: ModelMatcher::default(),
            pacer,
        }
    }

    /// Build the collector for `source` from a run configuration.
    ///
    /// The configuration is validated first.
    pub fn from_config(config: &ScoutConfig, source: Source) -> ScoutResult<Self> {
        config.validate()?;
        let profile = config.profile(source).clone();
        let extractor: Box<dyn Extractor> = match source {
            Source::Amazon => Box::new(AmazonExtractor::new(&profile.base_url)?),
            Source::Flipkart => Box::new(FlipkartExtractor::new(&profile.base_url)?),
        };
        let (min, max) = config.timing.delay_window();
        let collector = Self::new(
            profile,
            FetchClient::new(config.timing.timeout()),
            extractor,
            Arc::new(RandomDelay::new(min, max)),
        )
        .with_matcher(ModelMatcher::new(&config.brand_prefix));
        Ok(collector)
    }

    pub fn with_matcher(mut self, matcher: ModelMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn source(&self) -> Source {
        self.profile.source
    }

    /// Collect every catalog model in order, pacing between requests.
    pub async fn collect(&self, catalog: &[String]) -> CollectionReport {
        let source = self.source();
        let mut report = CollectionReport::new(source);
        let mut schedule = Schedule::default();

        info!("{source}: starting collection of {} models", catalog.len());

        for (idx, model) in catalog.iter().enumerate() {
            debug!("{source} [{}/{}] {model}", idx + 1, catalog.len());
            match self.collect_scheduled(model, &mut schedule).await {
                ModelOutcome::Skipped => report.skipped += 1,
                ModelOutcome::Matched {
                    record,
                    detail_failure,
                } => {
                    report.searched += 1;
                    report.matched += 1;
                    if detail_failure.is_some() {
                        report.detail_failures += 1;
                    }
                    report.records.push(*record);
                }
                ModelOutcome::NoMatch => {
                    report.searched += 1;
                    report.no_match += 1;
                }
                ModelOutcome::SearchFailed(_) => {
                    report.searched += 1;
                    report.search_failures += 1;
                }
            }
        }

        report.requests = schedule.issued;
        info!(
            "{source}: collection complete, {} records from {} searches ({} no match, {} failed, {} skipped)",
            report.records.len(),
            report.searched,
            report.no_match,
            report.search_failures,
            report.skipped
        );
        report
    }

    /// Collect a single model as the first request of a fresh run.
    pub async fn collect_model(&self, model: &str) -> ModelOutcome {
        self.collect_scheduled(model, &mut Schedule::default()).await
    }

    async fn collect_scheduled(&self, model: &str, schedule: &mut Schedule) -> ModelOutcome {
        let source = self.source();
        if !self.profile.is_eligible(model) {
            debug!("{source}: skipping {model}, missing required marker");
            return ModelOutcome::Skipped;
        }

        let search_url = self.profile.search_url();
        let query = [(self.profile.query_param.as_str(), model)];
        let body = match self.paced_fetch(schedule, &search_url, &query).await {
            Ok(body) => body,
            Err(failure) => {
                warn!("{source}: search for {model} failed: {failure}");
                return ModelOutcome::SearchFailed(failure);
            }
        };

        let candidates = self.extractor.extract_candidates(&body);
        let Some(candidate) = self.first_match(&candidates, model) else {
            info!("{source}: no match for {model} among {} candidates", candidates.len());
            return ModelOutcome::NoMatch;
        };

        let mut detail_failure = None;
        let enrichment = match candidate.detail_url.as_deref() {
            Some(url) => match self.paced_fetch(schedule, url, &[]).await {
                Ok(detail) => self.extractor.extract_detail(&detail),
                Err(failure) => {
                    warn!("{source}: detail page for {model} failed: {failure}");
                    detail_failure = Some(failure);
                    EnrichmentBundle::default()
                }
            },
            None => EnrichmentBundle::default(),
        };

        let record = self.assemble(model, candidate, enrichment);
        info!(
            "{source}: found {model}: price {} | rating {} | reviews {}",
            record
                .price_inr
                .map(|p| format!("₹{p}"))
                .unwrap_or_else(|| "n/a".to_string()),
            record.rating,
            record.review_count
        );
        ModelOutcome::Matched {
            record: Box::new(record),
            detail_failure,
        }
    }

    /// First candidate, in document order, whose title names `model`.
    fn first_match<'a>(&self, candidates: &'a [Candidate], model: &str) -> Option<&'a Candidate> {
        candidates.iter().find(|c| match c.title.as_deref() {
            Some(title) if self.matcher.matches(title, model) => true,
            Some(title) => {
                debug!("{}: rejected '{title}' for {model}", self.source());
                false
            }
            None => false,
        })
    }

    fn assemble(
        &self,
        model: &str,
        candidate: &Candidate,
        enrichment: EnrichmentBundle,
    ) -> SourceRecord {
        SourceRecord {
            model_name: model.to_string(),
            title: candidate.title.clone().unwrap_or_default(),
            price_inr: candidate.price_text.as_deref().and_then(clean_price),
            rating: candidate
                .rating_text
                .as_deref()
                .and_then(clean_rating)
                .unwrap_or(0.0),
            review_count: candidate
                .review_text
                .as_deref()
                .and_then(clean_review_count)
                .unwrap_or(0),
            url: candidate.detail_url.clone(),
            source: self.source(),
            last_updated: Utc::now(),
            enrichment,
        }
    }

    async fn paced_fetch(
        &self,
        schedule: &mut Schedule,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, FetchFailure> {
        if schedule.issued > 0 {
            self.pacer.pause().await;
        }
        schedule.issued += 1;
        self.client.fetch(url, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoDelay;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct CountingPacer {
        pauses: AtomicUsize,
    }

    #[async_trait]
    impl Pacer for CountingPacer {
        async fn pause(&self) -> Duration {
            self.pauses.fetch_add(1, Ordering::SeqCst);
            Duration::ZERO
        }
    }

    fn amazon_result(title: &str, href: &str, price: &str, rating: &str, reviews: &str) -> String {
        format!(
            r#"<div data-component-type="s-search-result">
                <h2 class="a-size-mini"><span>{title}</span></h2>
                <a class="a-link-normal s-no-outline" href="{href}">x</a>
                <span class="a-price-whole">{price}</span>
                <span class="a-icon-alt">{rating}</span>
                <span class="a-size-base s-underline-text">{reviews}</span>
            </div>"#
        )
    }

    fn amazon_collector(server: &MockServer, pacer: Arc<dyn Pacer>) -> SourceCollector {
        let mut profile = SourceProfile::amazon();
        profile.base_url = server.uri();
        let extractor = AmazonExtractor::new(&server.uri()).unwrap();
        SourceCollector::new(
            profile,
            FetchClient::new(Duration::from_secs(5)),
            Box::new(extractor),
            pacer,
        )
    }

    #[tokio::test]
    async fn test_match_skips_wrong_titles_and_enriches() {
        let server = MockServer::start().await;
        let page = format!(
            "<html><body>{}{}</body></html>",
            amazon_result("Samsung Galaxy S24 5G", "/dp/S24", "74,999.", "4.2 out of 5 stars", "900"),
            amazon_result(
                "Samsung Galaxy S24 Ultra 5G 256GB",
                "/dp/S24U",
                "1,29,999.",
                "4.5 out of 5 stars",
                "1,000"
            ),
        );
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "Samsung Galaxy S24 Ultra"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dp/S24U"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<table id="productDetails_techSpec_section_1"><tr><th>OS</th><td>Android 14</td></tr></table>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let collector = amazon_collector(&server, Arc::new(NoDelay));
        let outcome = collector.collect_model("Samsung Galaxy S24 Ultra").await;
        let record = outcome.record().expect("matched record");

        assert_eq!(record.title, "Samsung Galaxy S24 Ultra 5G 256GB");
        assert_eq!(record.price_inr, Some(129999));
        assert_eq!(record.rating, 4.5);
        assert_eq!(record.review_count, 1000);
        assert_eq!(record.url.as_deref(), Some(format!("{}/dp/S24U", server.uri()).as_str()));
        assert_eq!(record.source, Source::Amazon);
        assert_eq!(record.enrichment.os_version.as_deref(), Some("Android 14"));
    }

    #[tokio::test]
    async fn test_no_match_yields_no_record() {
        let server = MockServer::start().await;
        let page = amazon_result("Samsung Galaxy S24", "/dp/S24", "74,999", "4.2", "10");
        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let collector = amazon_collector(&server, Arc::new(NoDelay));
        assert_eq!(
            collector.collect_model("Samsung Galaxy S24 Ultra").await,
            ModelOutcome::NoMatch
        );
    }

    #[tokio::test]
    async fn test_detail_failure_keeps_record() {
        let server = MockServer::start().await;
        let page = amazon_result("Samsung Galaxy S23 FE", "/dp/S23FE", "39,999", "", "");
        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dp/S23FE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let collector = amazon_collector(&server, Arc::new(NoDelay));
        match collector.collect_model("Samsung Galaxy S23 FE").await {
            ModelOutcome::Matched {
                record,
                detail_failure,
            } => {
                assert!(detail_failure.is_some());
                assert!(record.enrichment.is_empty());
                assert_eq!(record.price_inr, Some(39999));
                assert_eq!(record.rating, 0.0);
                assert_eq!(record.review_count, 0);
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_continues_after_failures_and_paces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "Samsung Galaxy S25"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "Samsung Galaxy S24"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "Samsung Galaxy S23"))
            .respond_with(ResponseTemplate::new(200).set_body_string(amazon_result(
                "Samsung Galaxy S23 5G",
                "/dp/S23",
                "49,999",
                "4.1 out of 5 stars",
                "(2,000)",
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dp/S23"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let pacer = Arc::new(CountingPacer::default());
        let collector = amazon_collector(&server, pacer.clone());
        let catalog: Vec<String> = [
            "Samsung Galaxy S25",
            "Google Pixel 9",
            "Samsung Galaxy S24",
            "Samsung Galaxy S23",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let report = collector.collect(&catalog).await;
        assert_eq!(report.skipped, 1);
        assert_eq!(report.searched, 3);
        assert_eq!(report.search_failures, 1);
        assert_eq!(report.no_match, 1);
        assert_eq!(report.matched, 1);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].model_name, "Samsung Galaxy S23");
        assert_eq!(report.records[0].review_count, 2000);
        // Three searches and one detail fetch; every request after the first is paced.
        assert_eq!(report.requests, 4);
        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_from_config_rejects_unusable_timing() {
        let mut config = ScoutConfig::default();
        config.timing.delay_min_secs = -1.0;
        assert!(matches!(
            SourceCollector::from_config(&config, Source::Amazon),
            Err(crate::types::ScoutError::Config(_))
        ));

        let mut config = ScoutConfig::default();
        config.timing.timeout_secs = 1e20;
        assert!(SourceCollector::from_config(&config, Source::Flipkart).is_err());
    }

    #[tokio::test]
    async fn test_ineligible_model_issues_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let collector = amazon_collector(&server, Arc::new(NoDelay));
        assert_eq!(collector.collect_model("Google Pixel 9").await, ModelOutcome::Skipped);
    }
}
