//! Command implementations behind the `phone-scout` subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use phone_scout::export::{read_source_records, write_combined_csv, write_json};
use phone_scout::{
    run_collectors, Aggregator, CanonicalRecord, CollectionReport, NoDelay, ScoutConfig, Source,
    SourceCollector, SourceRecord,
};

fn build_collector(
    config: &ScoutConfig,
    source: Source,
    no_delay: bool,
) -> Result<SourceCollector> {
    let collector = SourceCollector::from_config(config, source)
        .with_context(|| format!("building {source} collector"))?;
    Ok(if no_delay {
        collector.with_pacer(Arc::new(NoDelay))
    } else {
        collector
    })
}

fn print_report(report: &CollectionReport) {
    println!(
        "{:<9} {:>3} records | {:>3} searched | {:>3} no match | {:>3} failed | {:>3} skipped",
        report.source.as_str(),
        report.records.len(),
        report.searched,
        report.no_match,
        report.search_failures,
        report.skipped
    );
}

fn print_combined(rows: &[CanonicalRecord]) {
    for row in rows {
        let price = row
            .price_inr
            .map(|p| format!("₹{p}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<28} {:>10}  popularity {:>10.1}",
            row.model_name, price, row.popularity_score
        );
    }
}

/// Collect, merge, and write every artifact. With `only`, collect and write
/// that one source.
pub async fn run(config: &ScoutConfig, only: Option<Source>, no_delay: bool) -> Result<()> {
    config.validate()?;

    if let Some(source) = only {
        let collector = build_collector(config, source, no_delay)?;
        let report = collector.collect(&config.catalog).await;
        write_json(&config.raw_output_path(source), &report.records)?;
        print_report(&report);
        return Ok(());
    }

    let amazon = build_collector(config, Source::Amazon, no_delay)?;
    let flipkart = build_collector(config, Source::Flipkart, no_delay)?;
    let output = run_collectors(&amazon, &flipkart, config).await;

    for source in Source::ALL {
        let report = output.report(source);
        write_json(&config.raw_output_path(source), &report.records)?;
        print_report(report);
    }
    write_json(&config.combined_output_path(), &output.combined)?;
    write_combined_csv(&config.combined_csv_path(), &output.combined)?;
    print_combined(&output.combined);
    Ok(())
}

/// Re-merge two saved per-source artifacts. The CSV table is written next to
/// the JSON output.
pub fn merge(
    config: &ScoutConfig,
    amazon: Option<&Path>,
    flipkart: Option<&Path>,
    out: Option<&Path>,
) -> Result<Vec<CanonicalRecord>> {
    let amazon_path = amazon
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.raw_output_path(Source::Amazon));
    let flipkart_path = flipkart
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.raw_output_path(Source::Flipkart));

    let amazon_records = read_optional(&amazon_path)?;
    let flipkart_records = read_optional(&flipkart_path)?;

    let rows = Aggregator::new(config.primary_source).merge(
        &amazon_records,
        &flipkart_records,
        &config.catalog,
    );

    let out: PathBuf = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.combined_output_path());
    write_json(&out, &rows)?;
    write_combined_csv(&out.with_extension("csv"), &rows)?;
    print_combined(&rows);
    Ok(rows)
}

/// A missing artifact is a source with nothing to say, not an error.
fn read_optional(path: &Path) -> Result<Vec<SourceRecord>> {
    if !path.exists() {
        tracing::warn!("{} not found, treating as empty", path.display());
        return Ok(Vec::new());
    }
    read_source_records(path).with_context(|| format!("reading {}", path.display()))
}

/// Print the catalog and which sources will search each model.
pub fn catalog(config: &ScoutConfig, json: bool) -> Result<()> {
    if json {
        let rows: Vec<serde_json::Value> = config
            .catalog
            .iter()
            .map(|model| {
                serde_json::json!({
                    "model_name": model,
                    "amazon": config.amazon.is_eligible(model),
                    "flipkart": config.flipkart.is_eligible(model),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for model in &config.catalog {
        let sources: Vec<&str> = Source::ALL
            .iter()
            .filter(|s| config.profile(**s).is_eligible(model))
            .map(|s| s.as_str())
            .collect();
        println!("{model:<28} {}", sources.join(", "));
    }
    Ok(())
}
