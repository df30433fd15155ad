//! Artifacts: one JSON file per source, and the combined rows as JSON and as
//! a flat CSV table for the dashboard.

use std::fmt::Display;
use std::path::Path;

use serde::Serialize;

use crate::types::{CanonicalRecord, ScoutResult, SourceRecord};

/// Header of the combined CSV, in column order.
pub const COMBINED_COLUMNS: &[&str] = &[
    "model_name",
    "price_inr",
    "rating_amazon",
    "review_count_amazon",
    "rating_flipkart",
    "review_count_flipkart",
    "url_amazon",
    "url_flipkart",
    "features",
    "colors",
    "storage_options",
    "processor",
    "os_version",
    "specs",
    "popularity_score",
    "best_2025_flag",
];

/// Pretty-print `records` to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, records: &[T]) -> ScoutResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    tracing::info!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Write combined rows as CSV. List fields are joined with `", "`, specs as
/// `"key: value; key: value"`, and absent values are empty cells.
pub fn write_combined_csv(path: &Path, rows: &[CanonicalRecord]) -> ScoutResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COMBINED_COLUMNS)?;
    for row in rows {
        writer.write_record(csv_row(row))?;
    }
    writer.flush()?;
    tracing::info!("Saved {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn csv_row(row: &CanonicalRecord) -> Vec<String> {
    let specs = row
        .specs
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ");
    vec![
        row.model_name.clone(),
        cell(row.price_inr),
        cell(row.rating_amazon),
        cell(row.review_count_amazon),
        cell(row.rating_flipkart),
        cell(row.review_count_flipkart),
        cell(row.url_amazon.as_deref()),
        cell(row.url_flipkart.as_deref()),
        row.features.join(", "),
        join(&row.colors),
        join(&row.storage_options),
        cell(row.processor.as_deref()),
        cell(row.os_version.as_deref()),
        specs,
        row.popularity_score.to_string(),
        cell(row.best_pick.as_deref()),
    ]
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a per-source artifact written by [`write_json`].
pub fn read_source_records(path: &Path) -> ScoutResult<Vec<SourceRecord>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
