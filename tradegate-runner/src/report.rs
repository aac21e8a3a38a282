//! Scan report export — JSON and CSV.
//!
//! - **JSON**: the full scan report, every decision with its factor breakdown
//! - **CSV**: one row per symbol for spreadsheets

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::scanner::{ScanResult, ScanSummary};

/// Bumped when the JSON layout changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub schema_version: u32,
    pub provider: String,
    pub summary: ScanSummary,
    pub results: Vec<ScanResult>,
}

impl ScanReport {
    pub fn new(provider: impl Into<String>, results: Vec<ScanResult>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            provider: provider.into(),
            summary: ScanSummary::of(&results),
            results,
        }
    }
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize scan report to JSON")
}

/// Parse a report, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScanReport> {
    let report: ScanReport =
        serde_json::from_str(json).context("failed to deserialize scan report from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: symbol, classification, direction, allowed, score, label,
/// stale_levels, reason, fingerprint
pub fn export_csv(results: &[ScanResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "classification",
        "direction",
        "allowed",
        "score",
        "label",
        "stale_levels",
        "reason",
        "fingerprint",
    ])?;

    for r in results {
        let d = &r.decision;
        wtr.write_record([
            r.symbol.clone(),
            r.classification.to_string(),
            r.direction.map(|d| d.to_string()).unwrap_or_default(),
            d.allowed.to_string(),
            d.confidence.score.to_string(),
            d.confidence.label.to_string(),
            d.stale_levels.to_string(),
            d.reason.clone(),
            d.fingerprint(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write a report, choosing the format from the file extension
/// (`.json` or `.csv`).
pub fn write_report(path: &Path, report: &ScanReport) -> Result<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => export_json(report)?,
        Some("csv") => export_csv(&report.results)?,
        other => bail!(
            "unsupported report extension {:?} for {} (use .json or .csv)",
            other.unwrap_or(""),
            path.display()
        ),
    };
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
