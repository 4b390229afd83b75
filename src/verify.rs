//! Data Source Verification Module
//!
//! Checks every registry state's FRED series, plus the national series,
//! against the live provider to confirm each one is reachable and decodes.
//!
//! Run this when FRED changes its export format or a chart starts failing
//! for one state.

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::ingest::fred::SeriesSource;
use crate::logging;
use crate::model::SeriesId;
use crate::states::all_state_codes;

/// How many series are fetched at once during a full run.
const CONCURRENT_CHECKS: usize = 4;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<SeriesVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesVerification {
    pub series: String,
    pub name: String,
    pub status: VerificationStatus,
    pub observation_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    Failed,
}

// ============================================================================
// Verification
// ============================================================================

pub async fn verify_series(source: &dyn SeriesSource, id: SeriesId) -> SeriesVerification {
    let mut result = SeriesVerification {
        series: id.to_string(),
        name: id.label().to_string(),
        status: VerificationStatus::Failed,
        observation_count: 0,
        first_date: None,
        last_date: None,
        error_message: None,
    };

    match source.fetch(id).await {
        Ok(series) => {
            result.observation_count = series.len();
            result.first_date = series.first_date();
            result.last_date = series.last_date();
            result.status = VerificationStatus::Success;
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

/// Verify the national series and every registry state.
pub async fn run_full_verification(source: &dyn SeriesSource) -> VerificationReport {
    let ids: Vec<SeriesId> = std::iter::once(SeriesId::National)
        .chain(all_state_codes().into_iter().map(SeriesId::State))
        .collect();

    let results: Vec<SeriesVerification> = stream::iter(ids)
        .map(|id| verify_series(source, id))
        .buffered(CONCURRENT_CHECKS)
        .collect()
        .await;

    let working = results.iter().filter(|r| r.status == VerificationStatus::Success).count();
    let summary = VerificationSummary {
        total: results.len(),
        working,
        failed: results.len() - working,
    };
    logging::log_verification_summary(summary.total, summary.working, summary.failed);

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results,
        summary,
    }
}

pub fn print_summary(report: &VerificationReport) {
    println!("═══════════════════════════════════════════════════════════");
    println!("📊 FRED SERIES VERIFICATION");
    println!("═══════════════════════════════════════════════════════════");
    for r in &report.results {
        match r.status {
            VerificationStatus::Success => println!(
                "  ✓ {:<3} {:<22} {:>4} obs  {} .. {}",
                r.series,
                r.name,
                r.observation_count,
                r.first_date.map(|d| d.to_string()).unwrap_or_default(),
                r.last_date.map(|d| d.to_string()).unwrap_or_default(),
            ),
            VerificationStatus::Failed => println!(
                "  ✗ {:<3} {:<22} FAILED: {}",
                r.series,
                r.name,
                r.error_message.as_deref().unwrap_or("Unknown"),
            ),
        }
    }
    println!();
    println!(
        "Series: {}/{} working  ({} failed)",
        report.summary.working, report.summary.total, report.summary.failed
    );
    println!("═══════════════════════════════════════════════════════════");
}
