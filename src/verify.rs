//! Feed Verification Module
//!
//! Fetches every registered feed once and reports which ones are reachable,
//! how many samples they returned and which fields they carry. Run it before
//! relying on a new base URL or replay directory.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feeds::FEED_REGISTRY;
use crate::ingest::{FeedSource, normalize};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: DateTime<Utc>,
    pub feed_results: Vec<FeedVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedVerification {
    pub feed: &'static str,
    pub status: VerificationStatus,
    pub reachable: bool,
    pub sample_count: usize,
    pub fields_available: Vec<String>,
    /// Samples whose time column was absent or unparseable.
    pub missing_timestamps: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Single feed
// ============================================================================

/// Checks one registered feed.
///
/// Reachable with samples is `Success`; reachable but empty, or with samples
/// lacking timestamps, is `PartialSuccess`.
pub fn verify_feed(source: &impl FeedSource, spec: &crate::feeds::FeedSpec) -> FeedVerification {
    let mut result = FeedVerification {
        feed: spec.id,
        status: VerificationStatus::Failed,
        reachable: false,
        sample_count: 0,
        fields_available: Vec::new(),
        missing_timestamps: 0,
        error_message: None,
    };

    match source.fetch_payload(spec.feed) {
        Ok(payload) => {
            result.reachable = true;
            let series = normalize(&payload, spec.time_key);
            result.sample_count = series.len();
            result.missing_timestamps = series.points.iter().filter(|p| p.timestamp.is_none()).count();

            let mut fields: Vec<String> = series
                .points
                .iter()
                .flat_map(|p| p.fields.keys().chain(p.tags.keys()))
                .cloned()
                .collect();
            fields.sort();
            fields.dedup();
            result.fields_available = fields;

            result.status = if result.sample_count > 0 && result.missing_timestamps == 0 {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(source: &impl FeedSource) -> VerificationReport {
    run_full_verification_at(source, Utc::now())
}

pub fn run_full_verification_at(source: &impl FeedSource, now: DateTime<Utc>) -> VerificationReport {
    let mut summary = VerificationSummary {
        total: FEED_REGISTRY.len(),
        ..VerificationSummary::default()
    };

    let feed_results: Vec<FeedVerification> = FEED_REGISTRY
        .iter()
        .map(|spec| {
            let result = verify_feed(source, spec);
            match result.status {
                VerificationStatus::Success | VerificationStatus::PartialSuccess => {
                    summary.working += 1
                }
                VerificationStatus::Failed => summary.failed += 1,
            }
            result
        })
        .collect();

    VerificationReport {
        timestamp: now,
        feed_results,
        summary,
    }
}

pub fn print_summary(report: &VerificationReport) {
    println!("═══════════════════════════════════════════════════════════");
    println!("FEED VERIFICATION SUMMARY ({})", report.timestamp.to_rfc3339());
    println!("═══════════════════════════════════════════════════════════");

    for result in &report.feed_results {
        match result.status {
            VerificationStatus::Success => {
                println!("  ✓ {:<24} OK ({} samples)", result.feed, result.sample_count)
            }
            VerificationStatus::PartialSuccess => println!(
                "  ⚠ {:<24} Partial ({} samples, {} without timestamp)",
                result.feed, result.sample_count, result.missing_timestamps
            ),
            VerificationStatus::Failed => println!(
                "  ✗ {:<24} FAILED: {}",
                result.feed,
                result.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
    }

    let success_rate = if report.summary.total > 0 {
        (report.summary.working as f64 / report.summary.total as f64) * 100.0
    } else {
        0.0
    };
    println!();
    println!(
        "Overall Success Rate: {:.1}% ({}/{}, {} failed)",
        success_rate, report.summary.working, report.summary.total, report.summary.failed
    );
    println!("═══════════════════════════════════════════════════════════");
}
