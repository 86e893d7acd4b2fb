// src/compliance.rs
//! Compliance scoring.
//!
//! Per scan: synthesizes check results for each requested standard.
//! Across scans: folds every compliance result in the history into a
//! portfolio pass rate plus a short list of standards for display.

use crate::models::{ComplianceResult, ScanRecord};
use rand::Rng;

/// Portfolio-level view over every scan that carries compliance results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioCompliance {
    /// Rounded mean of every individual pass rate.
    pub pass_rate: u8,
    /// Number of compliance results folded in.
    pub result_count: usize,
    /// Distinct standards in first-seen order (newest scan first), capped
    /// at five, each paired with its most recent pass rate.
    pub top_standards: Vec<(String, u8)>,
}

const TOP_STANDARDS_CAP: usize = 5;

pub struct ComplianceScoringAggregator;

impl ComplianceScoringAggregator {
    /// Synthesizes per-standard check results for one scan.
    ///
    /// Check totals and pass counts are drawn from bounded ranges; the
    /// `passed + failed == total` invariant is enforced by construction.
    pub fn score_scan<R: Rng>(standards: &[String], rng: &mut R) -> Vec<ComplianceResult> {
        standards
            .iter()
            .map(|standard| {
                let total = rng.gen_range(12..=48);
                let passed = rng.gen_range(total * 6 / 10..=total);
                ComplianceResult::new(standard.clone(), total, passed)
            })
            .collect()
    }

    /// Aggregates compliance results across scan history.
    ///
    /// `records` is expected newest-first, as the history store returns
    /// it; the first occurrence of a standard is therefore its most
    /// recent. Returns `None` when no record carries any results, since
    /// an unconfigured portfolio is not an error.
    pub fn portfolio(records: &[ScanRecord]) -> Option<PortfolioCompliance> {
        let flattened: Vec<&ComplianceResult> = records
            .iter()
            .flat_map(|record| record.compliance_results.iter())
            .collect();

        if flattened.is_empty() {
            return None;
        }

        let sum: u32 = flattened.iter().map(|r| r.pass_rate as u32).sum();
        let pass_rate = (sum as f64 / flattened.len() as f64).round() as u8;

        let mut top_standards: Vec<(String, u8)> = Vec::new();
        for result in &flattened {
            if top_standards.len() == TOP_STANDARDS_CAP {
                break;
            }
            if !top_standards.iter().any(|(name, _)| name == &result.standard) {
                top_standards.push((result.standard.clone(), result.pass_rate));
            }
        }

        Some(PortfolioCompliance { pass_rate, result_count: flattened.len(), top_standards })
    }
}
