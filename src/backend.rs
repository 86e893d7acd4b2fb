// src/backend.rs
//! Scan execution backend seam.
//!
//! The tracker never discovers findings itself; a backend does. The
//! reference implementation below simulates one: a deterministic shape
//! (counts always match the finding list) with a stochastic number of
//! findings per severity, drawn from the template catalog.

use crate::catalog;
use crate::error::BackendFailure;
use crate::models::{ScanConfig, Severity, SeverityCounts};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// A finding as reported by a backend, before enrichment.
#[derive(Debug, Clone)]
pub struct RawFinding {
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub location: String,
    pub remediation: String,
    pub detailed_remediation: Option<String>,
}

/// Everything a backend hands back for one finished scan.
///
/// Invariant: `severity_counts.total() == raw_findings.len()`.
#[derive(Debug, Clone)]
pub struct RawScanResult {
    pub severity_counts: SeverityCounts,
    pub raw_findings: Vec<RawFinding>,
}

/// Pluggable scan executor. A single bounded-latency call per scan; the
/// lifecycle controller invokes it once progress reaches 100%.
pub trait ScanBackend: Send + Sync {
    fn execute(&self, config: &ScanConfig) -> Result<RawScanResult, BackendFailure>;
}

/// Reference backend: draws per-severity counts from bounded ranges and
/// instantiates findings from the catalog templates.
pub struct SimulatedBackend {
    rng: Mutex<StdRng>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Seeded constructor for reproducible results.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    fn draw_findings(
        rng: &mut StdRng,
        severity: Severity,
        count: u32,
        target: &str,
    ) -> Vec<RawFinding> {
        let templates = catalog::templates_for(severity);
        (0..count)
            .map(|_| {
                let template = &templates[rng.gen_range(0..templates.len())];
                RawFinding {
                    name: template.name.to_string(),
                    description: template.description.to_string(),
                    severity,
                    location: format!("{} ({})", template.location, target),
                    remediation: template.remediation.to_string(),
                    detailed_remediation: template.detailed_remediation.map(str::to_string),
                }
            })
            .collect()
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanBackend for SimulatedBackend {
    fn execute(&self, config: &ScanConfig) -> Result<RawScanResult, BackendFailure> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        let counts = SeverityCounts {
            critical: rng.gen_range(0..=2),
            high: rng.gen_range(0..=3),
            medium: rng.gen_range(1..=5),
            low: rng.gen_range(1..=6),
        };

        let mut raw_findings = Vec::with_capacity(counts.total() as usize);
        for severity in [Severity::Critical, Severity::High, Severity::Medium, Severity::Low] {
            raw_findings.extend(Self::draw_findings(
                &mut rng,
                severity,
                counts.get(severity),
                &config.target,
            ));
        }

        Ok(RawScanResult { severity_counts: counts, raw_findings })
    }
}

/// Backend that always fails; used to exercise the `Failed` path.
pub struct FailingBackend {
    pub reason: String,
}

impl ScanBackend for FailingBackend {
    fn execute(&self, _config: &ScanConfig) -> Result<RawScanResult, BackendFailure> {
        Err(BackendFailure::Execution(self.reason.clone()))
    }
}
