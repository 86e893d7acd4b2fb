// src/models.rs
//! Core data model for scan tracking.
//!
//! Everything here is plain data: records are mutated only through the
//! history store, and findings are immutable once the enrichment stage
//! has produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Kind of scan requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Full,
    Network,
    Api,
    Service,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Full => "full",
            ScanType::Network => "network",
            ScanType::Api => "api",
            ScanType::Service => "service",
        }
    }
}

impl FromStr for ScanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ScanType::Full),
            "network" => Ok(ScanType::Network),
            "api" => Ok(ScanType::Api),
            "service" => Ok(ScanType::Service),
            other => Err(format!("unknown scan type: {}", other)),
        }
    }
}

/// What the target string describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Ip,
    Subnet,
    Service,
    Url,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Ip => "ip",
            TargetType::Subnet => "subnet",
            TargetType::Service => "service",
            TargetType::Url => "url",
        }
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ip" => Ok(TargetType::Ip),
            "subnet" => Ok(TargetType::Subnet),
            "service" => Ok(TargetType::Service),
            "url" => Ok(TargetType::Url),
            other => Err(format!("unknown target type: {}", other)),
        }
    }
}

/// Raw scan request as submitted by a presentation layer.
///
/// Enum-valued fields arrive as strings so the validator can hand back
/// field-level errors instead of failing at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub name: String,
    pub scan_type: String,
    pub target: String,
    pub target_type: String,
}

/// Validated, typed scan configuration. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub name: String,
    pub scan_type: ScanType,
    pub target: String,
    pub target_type: TargetType,
}

/// Lifecycle state of a scan.
///
/// `Idle` (before submission) is never stored, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Initializing,
    Scanning,
    Analyzing,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Initializing => "initializing",
            ScanStatus::Scanning => "scanning",
            ScanStatus::Analyzing => "analyzing",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    /// A scan in a terminal state never transitions again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

/// Ordinal risk classification, highest risk first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Per-severity finding counts for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low
    }

    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// An external reference attached to a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub url: String,
    pub title: String,
}

/// A single detected weakness, fully enriched. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub location: String,
    pub remediation: String,
    pub detailed_remediation: Option<String>,
    pub cve_ids: Vec<String>,
    pub exploit_available: bool,
    pub publicly_disclosed: bool,
    pub patch_available: bool,
    pub references: Vec<Reference>,
    pub affected_systems: Vec<String>,
    pub compliance_impact: Vec<String>,
}

/// Result of scoring one compliance standard on one scan.
///
/// Construct through [`ComplianceResult::new`] so the check-count
/// invariant always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub standard: String,
    pub total_checks: u32,
    pub passed_checks: u32,
    pub failed_checks: u32,
    pub pass_rate: u8,
}

impl ComplianceResult {
    /// Builds a result from total and passed check counts.
    ///
    /// `passed_checks` is clamped to the total; the failed count and pass
    /// rate are derived so that `passed + failed == total` and
    /// `pass_rate == round(100 * passed / total)`.
    pub fn new(standard: impl Into<String>, total_checks: u32, passed_checks: u32) -> Self {
        let total = total_checks.max(1);
        let passed = passed_checks.min(total);
        let pass_rate = ((passed as f64 / total as f64) * 100.0).round() as u8;
        Self {
            standard: standard.into(),
            total_checks: total,
            passed_checks: passed,
            failed_checks: total - passed,
            pass_rate,
        }
    }
}

/// One entry of a scan's append-only status log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusLogEntry {
    pub percent: u8,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// A tracked scan: one record per accepted request.
///
/// Mutated only by its owning lifecycle controller through the history
/// store; removed only by explicit deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: ScanStatus,
    pub target: String,
    pub scan_type: ScanType,
    pub target_type: TargetType,
    /// Wall-clock runtime, set only once the scan reaches a terminal state.
    pub duration: Option<Duration>,
    pub severity_counts: SeverityCounts,
    pub findings: Vec<Finding>,
    pub compliance_results: Vec<ComplianceResult>,
    /// Append-only history of status messages, retained for replay.
    pub status_log: Vec<StatusLogEntry>,
    /// Backend error detail, set only on `Failed`.
    pub error: Option<String>,
}

impl ScanRecord {
    pub fn new(id: String, config: &ScanConfig) -> Self {
        Self {
            id,
            name: config.name.clone(),
            created_at: Utc::now(),
            status: ScanStatus::Initializing,
            target: config.target.clone(),
            scan_type: config.scan_type,
            target_type: config.target_type,
            duration: None,
            severity_counts: SeverityCounts::default(),
            findings: Vec::new(),
            compliance_results: Vec::new(),
            status_log: Vec::new(),
            error: None,
        }
    }
}

/// A live progress notification pushed to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub scan_id: String,
    pub percent: u8,
    pub status: ScanStatus,
    pub message: String,
}
