// src/enrichment.rs
//! Finding enrichment.
//!
//! Attaches CVE identifiers, exploit/patch/disclosure flags, external
//! references, affected systems and compliance impact to the raw findings
//! a backend produced. All sampling constants live in
//! [`EnrichmentPolicy`]; they are policy, not contract, and every random
//! draw goes through the engine's own seedable generator so the rest of
//! the pipeline stays deterministic given this component's output.

use crate::backend::RawFinding;
use crate::catalog;
use crate::models::{Finding, Reference, Severity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use uuid::Uuid;

/// Severity-keyed sampling constants.
#[derive(Debug, Clone)]
pub struct EnrichmentPolicy {
    /// Probability a medium finding gets a CVE id. Critical and high are
    /// always eligible, low never.
    pub medium_cve_probability: f64,
    /// Exploit availability probability per severity; low is always false.
    pub exploit_probability_critical: f64,
    pub exploit_probability_high: f64,
    pub exploit_probability_medium: f64,
    /// Severity-independent flags.
    pub patch_probability: f64,
    pub disclosure_probability: f64,
    /// Probability of attaching each matching topic reference.
    pub topic_reference_probability: f64,
    /// Probability of attaching each generic database reference.
    pub generic_reference_probability: f64,
    /// Per-standard probability of recording a compliance impact.
    pub compliance_impact_probability: f64,
}

impl Default for EnrichmentPolicy {
    fn default() -> Self {
        Self {
            medium_cve_probability: 0.4,
            exploit_probability_critical: 0.7,
            exploit_probability_high: 0.5,
            exploit_probability_medium: 0.25,
            patch_probability: 0.8,
            disclosure_probability: 0.5,
            topic_reference_probability: 0.9,
            generic_reference_probability: 0.5,
            compliance_impact_probability: 0.35,
        }
    }
}

pub struct FindingEnrichmentEngine {
    policy: EnrichmentPolicy,
    rng: Mutex<StdRng>,
}

impl FindingEnrichmentEngine {
    pub fn new(policy: EnrichmentPolicy) -> Self {
        Self { policy, rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Seeded constructor for reproducible enrichment.
    pub fn seeded(policy: EnrichmentPolicy, seed: u64) -> Self {
        Self { policy, rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// Enriches raw findings into their final, immutable form.
    /// `compliance_standards` may be empty, in which case no compliance
    /// impact is recorded.
    pub fn enrich(&self, raw_findings: &[RawFinding], compliance_standards: &[String]) -> Vec<Finding> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        raw_findings
            .iter()
            .map(|raw| self.enrich_one(&mut rng, raw, compliance_standards))
            .collect()
    }

    fn enrich_one(
        &self,
        rng: &mut StdRng,
        raw: &RawFinding,
        compliance_standards: &[String],
    ) -> Finding {
        Finding {
            id: Uuid::new_v4().to_string(),
            name: raw.name.clone(),
            description: raw.description.clone(),
            severity: raw.severity,
            location: raw.location.clone(),
            remediation: raw.remediation.clone(),
            detailed_remediation: raw.detailed_remediation.clone(),
            cve_ids: self.sample_cves(rng, raw.severity),
            exploit_available: self.sample_exploit(rng, raw.severity),
            publicly_disclosed: rng.gen_bool(self.policy.disclosure_probability),
            patch_available: rng.gen_bool(self.policy.patch_probability),
            references: self.sample_references(rng, &raw.name),
            affected_systems: Self::sample_affected_systems(rng),
            compliance_impact: self.sample_compliance_impact(rng, compliance_standards),
        }
    }

    fn sample_cves(&self, rng: &mut StdRng, severity: Severity) -> Vec<String> {
        let count = match severity {
            Severity::Critical | Severity::High => rng.gen_range(1..=3),
            Severity::Medium => {
                if rng.gen_bool(self.policy.medium_cve_probability) { 1 } else { 0 }
            }
            Severity::Low => 0,
        };
        (0..count)
            .map(|_| {
                let year = rng.gen_range(2019..=2024);
                let number = rng.gen_range(1000..=49999);
                format!("CVE-{}-{}", year, number)
            })
            .collect()
    }

    fn sample_exploit(&self, rng: &mut StdRng, severity: Severity) -> bool {
        let probability = match severity {
            Severity::Critical => self.policy.exploit_probability_critical,
            Severity::High => self.policy.exploit_probability_high,
            Severity::Medium => self.policy.exploit_probability_medium,
            Severity::Low => return false,
        };
        rng.gen_bool(probability)
    }

    fn sample_references(&self, rng: &mut StdRng, name: &str) -> Vec<Reference> {
        let name_lower = name.to_lowercase();
        let mut references = Vec::new();

        for topic in catalog::TOPIC_REFERENCES {
            if name_lower.contains(&topic.keyword.to_lowercase())
                && rng.gen_bool(self.policy.topic_reference_probability)
            {
                references.push(Reference {
                    url: topic.url.to_string(),
                    title: topic.title.to_string(),
                });
            }
        }
        for (url, title) in catalog::GENERIC_REFERENCES {
            if rng.gen_bool(self.policy.generic_reference_probability) {
                references.push(Reference { url: url.to_string(), title: title.to_string() });
            }
        }
        references
    }

    /// Draws 1 to 3 unique systems without replacement.
    fn sample_affected_systems(rng: &mut StdRng) -> Vec<String> {
        let mut pool: Vec<&str> = catalog::AFFECTED_SYSTEMS.to_vec();
        let max = pool.len().min(3);
        let count = rng.gen_range(1..=max);
        (0..count)
            .map(|_| pool.swap_remove(rng.gen_range(0..pool.len())).to_string())
            .collect()
    }

    fn sample_compliance_impact(&self, rng: &mut StdRng, standards: &[String]) -> Vec<String> {
        standards
            .iter()
            .filter(|_| rng.gen_bool(self.policy.compliance_impact_probability))
            .map(|standard| format!("{} - compliance degraded", standard))
            .collect()
    }
}
