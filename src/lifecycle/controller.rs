// src/lifecycle/controller.rs
//! Async driver for one in-flight scan.
//!
//! Exactly one controller exists per record. It ticks the progress
//! machine on its own timer, writes every transition through the history
//! store, fans updates out to subscribers, and invokes the backend when
//! progress reaches 100%. The backend result is attached to the record in
//! the same store update that sets `Completed`, so observers never see a
//! completed scan without its findings.

use crate::backend::ScanBackend;
use crate::compliance::ComplianceScoringAggregator;
use crate::enrichment::FindingEnrichmentEngine;
use crate::lifecycle::progress::{ProgressEvent, ProgressMachine};
use crate::models::{ProgressUpdate, ScanConfig, ScanStatus, StatusLogEntry};
use crate::store::ScanHistoryStore;
use chrono::Utc;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex, RwLock};

/// Timing and step policy for the progress ticker.
#[derive(Debug, Clone)]
pub struct TickPolicy {
    /// Tick period.
    pub period: Duration,
    /// Inclusive bounds for the random progress increment per tick.
    pub min_step: u8,
    pub max_step: u8,
    /// Watchdog: a scan running longer than this is failed rather than
    /// ticking forever. Defensive addition; the reference behavior has no
    /// timeout.
    pub max_scan_duration: Duration,
}

impl Default for TickPolicy {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(400),
            min_step: 1,
            max_step: 5,
            max_scan_duration: Duration::from_secs(120),
        }
    }
}

/// Fan-out point for one scan's progress subscribers.
pub type SubscriberHub = Arc<Mutex<Vec<mpsc::Sender<ProgressUpdate>>>>;

/// Registry of hubs for all in-flight scans, shared with the service.
pub type ScanRegistry = Arc<RwLock<HashMap<String, SubscriberHub>>>;

pub struct ScanLifecycleController {
    scan_id: String,
    config: ScanConfig,
    store: Arc<ScanHistoryStore>,
    backend: Arc<dyn ScanBackend>,
    enrichment: Arc<FindingEnrichmentEngine>,
    standards: Vec<String>,
    policy: TickPolicy,
    hub: SubscriberHub,
    registry: ScanRegistry,
    rng: StdRng,
}

impl ScanLifecycleController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scan_id: String,
        config: ScanConfig,
        store: Arc<ScanHistoryStore>,
        backend: Arc<dyn ScanBackend>,
        enrichment: Arc<FindingEnrichmentEngine>,
        standards: Vec<String>,
        policy: TickPolicy,
        hub: SubscriberHub,
        registry: ScanRegistry,
        rng: StdRng,
    ) -> Self {
        Self {
            scan_id,
            config,
            store,
            backend,
            enrichment,
            standards,
            policy,
            hub,
            registry,
            rng,
        }
    }

    /// Drives the scan to a terminal state. Consumes the controller; a
    /// record is never driven by two controllers at once.
    pub async fn run(mut self) {
        let started = Instant::now();
        let (mut machine, initial) = ProgressMachine::new(self.config.target.clone());
        let mut last_message = initial.message;

        let mut interval = tokio::time::interval(self.policy.period);
        interval.tick().await; // consume the immediate first tick

        loop {
            interval.tick().await;

            if started.elapsed() > self.policy.max_scan_duration {
                let reason = format!(
                    "watchdog expired after {:?}",
                    self.policy.max_scan_duration
                );
                self.fail(machine.percent(), &reason, started).await;
                break;
            }

            let step = self.rng.gen_range(self.policy.min_step..=self.policy.max_step);
            let events = machine.advance(step);

            let mut terminal = None;
            let mut applied_any = false;
            for event in events {
                if event.status == ScanStatus::Completed {
                    // held back until the backend result is attached
                    terminal = Some(event);
                    continue;
                }
                last_message = event.message.clone();
                if !self.apply_event(&event).await {
                    warn!("scan {}: record deleted mid-flight, stopping", self.scan_id);
                    self.deregister().await;
                    return;
                }
                applied_any = true;
            }

            if let Some(event) = terminal {
                self.finalize(event, started).await;
                break;
            }

            if !applied_any {
                // plain tick: no threshold crossed, still report percent
                self.broadcast(ProgressUpdate {
                    scan_id: self.scan_id.clone(),
                    percent: machine.percent(),
                    status: machine.status(),
                    message: last_message.clone(),
                })
                .await;
            }
        }

        self.deregister().await;
    }

    /// Writes a non-terminal transition to the record and notifies
    /// subscribers. Returns false if the record no longer exists.
    async fn apply_event(&self, event: &ProgressEvent) -> bool {
        debug!("scan {}: {}% {}", self.scan_id, event.percent, event.message);
        let entry = StatusLogEntry {
            percent: event.percent,
            message: event.message.clone(),
            at: Utc::now(),
        };
        let status = event.status;
        let updated = self
            .store
            .update(&self.scan_id, |record| {
                record.status = status;
                record.status_log.push(entry);
            })
            .await;
        if updated {
            self.broadcast(ProgressUpdate {
                scan_id: self.scan_id.clone(),
                percent: event.percent,
                status: event.status,
                message: event.message.clone(),
            })
            .await;
        }
        updated
    }

    /// Invokes the backend, enriches and scores its result, and attaches
    /// everything together with the `Completed` transition.
    async fn finalize(&mut self, event: ProgressEvent, started: Instant) {
        match self.backend.execute(&self.config) {
            Ok(raw) => {
                let findings = self.enrichment.enrich(&raw.raw_findings, &self.standards);
                let compliance =
                    ComplianceScoringAggregator::score_scan(&self.standards, &mut self.rng);
                let counts = raw.severity_counts;
                let duration = started.elapsed();
                let entry = StatusLogEntry {
                    percent: event.percent,
                    message: event.message.clone(),
                    at: Utc::now(),
                };
                self.store
                    .update(&self.scan_id, |record| {
                        record.status = ScanStatus::Completed;
                        record.severity_counts = counts;
                        record.findings = findings;
                        record.compliance_results = compliance;
                        record.duration = Some(duration);
                        record.status_log.push(entry);
                    })
                    .await;
                info!(
                    "scan {} completed in {:?} with {} finding(s)",
                    self.scan_id,
                    duration,
                    counts.total()
                );
                self.broadcast(ProgressUpdate {
                    scan_id: self.scan_id.clone(),
                    percent: event.percent,
                    status: ScanStatus::Completed,
                    message: event.message,
                })
                .await;
            }
            Err(failure) => {
                self.fail(event.percent, &failure.to_string(), started).await;
            }
        }
    }

    /// Marks the scan `Failed`. No findings are attached; the error and
    /// duration are recorded and the final update is pushed out.
    async fn fail(&self, percent: u8, reason: &str, started: Instant) {
        error!("scan {} failed: {}", self.scan_id, reason);
        let message = format!("scan failed: {}", reason);
        let duration = started.elapsed();
        let entry = StatusLogEntry {
            percent,
            message: message.clone(),
            at: Utc::now(),
        };
        let reason = reason.to_string();
        self.store
            .update(&self.scan_id, |record| {
                record.status = ScanStatus::Failed;
                record.error = Some(reason);
                record.duration = Some(duration);
                record.status_log.push(entry);
            })
            .await;
        self.broadcast(ProgressUpdate {
            scan_id: self.scan_id.clone(),
            percent,
            status: ScanStatus::Failed,
            message,
        })
        .await;
    }

    async fn broadcast(&self, update: ProgressUpdate) {
        let mut subscribers = self.hub.lock().await;
        let mut kept = Vec::with_capacity(subscribers.len());
        for tx in subscribers.drain(..) {
            if tx.send(update.clone()).await.is_ok() {
                kept.push(tx);
            }
        }
        *subscribers = kept;
    }

    /// Drops all subscriber senders (terminating their streams) and
    /// removes this scan from the in-flight registry.
    async fn deregister(&self) {
        self.hub.lock().await.clear();
        self.registry.write().await.remove(&self.scan_id);
    }
}
