// src/service.rs
//! Public facade of the tracking subsystem.
//!
//! `ScanTracker` accepts requests, spawns one lifecycle controller per
//! accepted scan, exposes the query surface over the history store and
//! hands out finite progress streams. Cancellation is a synchronous
//! check: it is rejected outright while a scan is non-terminal.

use crate::backend::{ScanBackend, SimulatedBackend};
use crate::compliance::{ComplianceScoringAggregator, PortfolioCompliance};
use crate::enrichment::{EnrichmentPolicy, FindingEnrichmentEngine};
use crate::error::TrackerError;
use crate::lifecycle::controller::{ScanLifecycleController, ScanRegistry, SubscriberHub, TickPolicy};
use crate::models::{ProgressUpdate, ScanRecord, ScanRequest, StatusLogEntry};
use crate::store::{ScanFilter, ScanHistoryStore};
use crate::validator::ScanRequestValidator;
use chrono::Utc;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

/// Tunable policy for the whole tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub tick: TickPolicy,
    /// Standards scored on every completed scan. May be empty, in which
    /// case no compliance results are produced and portfolio aggregation
    /// is skipped.
    pub compliance_standards: Vec<String>,
    pub enrichment: EnrichmentPolicy,
    /// Buffer size of each subscriber channel. Large enough to hold every
    /// update a scan can emit, so a slow consumer never stalls a tick.
    pub channel_capacity: usize,
    /// Seed for all stochastic components; None draws from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick: TickPolicy::default(),
            compliance_standards: vec![
                "PCI DSS".to_string(),
                "GDPR".to_string(),
                "ISO 27001".to_string(),
            ],
            enrichment: EnrichmentPolicy::default(),
            channel_capacity: 256,
            rng_seed: None,
        }
    }
}

pub struct ScanTracker {
    config: TrackerConfig,
    store: Arc<ScanHistoryStore>,
    backend: Arc<dyn ScanBackend>,
    enrichment: Arc<FindingEnrichmentEngine>,
    registry: ScanRegistry,
    scan_counter: AtomicU64,
}

impl ScanTracker {
    /// Tracker with the simulated reference backend.
    pub fn new(config: TrackerConfig) -> Self {
        let backend: Arc<dyn ScanBackend> = match config.rng_seed {
            Some(seed) => Arc::new(SimulatedBackend::seeded(seed)),
            None => Arc::new(SimulatedBackend::new()),
        };
        Self::with_backend(config, backend)
    }

    /// Tracker with a caller-provided execution backend.
    pub fn with_backend(config: TrackerConfig, backend: Arc<dyn ScanBackend>) -> Self {
        let enrichment = match config.rng_seed {
            Some(seed) => FindingEnrichmentEngine::seeded(config.enrichment.clone(), seed),
            None => FindingEnrichmentEngine::new(config.enrichment.clone()),
        };
        Self {
            config,
            store: Arc::new(ScanHistoryStore::new()),
            backend,
            enrichment: Arc::new(enrichment),
            registry: Arc::new(RwLock::new(HashMap::new())),
            scan_counter: AtomicU64::new(0),
        }
    }

    /// Validates a request, creates the record in `Initializing` state and
    /// spawns its lifecycle controller. Returns a snapshot of the new
    /// record; progress continues asynchronously.
    pub async fn submit_scan(&self, request: ScanRequest) -> Result<ScanRecord, TrackerError> {
        let config = ScanRequestValidator::validate(&request).map_err(TrackerError::Validation)?;

        let scan_id = Uuid::new_v4().to_string();
        let mut record = ScanRecord::new(scan_id.clone(), &config);
        record.status_log.push(StatusLogEntry {
            percent: 0,
            message: "initializing scan".to_string(),
            at: Utc::now(),
        });
        let snapshot = record.clone();
        self.store.create(record).await;

        let hub: SubscriberHub = Arc::new(Mutex::new(Vec::new()));
        self.registry.write().await.insert(scan_id.clone(), hub.clone());

        let controller = ScanLifecycleController::new(
            scan_id.clone(),
            config,
            self.store.clone(),
            self.backend.clone(),
            self.enrichment.clone(),
            self.config.compliance_standards.clone(),
            self.config.tick.clone(),
            hub,
            self.registry.clone(),
            self.controller_rng(),
        );
        tokio::spawn(controller.run());

        info!("accepted scan {} ({})", scan_id, snapshot.name);
        Ok(snapshot)
    }

    /// Finite stream of progress updates for one scan. The stream ends
    /// when the scan reaches a terminal state; subscribing to an already
    /// terminal scan yields a single terminal snapshot.
    pub async fn subscribe(
        &self,
        scan_id: &str,
    ) -> Result<ReceiverStream<ProgressUpdate>, TrackerError> {
        // clone the hub out so the registry lock is not held while
        // registering the subscriber
        let hub = self.registry.read().await.get(scan_id).cloned();
        if let Some(hub) = hub {
            let (tx, rx) = mpsc::channel(self.config.channel_capacity);
            hub.lock().await.push(tx);
            return Ok(ReceiverStream::new(rx));
        }

        let record = self
            .store
            .get(scan_id)
            .await
            .ok_or_else(|| TrackerError::NotFound(scan_id.to_string()))?;
        let last = record.status_log.last();
        let (tx, rx) = mpsc::channel(1);
        let _ = tx
            .send(ProgressUpdate {
                scan_id: record.id.clone(),
                percent: last.map(|e| e.percent).unwrap_or(0),
                status: record.status,
                message: last.map(|e| e.message.clone()).unwrap_or_default(),
            })
            .await;
        Ok(ReceiverStream::new(rx))
    }

    /// Cancellation guard: a scan that has started always runs to a
    /// terminal state. Closing is only permitted once it gets there.
    pub async fn close_scan(&self, scan_id: &str) -> Result<(), TrackerError> {
        let record = self
            .store
            .get(scan_id)
            .await
            .ok_or_else(|| TrackerError::NotFound(scan_id.to_string()))?;
        if !record.status.is_terminal() {
            return Err(TrackerError::IllegalTransition {
                id: scan_id.to_string(),
                status: record.status,
            });
        }
        Ok(())
    }

    pub async fn list_scans(&self, filter: &ScanFilter) -> Vec<ScanRecord> {
        self.store.list(filter).await
    }

    pub async fn get_scan(&self, scan_id: &str) -> Option<ScanRecord> {
        self.store.get(scan_id).await
    }

    pub async fn delete_scan(&self, scan_id: &str) -> bool {
        self.store.delete(scan_id).await
    }

    /// Portfolio compliance across the whole history; `None` when no scan
    /// carries compliance results.
    pub async fn portfolio_compliance(&self) -> Option<PortfolioCompliance> {
        let records = self.store.list(&ScanFilter::default()).await;
        ComplianceScoringAggregator::portfolio(&records)
    }

    /// Per-scan RNG: derived from the configured seed so test runs are
    /// reproducible, distinct per scan so concurrent scans differ.
    fn controller_rng(&self) -> StdRng {
        let n = self.scan_counter.fetch_add(1, Ordering::Relaxed);
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for ScanTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
