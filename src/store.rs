// src/store.rs
//! In-memory scan history.
//!
//! Records are kept newest-first. Each record is mutated only by its
//! owning lifecycle controller, through [`ScanHistoryStore::update`];
//! store-wide reads return cloned snapshots and never block a writer for
//! longer than the clone.

use crate::models::{ScanRecord, ScanStatus, ScanType};
use log::debug;
use tokio::sync::RwLock;

/// Filter for [`ScanHistoryStore::list`]. Absent fields match everything;
/// present fields are combined with logical AND.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Case-insensitive substring match against the record name only.
    pub text: Option<String>,
    pub status: Option<ScanStatus>,
    pub scan_type: Option<ScanType>,
}

impl ScanFilter {
    fn matches(&self, record: &ScanRecord) -> bool {
        if let Some(text) = &self.text {
            if !record.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(scan_type) = self.scan_type {
            if record.scan_type != scan_type {
                return false;
            }
        }
        true
    }
}

#[derive(Default)]
pub struct ScanHistoryStore {
    records: RwLock<Vec<ScanRecord>>,
}

impl ScanHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record at the head of the history.
    pub async fn create(&self, record: ScanRecord) {
        debug!("history: created scan {} ({})", record.id, record.name);
        self.records.write().await.insert(0, record);
    }

    pub async fn get(&self, id: &str) -> Option<ScanRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Applies `patch` to the record with the given id. Returns false if
    /// the id is unknown.
    pub async fn update<F>(&self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut ScanRecord),
    {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                patch(record);
                true
            }
            None => false,
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }

    /// Returns a filtered snapshot, newest-first. Never mutates.
    pub async fn list(&self, filter: &ScanFilter) -> Vec<ScanRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanConfig, TargetType};

    fn record(id: &str, name: &str, status: ScanStatus, scan_type: ScanType) -> ScanRecord {
        let config = ScanConfig {
            name: name.into(),
            scan_type,
            target: "10.0.0.1".into(),
            target_type: TargetType::Ip,
        };
        let mut r = ScanRecord::new(id.into(), &config);
        r.status = status;
        r
    }

    async fn seeded_store() -> ScanHistoryStore {
        let store = ScanHistoryStore::new();
        store.create(record("a", "Weekly Full Scan", ScanStatus::Completed, ScanType::Full)).await;
        store.create(record("b", "API Surface Audit", ScanStatus::Scanning, ScanType::Api)).await;
        store.create(record("c", "Perimeter Sweep", ScanStatus::Completed, ScanType::Network)).await;
        store
    }

    #[tokio::test]
    async fn test_newest_first_order() {
        let store = seeded_store().await;
        let ids: Vec<_> = store.list(&ScanFilter::default()).await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_text_filter_is_case_insensitive_and_name_only() {
        let store = seeded_store().await;
        let filter = ScanFilter { text: Some("full".into()), ..Default::default() };
        let hits = store.list(&filter).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        // target contents must not match
        let filter = ScanFilter { text: Some("10.0.0".into()), ..Default::default() };
        assert!(store.list(&filter).await.is_empty());
    }

    #[tokio::test]
    async fn test_filters_combine_with_and() {
        let store = seeded_store().await;
        let filter = ScanFilter {
            text: Some("scan".into()),
            status: Some(ScanStatus::Completed),
            scan_type: Some(ScanType::Full),
        };
        let hits = store.list(&filter).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        let filter = ScanFilter {
            text: Some("scan".into()),
            status: Some(ScanStatus::Failed),
            ..Default::default()
        };
        assert!(store.list(&filter).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let store = seeded_store().await;
        let filter = ScanFilter { status: Some(ScanStatus::Completed), ..Default::default() };
        let first: Vec<_> = store.list(&filter).await.into_iter().map(|r| r.id).collect();
        let second: Vec<_> = store.list(&filter).await.into_iter().map(|r| r.id).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = seeded_store().await;
        assert!(store.update("b", |r| r.status = ScanStatus::Completed).await);
        assert_eq!(store.get("b").await.unwrap().status, ScanStatus::Completed);

        assert!(!store.update("missing", |_| {}).await);
        assert!(store.delete("b").await);
        assert!(!store.delete("b").await);
        assert_eq!(store.len().await, 2);
    }
}
