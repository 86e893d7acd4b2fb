//! End-to-end lifecycle tests against the public tracker API.

use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use vulnscan_tracker::backend::FailingBackend;
use vulnscan_tracker::lifecycle::TickPolicy;
use vulnscan_tracker::models::{ScanRequest, ScanStatus};
use vulnscan_tracker::service::TrackerConfig;
use vulnscan_tracker::store::ScanFilter;
use vulnscan_tracker::{ScanTracker, TrackerError};

fn fast_config(seed: u64) -> TrackerConfig {
    let _ = env_logger::builder().is_test(true).try_init();
    TrackerConfig {
        tick: TickPolicy {
            period: Duration::from_millis(1),
            min_step: 1,
            max_step: 5,
            max_scan_duration: Duration::from_secs(10),
        },
        rng_seed: Some(seed),
        ..TrackerConfig::default()
    }
}

fn full_scan_request() -> ScanRequest {
    ScanRequest {
        name: "Full Scan".into(),
        scan_type: "full".into(),
        target: "192.168.1.0/24".into(),
        target_type: "subnet".into(),
    }
}

async fn wait_terminal(tracker: &ScanTracker, scan_id: &str) {
    for _ in 0..2000 {
        if let Some(record) = tracker.get_scan(scan_id).await {
            if record.status.is_terminal() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("scan {} never reached a terminal state", scan_id);
}

#[tokio::test]
async fn test_full_scan_scenario() {
    let tracker = ScanTracker::new(fast_config(100));

    let record = tracker.submit_scan(full_scan_request()).await.unwrap();
    assert_eq!(record.status, ScanStatus::Initializing);
    assert_eq!(record.severity_counts.total(), 0);
    assert!(record.findings.is_empty());
    assert_eq!(record.status_log[0].message, "initializing scan");

    wait_terminal(&tracker, &record.id).await;

    let finished = tracker.get_scan(&record.id).await.unwrap();
    assert_eq!(finished.status, ScanStatus::Completed);
    assert_eq!(
        finished.severity_counts.total() as usize,
        finished.findings.len()
    );
    assert!(finished.duration.is_some());
    assert_eq!(finished.status_log.last().unwrap().message, "scan complete");

    // the status log replays the whole progression, monotonically
    let percents: Vec<_> = finished.status_log.iter().map(|e| e.percent).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert!(finished
        .status_log
        .iter()
        .any(|e| e.message == "scanning target 192.168.1.0/24"));
}

#[tokio::test]
async fn test_subscription_stream_is_finite_and_monotone() {
    let tracker = ScanTracker::new(fast_config(101));
    let record = tracker.submit_scan(full_scan_request()).await.unwrap();

    let mut stream = tracker.subscribe(&record.id).await.unwrap();
    let mut updates = Vec::new();
    while let Some(update) = stream.next().await {
        updates.push(update);
    }

    assert!(!updates.is_empty());
    let percents: Vec<_> = updates.iter().map(|u| u.percent).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert!(updates.last().unwrap().status.is_terminal());
}

#[tokio::test]
async fn test_subscribe_terminal_scan_yields_one_snapshot() {
    let tracker = ScanTracker::new(fast_config(102));
    let record = tracker.submit_scan(full_scan_request()).await.unwrap();
    wait_terminal(&tracker, &record.id).await;
    // allow the controller to deregister
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut stream = tracker.subscribe(&record.id).await.unwrap();
    let first = stream.next().await.unwrap();
    assert_eq!(first.status, ScanStatus::Completed);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_subscribe_unknown_id_is_not_found() {
    let tracker = ScanTracker::new(fast_config(103));
    let err = tracker.subscribe("no-such-scan").await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(_)));
}

#[tokio::test]
async fn test_validation_failure_creates_no_record() {
    let tracker = ScanTracker::new(fast_config(104));
    let mut request = full_scan_request();
    request.name = "ab".into();

    let err = tracker.submit_scan(request).await.unwrap_err();
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
    assert_eq!(fields, vec!["name"]);
    assert!(tracker.list_scans(&ScanFilter::default()).await.is_empty());
}

#[tokio::test]
async fn test_close_rejected_until_terminal() {
    // slow the ticker down so the scan is reliably still in flight when
    // the first close attempt lands
    let mut config = fast_config(105);
    config.tick.period = Duration::from_millis(20);
    let tracker = ScanTracker::new(config);
    let record = tracker.submit_scan(full_scan_request()).await.unwrap();

    match tracker.close_scan(&record.id).await {
        Err(TrackerError::IllegalTransition { status, .. }) => {
            assert!(!status.is_terminal());
        }
        other => panic!("expected IllegalTransition, got {:?}", other),
    }

    wait_terminal(&tracker, &record.id).await;
    tracker.close_scan(&record.id).await.unwrap();
}

#[tokio::test]
async fn test_close_unknown_id_is_not_found() {
    let tracker = ScanTracker::new(fast_config(106));
    let err = tracker.close_scan("no-such-scan").await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_scans_have_independent_histories() {
    let tracker = ScanTracker::new(fast_config(107));

    let first = tracker.submit_scan(full_scan_request()).await.unwrap();
    let mut second_request = full_scan_request();
    second_request.name = "API Audit".into();
    second_request.scan_type = "api".into();
    second_request.target = "https://api.example.com".into();
    second_request.target_type = "url".into();
    let second = tracker.submit_scan(second_request).await.unwrap();

    assert_ne!(first.id, second.id);
    wait_terminal(&tracker, &first.id).await;
    wait_terminal(&tracker, &second.id).await;

    for id in [&first.id, &second.id] {
        let record = tracker.get_scan(id).await.unwrap();
        assert_eq!(record.status, ScanStatus::Completed);
        let percents: Vec<_> = record.status_log.iter().map(|e| e.percent).collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    // each record kept its own target in its own log
    let second_record = tracker.get_scan(&second.id).await.unwrap();
    assert!(second_record
        .status_log
        .iter()
        .any(|e| e.message == "scanning target https://api.example.com"));
}

#[tokio::test]
async fn test_backend_failure_reaches_failed_state() {
    let backend = Arc::new(FailingBackend { reason: "probe fleet offline".into() });
    let tracker = ScanTracker::with_backend(fast_config(108), backend);
    let record = tracker.submit_scan(full_scan_request()).await.unwrap();

    wait_terminal(&tracker, &record.id).await;

    let failed = tracker.get_scan(&record.id).await.unwrap();
    assert_eq!(failed.status, ScanStatus::Failed);
    assert!(failed.findings.is_empty());
    assert!(failed.error.as_ref().unwrap().contains("probe fleet offline"));

    // a failed scan is terminal, so close is now permitted
    tracker.close_scan(&record.id).await.unwrap();
}

#[tokio::test]
async fn test_delete_scan() {
    let tracker = ScanTracker::new(fast_config(109));
    let record = tracker.submit_scan(full_scan_request()).await.unwrap();
    wait_terminal(&tracker, &record.id).await;

    assert!(tracker.delete_scan(&record.id).await);
    assert!(!tracker.delete_scan(&record.id).await);
    assert!(tracker.get_scan(&record.id).await.is_none());
}

#[tokio::test]
async fn test_list_scans_filters_and_is_stable() {
    let tracker = ScanTracker::new(fast_config(110));
    let full = tracker.submit_scan(full_scan_request()).await.unwrap();
    let mut api_request = full_scan_request();
    api_request.name = "Quarterly API Review".into();
    api_request.scan_type = "api".into();
    let api = tracker.submit_scan(api_request).await.unwrap();

    wait_terminal(&tracker, &full.id).await;
    wait_terminal(&tracker, &api.id).await;

    let filter = ScanFilter { text: Some("api".into()), ..Default::default() };
    let hits = tracker.list_scans(&filter).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, api.id);

    let again = tracker.list_scans(&filter).await;
    assert_eq!(
        hits.iter().map(|r| &r.id).collect::<Vec<_>>(),
        again.iter().map(|r| &r.id).collect::<Vec<_>>()
    );
}
