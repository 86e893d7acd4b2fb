// src/lifecycle/progress.rs
//! Pure progress state machine.
//!
//! Cumulative progress maps onto lifecycle states and human-readable
//! status messages through a fixed threshold table. Progress is monotone
//! and clamped to 100; when one step crosses several thresholds, every
//! crossed threshold still emits its event, in order, so the status log
//! never skips a message.

use crate::models::ScanStatus;

/// A state or message transition produced by crossing a threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: u8,
    pub status: ScanStatus,
    pub message: String,
}

/// Thresholds at which a new message (and possibly state) fires.
const THRESHOLDS: &[u8] = &[5, 15, 40, 55, 70, 85, 100];

pub struct ProgressMachine {
    percent: u8,
    status: ScanStatus,
    target: String,
}

impl ProgressMachine {
    /// Starts a machine at 0%, state `Initializing`. The returned event
    /// is the initial "initializing scan" message for the status log.
    pub fn new(target: impl Into<String>) -> (Self, ProgressEvent) {
        let machine = Self {
            percent: 0,
            status: ScanStatus::Initializing,
            target: target.into(),
        };
        let initial = ProgressEvent {
            percent: 0,
            status: ScanStatus::Initializing,
            message: "initializing scan".to_string(),
        };
        (machine, initial)
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.percent == 100
    }

    /// Advances progress by `step`, clamped to 100, and returns one event
    /// per threshold crossed.
    pub fn advance(&mut self, step: u8) -> Vec<ProgressEvent> {
        if self.is_complete() {
            return Vec::new();
        }
        let previous = self.percent;
        self.percent = previous.saturating_add(step).min(100);

        let mut events = Vec::new();
        for &threshold in THRESHOLDS {
            if threshold > previous && threshold <= self.percent {
                if let Some(status) = Self::status_at(threshold) {
                    self.status = status;
                }
                events.push(ProgressEvent {
                    percent: threshold,
                    status: self.status,
                    message: self.message_at(threshold),
                });
            }
        }
        events
    }

    fn status_at(threshold: u8) -> Option<ScanStatus> {
        match threshold {
            15 => Some(ScanStatus::Scanning),
            70 => Some(ScanStatus::Analyzing),
            100 => Some(ScanStatus::Completed),
            _ => None,
        }
    }

    fn message_at(&self, threshold: u8) -> String {
        match threshold {
            5 => "preparing to scan".to_string(),
            15 => format!("scanning target {}", self.target),
            40 => "checking open ports".to_string(),
            55 => "detecting vulnerabilities".to_string(),
            70 => "analyzing detected vulnerabilities".to_string(),
            85 => "preparing report".to_string(),
            _ => "scan complete".to_string(),
        }
    }
}
