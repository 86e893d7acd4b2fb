// src/lifecycle/mod.rs
//! Scan lifecycle machinery.
//!
//! `progress` is the pure state machine mapping cumulative progress to
//! lifecycle states and status messages; `controller` drives it on a
//! timer, invokes the backend at completion and fans updates out to
//! subscribers. Keeping the machine pure means the timer is just a
//! driver and tests can step the machine directly.

pub mod progress;
pub mod controller;

pub use controller::{ScanLifecycleController, SubscriberHub, TickPolicy};
pub use progress::{ProgressEvent, ProgressMachine};
