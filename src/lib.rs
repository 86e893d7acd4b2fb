pub mod models;
pub mod error;
pub mod validator;
pub mod catalog;
pub mod backend;
pub mod enrichment;
pub mod compliance;
pub mod store;

/// Scan lifecycle: progress state machine and the async tick driver.
pub mod lifecycle;

/// Public facade tying validation, lifecycle, enrichment and history together.
pub mod service;

pub use error::{FieldError, TrackerError};
pub use service::ScanTracker;
