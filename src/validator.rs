// src/validator.rs
//! Structural validation of inbound scan requests.
//!
//! Returns one error per offending field so a caller can render
//! field-level messages. No side effects: a rejected request leaves no
//! trace in the history store.

use crate::error::FieldError;
use crate::models::{ScanConfig, ScanRequest, ScanType, TargetType};

const MIN_NAME_LEN: usize = 3;

pub struct ScanRequestValidator;

impl ScanRequestValidator {
    /// Validates a raw request into a typed, immutable configuration.
    pub fn validate(request: &ScanRequest) -> Result<ScanConfig, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = request.name.trim();
        if name.len() < MIN_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("name must be at least {} characters", MIN_NAME_LEN),
            ));
        }

        let scan_type = match request.scan_type.parse::<ScanType>() {
            Ok(t) => Some(t),
            Err(_) => {
                errors.push(FieldError::new(
                    "scan_type",
                    "scan type must be one of: full, network, api, service",
                ));
                None
            }
        };

        let target = request.target.trim();
        if target.is_empty() {
            errors.push(FieldError::new("target", "target is required"));
        }

        let target_type = match request.target_type.parse::<TargetType>() {
            Ok(t) => Some(t),
            Err(_) => {
                errors.push(FieldError::new(
                    "target_type",
                    "target type must be one of: ip, subnet, service, url",
                ));
                None
            }
        };

        if let (true, Some(scan_type), Some(target_type)) =
            (errors.is_empty(), scan_type, target_type)
        {
            return Ok(ScanConfig {
                name: name.to_string(),
                scan_type,
                target: target.to_string(),
                target_type,
            });
        }
        Err(errors)
    }
}
