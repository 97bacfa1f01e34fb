//! DispatchOutcome / DispatchResult - Dispatch Engine output
//!
//! Per-device outcomes and the aggregated per-call result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{DeviceId, DispatchRequest, SubjectId};

/// Failure classification for a per-device outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No registered adapter can serve the device
    DeviceNotSupported,
    /// The adapter itself reported failure
    AdapterError,
    /// The adapter implementation panicked; caught and recorded
    AdapterFault,
    /// The adapter call exceeded the configured per-call timeout
    Timeout,
    /// The whole request was rejected before any per-device dispatch
    /// (async path only; the sync path raises the error instead)
    RequestRejected,
}

/// Per-device dispatch outcome
///
/// Adapters produce these directly (success or `AdapterError`); the engine
/// fills in the remaining classifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Whether the device accepted the payload
    pub success: bool,

    /// Human-readable message
    pub message: String,

    /// Failure classification (None on success)
    pub failure: Option<FailureKind>,

    /// Adapter-specific error code, if the adapter reported one
    pub error_code: Option<String>,
}

impl DispatchOutcome {
    /// Successful outcome
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            failure: None,
            error_code: None,
        }
    }

    /// Adapter-reported failure
    pub fn adapter_error(message: impl Into<String>, error_code: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            failure: Some(FailureKind::AdapterError),
            error_code,
        }
    }

    /// No adapter resolved for the device
    pub fn not_supported(device_type: &str) -> Self {
        Self {
            success: false,
            message: format!("no adapter supports device type '{device_type}'"),
            failure: Some(FailureKind::DeviceNotSupported),
            error_code: None,
        }
    }

    /// Adapter panicked during dispatch
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            failure: Some(FailureKind::AdapterFault),
            error_code: None,
        }
    }

    /// Adapter call exceeded the configured timeout
    pub fn timed_out(waited_ms: u64) -> Self {
        Self {
            success: false,
            message: format!("adapter call timed out after {waited_ms}ms"),
            failure: Some(FailureKind::Timeout),
            error_code: None,
        }
    }

    /// Request-level rejection recorded per device (async path)
    pub fn request_rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            failure: Some(FailureKind::RequestRejected),
            error_code: None,
        }
    }
}

/// Aggregated result of one dispatch call
///
/// The outcome-map key set always equals the request's target device set,
/// however many adapters existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    /// Request ID this result answers
    pub request_id: String,

    /// Subject whose templates were dispatched
    pub subject_id: SubjectId,

    /// Overall success; holds exactly when `failure_count == 0`
    pub success: bool,

    /// Per-device outcomes (device id -> outcome)
    pub device_outcomes: HashMap<DeviceId, DispatchOutcome>,

    /// Number of successful devices
    pub success_count: usize,

    /// Number of failed devices
    pub failure_count: usize,

    /// Wall-clock duration of the dispatch call
    pub elapsed: Duration,

    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

impl DispatchResult {
    /// Aggregate per-device outcomes into a result.
    ///
    /// The only constructor used after a fan-out, so the
    /// success/failure-count invariant cannot drift from the map contents.
    pub fn from_outcomes(
        request_id: impl Into<String>,
        subject_id: SubjectId,
        device_outcomes: HashMap<DeviceId, DispatchOutcome>,
        elapsed: Duration,
    ) -> Self {
        let success_count = device_outcomes.values().filter(|o| o.success).count();
        let failure_count = device_outcomes.len() - success_count;

        Self {
            request_id: request_id.into(),
            subject_id,
            success: failure_count == 0,
            device_outcomes,
            success_count,
            failure_count,
            elapsed,
            completed_at: Utc::now(),
        }
    }

    /// Result for a request rejected before any per-device dispatch.
    ///
    /// Every requested device gets a `RequestRejected` outcome so the
    /// key-set invariant holds even on the failure path.
    pub fn rejected(request: &DispatchRequest, message: impl Into<String>) -> Self {
        let message = message.into();
        let outcomes = request
            .devices
            .iter()
            .map(|d| (d.id.clone(), DispatchOutcome::request_rejected(&message)))
            .collect();
        Self::from_outcomes(
            request.request_id.clone(),
            request.subject_id.clone(),
            outcomes,
            Duration::ZERO,
        )
    }

    /// Ids of devices whose outcome was a failure.
    pub fn failed_device_ids(&self) -> Vec<DeviceId> {
        self.device_outcomes
            .iter()
            .filter(|(_, o)| !o.success)
            .map(|(id, _)| id.clone())
            .collect()
    }
}
