//! DispatchRequest - Dispatch Engine input
//!
//! One request distributes one subject's records to a set of target devices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{BiometricRecord, DeviceDescriptor, DeviceId, SubjectId};

/// Dispatch request
///
/// Immutable after construction; the engine clones what it keeps, so a
/// caller-held request is never observed mid-mutation. Lives for the
/// duration of one dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Generated request ID (UUID v4)
    pub request_id: String,

    /// Subject the records belong to
    pub subject_id: SubjectId,

    /// Records to distribute (must be non-empty)
    pub records: Vec<BiometricRecord>,

    /// Target devices (must be non-empty)
    pub devices: Vec<DeviceDescriptor>,

    /// Caller-supplied options, merged into the canonical payload
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl DispatchRequest {
    /// Create a request with a fresh generated id.
    pub fn new(
        subject_id: impl Into<SubjectId>,
        records: Vec<BiometricRecord>,
        devices: Vec<DeviceDescriptor>,
    ) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            records,
            devices,
            options: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach a caller option.
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// New request scoped to a device subset, keeping subject, records and
    /// options. Used by the retry path; gets its own generated id.
    pub fn scoped_to(&self, devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            subject_id: self.subject_id.clone(),
            records: self.records.clone(),
            devices,
            options: self.options.clone(),
            created_at: Utc::now(),
        }
    }

    /// Target device ids, in request order.
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.iter().map(|d| d.id.clone()).collect()
    }
}
