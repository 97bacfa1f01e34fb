//! CanonicalPayload - the engine's outbound contract toward adapters
//!
//! Normalized in-memory representation of a subject's records plus dispatch
//! metadata. Built on demand, optionally cached; the external template store
//! stays authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{BiometricKind, BiometricRecord, DispatchRequest, SubjectId};

/// Canonical dispatch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalPayload {
    /// Subject the payload describes
    pub subject_id: SubjectId,

    /// Records grouped by modality
    pub records: HashMap<BiometricKind, Vec<BiometricRecord>>,

    /// Request ID the payload was built for
    pub request_id: String,

    /// Build timestamp
    pub created_at: DateTime<Utc>,

    /// Merged caller options
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl CanonicalPayload {
    /// Build from a dispatch request, grouping its records by modality.
    pub fn from_request(request: &DispatchRequest) -> Self {
        let mut payload = Self::group(
            request.subject_id.clone(),
            request.records.iter().cloned(),
            request.request_id.clone(),
        );
        payload.options = request.options.clone();
        payload
    }

    /// Build from bare records (cache-rebuild path); gets a generated
    /// request id and empty options.
    pub fn from_records(subject_id: SubjectId, records: Vec<BiometricRecord>) -> Self {
        Self::group(
            subject_id,
            records.into_iter(),
            uuid::Uuid::new_v4().to_string(),
        )
    }

    fn group(
        subject_id: SubjectId,
        records: impl Iterator<Item = BiometricRecord>,
        request_id: String,
    ) -> Self {
        let mut grouped: HashMap<BiometricKind, Vec<BiometricRecord>> = HashMap::new();
        for record in records {
            grouped.entry(record.kind).or_default().push(record);
        }
        Self {
            subject_id,
            records: grouped,
            request_id,
            created_at: Utc::now(),
            options: HashMap::new(),
        }
    }

    /// Total record count across modalities.
    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Modalities present in the payload.
    pub fn kinds(&self) -> Vec<BiometricKind> {
        self.records.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceDescriptor;
    use bytes::Bytes;

    fn record(id: &str, kind: BiometricKind) -> BiometricRecord {
        BiometricRecord {
            record_id: id.to_string(),
            subject_id: "42".into(),
            kind,
            template: Bytes::from_static(b"\x01"),
            quality: 0.8,
            template_version: "v1".to_string(),
            captured_at: Utc::now(),
            algorithm_version: "a1".to_string(),
        }
    }

    #[test]
    fn test_groups_by_kind() {
        let request = DispatchRequest::new(
            "42",
            vec![
                record("r1", BiometricKind::Face),
                record("r2", BiometricKind::Face),
                record("r3", BiometricKind::Iris),
            ],
            vec![DeviceDescriptor::new("d1", "C1", "face_terminal", "acme")],
        );

        let payload = CanonicalPayload::from_request(&request);
        assert_eq!(payload.request_id, request.request_id);
        assert_eq!(payload.record_count(), 3);
        assert_eq!(payload.records[&BiometricKind::Face].len(), 2);
        assert_eq!(payload.records[&BiometricKind::Iris].len(), 1);
    }

    #[test]
    fn test_from_records_generates_request_id() {
        let payload =
            CanonicalPayload::from_records("42".into(), vec![record("r1", BiometricKind::Voice)]);
        assert!(!payload.request_id.is_empty());
        assert_eq!(payload.kinds(), vec![BiometricKind::Voice]);
    }
}
