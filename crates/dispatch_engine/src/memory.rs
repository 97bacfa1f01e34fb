//! In-memory collaborator implementations
//!
//! 进程内缓存与模板存储。用于测试与单机部署；生产环境由外部后端实现
//! 相同的 trait。

use async_trait::async_trait;
use dashmap::DashMap;

use contracts::{
    BiometricRecord, CanonicalPayload, DispatchError, PayloadCache, SubjectId, TemplateStore,
};

/// In-process canonical payload cache
#[derive(Default)]
pub struct MemoryPayloadCache {
    entries: DashMap<SubjectId, CanonicalPayload>,
}

impl MemoryPayloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached subjects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PayloadCache for MemoryPayloadCache {
    async fn get(&self, subject_id: &SubjectId) -> Option<CanonicalPayload> {
        self.entries.get(subject_id).map(|e| e.value().clone())
    }

    async fn put(
        &self,
        subject_id: &SubjectId,
        payload: &CanonicalPayload,
    ) -> Result<(), DispatchError> {
        self.entries.insert(subject_id.clone(), payload.clone());
        Ok(())
    }
}

/// In-process template store
///
/// Seeded explicitly; `load_records` returns an empty list for unknown
/// subjects rather than an error.
#[derive(Default)]
pub struct MemoryTemplateStore {
    records: DashMap<SubjectId, Vec<BiometricRecord>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records for a subject, replacing any existing set.
    pub fn seed(&self, subject_id: SubjectId, records: Vec<BiometricRecord>) {
        self.records.insert(subject_id, records);
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn load_records(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<BiometricRecord>, DispatchError> {
        Ok(self
            .records
            .get(subject_id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }
}
