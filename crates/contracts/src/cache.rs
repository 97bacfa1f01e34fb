//! PayloadCache trait - canonical payload cache collaborator
//!
//! Read-through cache keyed by subject. Best-effort: a write failure is
//! logged by the caller and never surfaces to the dispatching caller.

use async_trait::async_trait;

use crate::{CanonicalPayload, DispatchError, SubjectId};

/// Canonical payload cache contract
///
/// The backend (in-process map, redis, ...) lives outside this workspace;
/// tests use an in-memory implementation.
#[async_trait]
pub trait PayloadCache: Send + Sync {
    /// Look up the cached payload for a subject.
    async fn get(&self, subject_id: &SubjectId) -> Option<CanonicalPayload>;

    /// Store the payload for a subject.
    ///
    /// # Errors
    /// Returns a cache error; callers log it and continue.
    async fn put(
        &self,
        subject_id: &SubjectId,
        payload: &CanonicalPayload,
    ) -> Result<(), DispatchError>;
}
